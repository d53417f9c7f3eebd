//! Conversion from ARNU XML to domain types.

use chrono::{DateTime, FixedOffset};
use minidom::Element;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, error};

use crate::domain::{Service, Stop, parse_iso_datetime, parse_iso_delay};
use crate::reference::ReferenceData;

use super::error::ParseError;

/// `StopType` attribute value for a stop the service no longer calls at.
const CANCELLED_STOP: &str = "Cancelled-Stop";

/// `StopType` attribute value for a stop the service is diverted around.
const DIVERTED_STOP: &str = "Diverted-Stop";

/// Parse an update message into services.
///
/// Returns `Ok(None)` when the envelope itself cannot be decoded (the
/// failure is logged). Returns an error as soon as one service description
/// is incomplete; services parsed before it are discarded.
pub fn parse_message<R: ReferenceData>(
    raw: &[u8],
    reference: &R,
) -> Result<Option<Vec<Service>>, ParseError> {
    let root = match decode_envelope(raw) {
        Ok(root) => root,
        Err(reason) => {
            error!(%reason, "can't parse ARNU XML message");
            return Ok(None);
        }
    };

    let list = child(&root, "ServiceInfoList").ok_or(ParseError::MissingElement("ServiceInfoList"))?;

    list.children()
        .filter(|e| e.name() == "ServiceInfo")
        .map(|info| parse_service(info, reference))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn decode_envelope(raw: &[u8]) -> Result<Element, String> {
    let text = std::str::from_utf8(raw).map_err(|e| e.to_string())?;
    check_document(text)?;
    text.parse::<Element>().map_err(|e| e.to_string())
}

/// Reject documents the tree builder would accept anyway: an unclosed
/// root, a missing root, or a second root element.
fn check_document(text: &str) -> Result<(), String> {
    let mut reader = Reader::from_str(text);
    reader.check_end_names(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut roots = 0usize;
    loop {
        match reader.read_event(&mut buf).map_err(|e| e.to_string())? {
            Event::Start(_) | Event::Empty(_) if depth == 0 && roots > 0 => {
                return Err("content after the root element".to_string());
            }
            Event::Start(_) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::Empty(_) if depth == 0 => roots += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match (roots, depth) {
        (0, _) => Err("no root element".to_string()),
        (_, 0) => Ok(()),
        (_, open) => Err(format!("document ends with {open} unclosed element(s)")),
    }
}

/// Parse one `ServiceInfo` element.
pub fn parse_service<R: ReferenceData>(info: &Element, reference: &R) -> Result<Service, ParseError> {
    let service_id = required_text(info, "ServiceCode")?;
    let service_number = service_id
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidServiceCode(service_id.clone()))?;

    let transport_mode = required_text(info, "TransportModeCode")?;
    let transport_mode_description = reference.transport_mode(&transport_mode)?;

    let entries: Vec<&Element> = child(info, "StopList")
        .ok_or(ParseError::MissingElement("StopList"))?
        .children()
        .filter(|e| e.name() == "Stop")
        .collect();

    // The date comes from the first entry, cancelled or not
    let first = entries
        .first()
        .ok_or_else(|| ParseError::EmptyStopList(service_id.clone()))?;
    let service_date = optional_time(first, "Departure")?
        .ok_or(ParseError::MissingElement("Departure"))?
        .date_naive();

    let (stops, _) = entries.iter().try_fold(
        (Vec::with_capacity(entries.len()), false),
        |(mut stops, upstream_cancelled), entry| {
            let mut stop = parse_stop(entry, reference)?;
            let cancelled_here = is_cancelled_here(entry);

            if cancelled_here {
                debug!(
                    stop = %stop.stop_code,
                    service = %service_id,
                    stop_type = entry.attr("StopType").unwrap_or_default(),
                    "stop cancelled"
                );
            }

            // The service never left an earlier cancelled stop
            stop.cancelled_arrival = upstream_cancelled;
            stop.cancelled_departure = cancelled_here;
            stops.push(stop);

            Ok::<_, ParseError>((stops, upstream_cancelled || cancelled_here))
        },
    )?;

    let cancelled = Service::derive_cancelled(&stops);

    Ok(Service {
        service_id,
        service_number,
        transport_mode,
        transport_mode_description,
        service_date,
        cancelled,
        company_code: optional_text(info, "CompanyCode"),
        company_name: optional_text(info, "CompanyName"),
        stops,
    })
}

/// Build a stop from a `Stop` element, without cancellation state.
fn parse_stop<R: ReferenceData>(entry: &Element, reference: &R) -> Result<Stop, ParseError> {
    let code = required_text(entry, "StopCode")?.to_lowercase();
    let name = reference.station_name(&code)?;

    let mut stop = Stop::new(&code, name);
    stop.arrival_time = optional_time(entry, "Arrival")?;
    stop.arrival_delay = optional_delay(entry, "ArrivalTimeDelay")?;
    stop.departure_time = optional_time(entry, "Departure")?;
    stop.departure_delay = optional_delay(entry, "DepartureTimeDelay")?;
    stop.scheduled_arrival_platform = optional_text(entry, "ArrivalPlatform");
    stop.actual_arrival_platform = optional_text(entry, "ActualArrivalPlatform");
    stop.scheduled_departure_platform = optional_text(entry, "DeparturePlatform");
    stop.actual_departure_platform = optional_text(entry, "ActualDeparturePlatform");

    Ok(stop)
}

fn is_cancelled_here(entry: &Element) -> bool {
    matches!(entry.attr("StopType"), Some(CANCELLED_STOP | DIVERTED_STOP))
}

fn child<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    element.children().find(|e| e.name() == name)
}

/// Text of a child element; absent or blank text is `None`.
fn optional_text(element: &Element, name: &str) -> Option<String> {
    child(element, name)
        .map(|e| e.text().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn required_text(element: &Element, name: &'static str) -> Result<String, ParseError> {
    optional_text(element, name).ok_or(ParseError::MissingElement(name))
}

fn optional_time(
    element: &Element,
    name: &'static str,
) -> Result<Option<DateTime<FixedOffset>>, ParseError> {
    optional_text(element, name)
        .map(|text| parse_iso_datetime(&text))
        .transpose()
        .map_err(|source| ParseError::InvalidTime { field: name, source })
}

fn optional_delay(element: &Element, name: &'static str) -> Result<i64, ParseError> {
    optional_text(element, name)
        .map(|text| parse_iso_delay(&text))
        .transpose()
        .map(Option::unwrap_or_default)
        .map_err(|source| ParseError::InvalidTime { field: name, source })
}
