//! HTTP request layer
//!
//! Turns a raw request into a [`Route`] and a route into a [`Response`]. The
//! socket handling lives in the firmware; everything here works on byte
//! slices and strings so it can be tested on the host.
//!
//! # Endpoints
//! - `/`: dashboard page
//! - `/status`: fresh sample as JSON
//! - `/gate?action=open|close`: drives the barrier, 400 for anything else
//!
//! Only the request line is looked at. The method is not checked, every
//! endpoint answers any method.

use core::fmt::Write;

use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use heapless::String;

use crate::system::{
    distance::EchoSensor,
    gate::{GateAction, Servo},
    monitor::{ParkingMonitor, StatusReport},
};

/// TCP port the dashboard is served on
pub const HTTP_PORT: u16 = 80;

/// Room for the status JSON (longest body is ~100 bytes)
pub const JSON_CAPACITY: usize = 128;

/// Room for the status line and headers
pub const HEAD_CAPACITY: usize = 128;

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

const INVALID_ACTION: &str = "Invalid action. Use /gate?action=open or /gate?action=close";

/// Requested endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    Dashboard,
    Status,
    /// `None` when the action argument is missing or unknown
    Gate(Option<GateAction>),
    NotFound,
}

/// Why a request could not be routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// No complete request line in the buffer
    Incomplete,
    /// Request line is not `METHOD TARGET HTTP/x`
    Malformed,
}

/// Routes a request from its request line
pub fn parse_request(raw: &[u8]) -> Result<Route, RequestError> {
    let line_end = raw
        .windows(2)
        .position(|pair| pair == b"\r\n")
        .ok_or(RequestError::Incomplete)?;
    let line = core::str::from_utf8(&raw[..line_end]).map_err(|_| RequestError::Malformed)?;

    let mut parts = line.split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(RequestError::Malformed);
    };
    if method.is_empty() || !target.starts_with('/') || !version.starts_with("HTTP/") {
        return Err(RequestError::Malformed);
    }

    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let route = match path {
        "/" => Route::Dashboard,
        "/status" => Route::Status,
        "/gate" => Route::Gate(query_param(query, "action").and_then(GateAction::parse)),
        _ => Route::NotFound,
    };
    Ok(route)
}

/// First value of `name` in a query string
fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then_some(value)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusCode {
    Ok,
    BadRequest,
    NotFound,
}

impl StatusCode {
    pub fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Static(&'static str),
    Json(String<JSON_CAPACITY>),
}

impl Body {
    pub fn as_str(&self) -> &str {
        match self {
            Body::Static(text) => text,
            Body::Json(json) => json.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Body,
}

impl Response {
    fn text(status: StatusCode, text: &'static str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Body::Static(text),
        }
    }

    /// Answer for a request that could not be routed
    pub fn rejected(_error: RequestError) -> Self {
        Self::text(StatusCode::BadRequest, "Bad request")
    }

    /// Status line and headers, including the blank line
    pub fn head(&self) -> String<HEAD_CAPACITY> {
        let mut head = String::new();
        // fits: longest content type plus a five digit length stays under 110 bytes
        let _ = write!(
            head,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type,
            self.body.as_str().len()
        );
        head
    }
}

/// Renders the status JSON, distance with two decimals
pub fn status_json(report: &StatusReport) -> String<JSON_CAPACITY> {
    let mut json = String::new();
    let _ = write!(
        json,
        "{{\"is_occupied\":{},\"distance_cm\":{:.2},\"ir_status\":{},\"is_gate_open\":{},\"current_angle\":{}}}",
        report.is_occupied,
        report.distance_cm,
        report.ir_status.raw(),
        report.is_gate_open,
        report.current_angle
    );
    json
}

/// Serves one routed request against the monitor
pub async fn respond<E, I, S, D>(monitor: &mut ParkingMonitor<E, I, S, D>, route: Route) -> Response
where
    E: EchoSensor,
    I: InputPin,
    S: Servo,
    D: DelayNs,
{
    match route {
        Route::Dashboard => Response {
            status: StatusCode::Ok,
            content_type: "text/html",
            body: Body::Static(DASHBOARD_HTML),
        },
        Route::Status => {
            let report = monitor.status().await;
            Response {
                status: StatusCode::Ok,
                content_type: "application/json",
                body: Body::Json(status_json(&report)),
            }
        }
        Route::Gate(Some(GateAction::Open)) => {
            monitor.open_gate().await;
            Response::text(StatusCode::Ok, "Gate opened.")
        }
        Route::Gate(Some(GateAction::Close)) => {
            monitor.close_gate().await;
            Response::text(StatusCode::Ok, "Gate closed.")
        }
        Route::Gate(None) => {
            warn!("rejected gate command without a valid action");
            Response::text(StatusCode::BadRequest, INVALID_ACTION)
        }
        Route::NotFound => Response::text(StatusCode::NotFound, "Not found"),
    }
}
