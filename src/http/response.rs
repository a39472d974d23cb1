use crate::error::{NodeError, NodeResult};
use serde::{Deserialize, Serialize};

const ALLOW_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");
const ALLOW_METHODS: (&str, &str) = ("Access-Control-Allow-Methods", "GET, OPTIONS");
const ALLOW_HEADERS: (&str, &str) = ("Access-Control-Allow-Headers", "Content-Type");
const JSON: (&str, &str) = ("Content-Type", "application/json");

/// Status body polled by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub wifi_status: bool,
    pub flow_rate: f64,
    /// 0 or 1
    pub relay_status: u8,
}

impl StatusReport {
    pub fn new(wifi_connected: bool, flow_rate: f64, relay_on: bool) -> Self {
        Self {
            wifi_status: wifi_connected,
            flow_rate,
            relay_status: u8::from(relay_on),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: String,
}

impl HttpResponse {
    /// 204 answer to a CORS preflight.
    pub fn preflight() -> Self {
        Self {
            status: 204,
            reason: "No Content",
            headers: vec![
                ALLOW_ORIGIN,
                ALLOW_METHODS,
                ALLOW_HEADERS,
                ("Access-Control-Max-Age", "3600"),
            ],
            body: String::new(),
        }
    }

    pub fn status(report: &StatusReport) -> NodeResult<Self> {
        let body = serde_json::to_string(report)
            .map_err(|e| NodeError::Client(format!("status serialization: {}", e)))?;

        Ok(Self {
            status: 200,
            reason: "OK",
            headers: vec![
                JSON,
                ALLOW_ORIGIN,
                ALLOW_METHODS,
                ALLOW_HEADERS,
                ("Cache-Control", "no-store"),
            ],
            body,
        })
    }

    pub fn internal_error(message: &str) -> Self {
        let body = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| String::from("{\"error\":\"internal error\"}"));

        Self {
            status: 500,
            reason: "Internal Server Error",
            headers: vec![JSON, ALLOW_ORIGIN],
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&'static str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    /// Wire form. One response per connection, so always `Connection: close`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("HTTP/1.1 {} {}\r\n", self.status, self.reason);
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
        if self.status != 204 {
            out.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        out.push_str("Connection: close\r\n\r\n");
        out.push_str(&self.body);
        out.into_bytes()
    }
}
