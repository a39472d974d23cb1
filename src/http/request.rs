/// What a request asks for, decided from its request line only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// CORS preflight: answered without touching the relay or the sensor.
    Preflight,
    RelayOn,
    RelayOff,
    /// Any other request still gets a fresh status reading.
    Status,
}

impl RequestKind {
    pub fn classify(request: &str) -> Self {
        let line = request.lines().next().unwrap_or("");
        let mut parts = line.split_whitespace();
        let method = parts.next().unwrap_or("");
        let path = parts.next().unwrap_or("");

        match method {
            "OPTIONS" => RequestKind::Preflight,
            "GET" if path.starts_with("/relay/on") => RequestKind::RelayOn,
            "GET" if path.starts_with("/relay/off") => RequestKind::RelayOff,
            _ => RequestKind::Status,
        }
    }

    /// Relay command carried by the request, if any
    pub fn relay_command(self) -> Option<bool> {
        match self {
            RequestKind::RelayOn => Some(true),
            RequestKind::RelayOff => Some(false),
            _ => None,
        }
    }
}
