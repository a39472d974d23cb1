use super::request::RequestKind;
use super::response::{HttpResponse, StatusReport};
use super::transport::Connection;
use crate::error::{NodeError, NodeResult};
use crate::flow::{Clock, FlowEstimator};
use crate::relay::RelayActuator;
use crate::wifi::Connectivity;
use core::fmt::Debug;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use log::{debug, info, warn};

/// Outcome of one connection, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Served {
    Preflight,
    Status(StatusReport),
    /// A 500 was attempted with this message.
    Failed(String),
}

/// Serves one accepted connection to completion and closes it.
pub trait ClientHandler {
    fn handle(&mut self, conn: &mut dyn Connection, link: &dyn Connectivity) -> Served;
}

/// Relay commands, flow reading and the no-flow interlock behind the HTTP API.
pub struct RequestHandler<P, C, D> {
    relay: RelayActuator<P>,
    estimator: FlowEstimator<C, D>,
    max_request_bytes: usize,
}

impl<P, C, D> RequestHandler<P, C, D>
where
    P: OutputPin,
    P::Error: Debug,
    C: Clock,
    D: DelayMs<u32>,
{
    pub fn new(
        relay: RelayActuator<P>,
        estimator: FlowEstimator<C, D>,
        max_request_bytes: usize,
    ) -> Self {
        Self {
            relay,
            estimator,
            max_request_bytes,
        }
    }

    pub fn relay(&self) -> &RelayActuator<P> {
        &self.relay
    }

    fn respond(
        &mut self,
        conn: &mut dyn Connection,
        link: &dyn Connectivity,
    ) -> NodeResult<Served> {
        let mut buf = vec![0u8; self.max_request_bytes];
        let len = conn
            .read(&mut buf)
            .map_err(|e| NodeError::Client(format!("receive failed: {}", e)))?;
        let request = std::str::from_utf8(&buf[..len])
            .map_err(|e| NodeError::Client(format!("invalid utf-8 in request: {}", e)))?;

        let kind = RequestKind::classify(request);
        debug!(
            "HTTP: '{}' -> {:?}",
            request.lines().next().unwrap_or(""),
            kind
        );

        if kind == RequestKind::Preflight {
            send(conn, &HttpResponse::preflight())?;
            return Ok(Served::Preflight);
        }

        // Other paths fall through to a plain status reading.
        if let Some(on) = kind.relay_command() {
            self.relay.set(on);
        }

        let reading = self.estimator.measure();

        if !reading.is_flowing() {
            if self.relay.get() {
                warn!("Interlock: no flow detected, forcing relay OFF");
            }
            self.relay.set(false);
        }

        let report = StatusReport::new(link.is_connected(), reading.rate_lpm, self.relay.get());
        send(conn, &HttpResponse::status(&report)?)?;
        Ok(Served::Status(report))
    }
}

impl<P, C, D> ClientHandler for RequestHandler<P, C, D>
where
    P: OutputPin,
    P::Error: Debug,
    C: Clock,
    D: DelayMs<u32>,
{
    fn handle(&mut self, conn: &mut dyn Connection, link: &dyn Connectivity) -> Served {
        let served = match self.respond(conn, link) {
            Ok(served) => served,
            Err(e) => {
                warn!("HTTP: Error handling client: {}", e);
                let message = e.to_string();
                if let Err(send_err) = send(conn, &HttpResponse::internal_error(&message)) {
                    debug!("HTTP: error response not delivered: {}", send_err);
                }
                Served::Failed(message)
            }
        };

        if let Err(e) = conn.close() {
            debug!("HTTP: close: {}", e);
        }

        if let Served::Status(report) = &served {
            info!(
                "HTTP: flow {:.2} L/min, relay {}",
                report.flow_rate, report.relay_status
            );
        }
        served
    }
}

fn send(conn: &mut dyn Connection, response: &HttpResponse) -> NodeResult<()> {
    conn.write_all(&response.to_bytes())
        .and_then(|_| conn.flush())
        .map_err(|e| NodeError::Client(format!("send failed: {}", e)))
}
