//! Top-level control loop.
//!
//! ```text
//! Disconnected ──connected──────────────► Listening ──bind ok──► Accepting ◄─┐
//!      │                                      │                   │   │      │
//!      └──not connected──► Connecting ──ok────┘                   │   └──────┘
//!                              │                                  │  client served,
//!                              │ error          bind error / link lost  accept error
//!                              ▼                                  ▼
//!                           Backoff ◄─────────────────────────────┘
//!                              │ retry_backoff_ms
//!                              └──────────────► Disconnected
//! ```
//!
//! Leaving `Accepting` drops the listener before the backoff pause.

use crate::error::{NodeError, NodeResult};
use crate::http::{Accept, ClientHandler, Listen, Served};
use crate::network_config::{ServerConfig, WifiConfig};
use crate::wifi::{NetworkSession, Radio};
use embedded_hal::blocking::delay::DelayMs;
use log::{error, info, warn};

pub enum SupervisorState<L> {
    Disconnected,
    Connecting,
    Listening,
    Accepting(L),
    Backoff,
}

impl<L> SupervisorState<L> {
    pub fn name(&self) -> &'static str {
        match self {
            SupervisorState::Disconnected => "Disconnected",
            SupervisorState::Connecting => "Connecting",
            SupervisorState::Listening => "Listening",
            SupervisorState::Accepting(_) => "Accepting",
            SupervisorState::Backoff => "Backoff",
        }
    }
}

pub struct Supervisor<R, D, B, H>
where
    B: Listen,
{
    session: NetworkSession<R, D>,
    binder: B,
    handler: H,
    delay: D,
    wifi: WifiConfig,
    server: ServerConfig,
    state: SupervisorState<B::Listener>,
}

impl<R, D, B, H> Supervisor<R, D, B, H>
where
    R: Radio,
    D: DelayMs<u32>,
    B: Listen,
    H: ClientHandler,
{
    pub fn new(
        session: NetworkSession<R, D>,
        binder: B,
        handler: H,
        delay: D,
        wifi: WifiConfig,
        server: ServerConfig,
    ) -> Self {
        Self {
            session,
            binder,
            handler,
            delay,
            wifi,
            server,
            state: SupervisorState::Disconnected,
        }
    }

    pub fn state(&self) -> &SupervisorState<B::Listener> {
        &self.state
    }

    pub fn session(&self) -> &NetworkSession<R, D> {
        &self.session
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Never returns; every failure ends in `Backoff` and a fresh start.
    pub fn run(&mut self) -> ! {
        info!("Supervisor: starting");
        loop {
            self.step();
        }
    }

    /// Perform one transition.
    pub fn step(&mut self) {
        let state = std::mem::replace(&mut self.state, SupervisorState::Disconnected);

        let next = match state {
            SupervisorState::Disconnected => Ok(if self.session.refresh() {
                SupervisorState::Listening
            } else {
                SupervisorState::Connecting
            }),
            SupervisorState::Connecting => self.connect(),
            SupervisorState::Listening => self.listen(),
            SupervisorState::Accepting(listener) => self.accept_one(listener),
            SupervisorState::Backoff => {
                self.delay.delay_ms(self.server.retry_backoff_ms);
                Ok(SupervisorState::Disconnected)
            }
        };

        self.state = match next {
            Ok(state) => state,
            Err(e) => {
                error!("Server error: {}", e);
                info!("Supervisor: retrying in {}ms", self.server.retry_backoff_ms);
                SupervisorState::Backoff
            }
        };
    }

    fn connect(&mut self) -> NodeResult<SupervisorState<B::Listener>> {
        self.session.connect(&self.wifi, self.server.connect_attempts)?;
        Ok(SupervisorState::Listening)
    }

    fn listen(&mut self) -> NodeResult<SupervisorState<B::Listener>> {
        let listener = self
            .binder
            .bind(self.server.port)
            .map_err(NodeError::Listener)?;
        info!("✅ Server started on port {}", self.server.port);
        Ok(SupervisorState::Accepting(listener))
    }

    fn accept_one(
        &mut self,
        mut listener: B::Listener,
    ) -> NodeResult<SupervisorState<B::Listener>> {
        if !self.session.refresh() {
            drop(listener);
            info!("Server: listener closed");
            return Err(NodeError::ConnectivityLost);
        }

        match listener.accept() {
            Ok((mut conn, addr)) => {
                info!("Client connected from {}", addr);
                if let Served::Failed(msg) = self.handler.handle(&mut conn, &self.session) {
                    warn!("Client {} failed: {}", addr, msg);
                }
            }
            Err(e) => warn!("Error accepting client: {}", e),
        }

        Ok(SupervisorState::Accepting(listener))
    }
}
