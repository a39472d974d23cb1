//! Host stand-ins for the board: clock, delays, pins, radio, sockets.

use crate::flow::{Clock, PulseCounter};
use crate::http::{Accept, ClientHandler, Connection, Listen, Served, StatusReport};
use crate::wifi::{Connectivity, LinkStatus, Radio};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Cursor, Read, Write};
use std::net::{Ipv4Addr, SocketAddr};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
    oversleep: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    /// Extra time every delay takes beyond what was asked.
    pub fn set_oversleep_ms(&self, ms: u64) {
        self.oversleep.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Delay that advances the manual clock and fires sensor edges meanwhile.
#[derive(Clone)]
pub struct PulsingDelay {
    clock: ManualClock,
    counter: Arc<PulseCounter>,
    pulses: Rc<Cell<u32>>,
    windows: Rc<Cell<u32>>,
}

impl PulsingDelay {
    pub fn new(clock: ManualClock, counter: Arc<PulseCounter>, pulses_per_window: u32) -> Self {
        Self {
            clock,
            counter,
            pulses: Rc::new(Cell::new(pulses_per_window)),
            windows: Rc::new(Cell::new(0)),
        }
    }

    pub fn windows(&self) -> u32 {
        self.windows.get()
    }
}

impl DelayMs<u32> for PulsingDelay {
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..self.pulses.get() {
            self.counter.on_edge();
        }
        let oversleep = self.clock.oversleep.get();
        self.clock.advance(u64::from(ms) + oversleep);
        self.windows.set(self.windows.get() + 1);
    }
}

#[derive(Clone, Default)]
pub struct CountingDelay {
    waits: Rc<RefCell<Vec<u32>>>,
}

impl CountingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<u32> {
        self.waits.borrow().clone()
    }
}

impl DelayMs<u32> for CountingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.waits.borrow_mut().push(ms);
    }
}

#[derive(Clone, Default)]
pub struct RecordingPin {
    levels: Rc<RefCell<Vec<bool>>>,
    broken: bool,
}

impl RecordingPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn levels(&self) -> Vec<bool> {
        self.levels.borrow().clone()
    }

    pub fn level(&self) -> Option<bool> {
        self.levels.borrow().last().copied()
    }

    fn drive(&mut self, high: bool) -> Result<(), ()> {
        if self.broken {
            return Err(());
        }
        self.levels.borrow_mut().push(high);
        Ok(())
    }
}

impl OutputPin for RecordingPin {
    type Error = ();

    fn set_low(&mut self) -> Result<(), ()> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), ()> {
        self.drive(true)
    }
}

pub struct StaticLink(pub bool);

impl Connectivity for StaticLink {
    fn is_connected(&self) -> bool {
        self.0
    }
}

pub struct MemoryConnection {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
    fail_reads: bool,
    fail_writes: bool,
    closes: Rc<Cell<u32>>,
}

impl MemoryConnection {
    pub fn new(request: &[u8]) -> Self {
        Self {
            input: Cursor::new(request.to_vec()),
            output: Vec::new(),
            fail_reads: false,
            fail_writes: false,
            closes: Rc::new(Cell::new(0)),
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::new(b"")
        }
    }

    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn with_close_counter(mut self, closes: Rc<Cell<u32>>) -> Self {
        self.closes = closes;
        self
    }

    pub fn response(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn json_body(&self) -> serde_json::Value {
        let response = self.response();
        let body = response.split("\r\n\r\n").nth(1).unwrap_or("");
        serde_json::from_str(body).unwrap()
    }

    pub fn is_closed(&self) -> bool {
        self.closes.get() > 0
    }
}

impl Read for MemoryConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_reads {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
        }
        self.input.read(buf)
    }
}

impl Write for MemoryConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
        }
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Connection for MemoryConnection {
    fn close(&mut self) -> io::Result<()> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}

#[derive(Default)]
struct RadioState {
    connecting: bool,
    polls: u32,
    ready_after: u32,
    fail_association: bool,
    fail_activation: bool,
    forced: Option<LinkStatus>,
    connect_calls: u32,
    disconnect_calls: u32,
}

/// Radio whose link comes up after a set number of status polls.
#[derive(Clone, Default)]
pub struct ScriptedRadio {
    state: Rc<RefCell<RadioState>>,
}

impl ScriptedRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready_after_polls(&self, polls: u32) {
        self.state.borrow_mut().ready_after = polls;
    }

    pub fn fail_association(&self) {
        self.state.borrow_mut().fail_association = true;
    }

    pub fn fail_activation(&self) {
        self.state.borrow_mut().fail_activation = true;
    }

    /// Clear injected faults. A rejected attempt is abandoned, so the link reads
    /// `Idle` until the next `begin_connect`.
    pub fn recover(&self) {
        let mut state = self.state.borrow_mut();
        if state.fail_association {
            state.connecting = false;
        }
        state.fail_association = false;
        state.fail_activation = false;
    }

    /// Report `status` until the next connect or disconnect.
    pub fn force_status(&self, status: LinkStatus) {
        self.state.borrow_mut().forced = Some(status);
    }

    pub fn connect_calls(&self) -> u32 {
        self.state.borrow().connect_calls
    }

    pub fn disconnect_calls(&self) -> u32 {
        self.state.borrow().disconnect_calls
    }
}

impl Radio for ScriptedRadio {
    fn activate(&mut self) -> anyhow::Result<()> {
        if self.state.borrow().fail_activation {
            anyhow::bail!("wifi driver not started");
        }
        Ok(())
    }

    fn begin_connect(&mut self, _ssid: &str, _password: &str) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        state.forced = None;
        state.connecting = true;
        state.polls = 0;
        state.connect_calls += 1;
        Ok(())
    }

    fn disconnect(&mut self) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        state.forced = None;
        state.connecting = false;
        state.disconnect_calls += 1;
        Ok(())
    }

    fn link_status(&self) -> LinkStatus {
        let mut state = self.state.borrow_mut();
        if let Some(forced) = state.forced {
            return forced;
        }
        if !state.connecting {
            return LinkStatus::Idle;
        }
        if state.fail_association {
            return LinkStatus::Failed;
        }

        let status = if state.polls >= state.ready_after {
            LinkStatus::GotIp
        } else {
            LinkStatus::Connecting
        };
        state.polls += 1;
        status
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        (self.link_status() == LinkStatus::GotIp).then(|| Ipv4Addr::new(192, 168, 1, 50))
    }
}

enum AcceptEvent {
    Client,
    Error,
}

#[derive(Default)]
struct BinderState {
    binds: u32,
    fail_next_bind: bool,
    events: VecDeque<AcceptEvent>,
    listeners_closed: u32,
    closed_connections: Rc<Cell<u32>>,
}

/// Listener factory with a scripted accept queue.
#[derive(Clone, Default)]
pub struct ScriptedBinder {
    state: Rc<RefCell<BinderState>>,
}

impl ScriptedBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_clients(&self, count: usize) {
        let mut state = self.state.borrow_mut();
        for _ in 0..count {
            state.events.push_back(AcceptEvent::Client);
        }
    }

    pub fn queue_accept_error(&self) {
        self.state.borrow_mut().events.push_back(AcceptEvent::Error);
    }

    pub fn fail_next_bind(&self) {
        self.state.borrow_mut().fail_next_bind = true;
    }

    /// Bind attempts, failed ones included
    pub fn binds(&self) -> u32 {
        self.state.borrow().binds
    }

    pub fn listeners_closed(&self) -> u32 {
        self.state.borrow().listeners_closed
    }

    pub fn closed_connections(&self) -> u32 {
        self.state.borrow().closed_connections.get()
    }
}

pub struct ScriptedListener {
    state: Rc<RefCell<BinderState>>,
}

impl Listen for ScriptedBinder {
    type Listener = ScriptedListener;

    fn bind(&mut self, _port: u16) -> io::Result<ScriptedListener> {
        let mut state = self.state.borrow_mut();
        state.binds += 1;
        if std::mem::take(&mut state.fail_next_bind) {
            return Err(io::Error::new(io::ErrorKind::AddrInUse, "address in use"));
        }
        Ok(ScriptedListener {
            state: Rc::clone(&self.state),
        })
    }
}

impl Accept for ScriptedListener {
    type Stream = MemoryConnection;

    fn accept(&mut self) -> io::Result<(MemoryConnection, SocketAddr)> {
        let mut state = self.state.borrow_mut();
        match state.events.pop_front() {
            Some(AcceptEvent::Client) => {
                let conn = MemoryConnection::new(b"GET / HTTP/1.1\r\n\r\n")
                    .with_close_counter(Rc::clone(&state.closed_connections));
                Ok((conn, SocketAddr::from(([192, 168, 1, 20], 51000))))
            }
            Some(AcceptEvent::Error) => Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "connection aborted",
            )),
            None => Err(io::Error::new(io::ErrorKind::WouldBlock, "no client")),
        }
    }
}

impl Drop for ScriptedListener {
    fn drop(&mut self) {
        self.state.borrow_mut().listeners_closed += 1;
    }
}

#[derive(Default)]
pub struct RecordingHandler {
    served: u32,
    fail: bool,
}

impl RecordingHandler {
    pub fn served(&self) -> u32 {
        self.served
    }

    pub fn fail_all(&mut self) {
        self.fail = true;
    }
}

impl ClientHandler for RecordingHandler {
    fn handle(&mut self, conn: &mut dyn Connection, link: &dyn Connectivity) -> Served {
        self.served += 1;
        let _ = conn.close();
        if self.fail {
            Served::Failed("client went away".into())
        } else {
            Served::Status(StatusReport::new(link.is_connected(), 0.0, false))
        }
    }
}
