use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::time::Duration;

/// One accepted client stream.
pub trait Connection: Read + Write {
    /// Release the socket. Called exactly once per connection.
    fn close(&mut self) -> io::Result<()>;
}

/// A bound listener handing out connections one at a time.
pub trait Accept {
    type Stream: Connection;

    fn accept(&mut self) -> io::Result<(Self::Stream, SocketAddr)>;
}

/// Opens listeners. Dropping the listener closes the socket.
pub trait Listen {
    type Listener: Accept;

    fn bind(&mut self, port: u16) -> io::Result<Self::Listener>;
}

impl Connection for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// `Listen` over lwIP/std sockets, applying the client read timeout on accept.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpBinder {
    read_timeout: Option<Duration>,
}

impl TcpBinder {
    pub fn new(read_timeout: Option<Duration>) -> Self {
        Self { read_timeout }
    }
}

pub struct TcpAcceptor {
    listener: TcpListener,
    read_timeout: Option<Duration>,
}

impl TcpAcceptor {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Listen for TcpBinder {
    type Listener = TcpAcceptor;

    fn bind(&mut self, port: u16) -> io::Result<TcpAcceptor> {
        let listener = TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))?;
        Ok(TcpAcceptor {
            listener,
            read_timeout: self.read_timeout,
        })
    }
}

impl Accept for TcpAcceptor {
    type Stream = TcpStream;

    fn accept(&mut self) -> io::Result<(TcpStream, SocketAddr)> {
        let (stream, addr) = self.listener.accept()?;
        stream.set_read_timeout(self.read_timeout)?;
        Ok((stream, addr))
    }
}
