pub mod handler;
pub mod request;
pub mod response;
pub mod transport;

pub use handler::{ClientHandler, RequestHandler, Served};
pub use request::RequestKind;
pub use response::{HttpResponse, StatusReport};
pub use transport::{Accept, Connection, Listen, TcpBinder};
