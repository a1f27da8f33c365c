//! WebSocket host runtime for widgetsync transports.
//!
//! Each connection gets its own [`Session`]: a kernel that queues outbound
//! frames, a comm manager with the widget target, and the transports living
//! on that connection. [`serve_socket`] pumps frames both ways until the
//! peer goes away.

mod kernel;
mod session;
mod socket;

pub use kernel::ChannelKernel;
pub use session::{Endpoint, Session, SessionError};
pub use socket::{serve_socket, SocketError};
