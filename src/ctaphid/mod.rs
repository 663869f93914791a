pub mod exchange;
pub mod frame;
pub mod session;
pub mod status;
pub mod transport;
pub mod types;

pub use session::{Capabilities, Session};
pub use status::{KeepaliveStatus, Status, StatusClass, classify};
pub use transport::Transport;
