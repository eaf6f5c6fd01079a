mod bridge;
mod cancel;
mod drain;
mod error;
mod registry;
mod session;
mod signaling;
mod transport;

pub use bridge::*;
pub use cancel::*;
pub use drain::*;
pub use error::*;
pub use registry::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;
