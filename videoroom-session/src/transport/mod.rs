mod capabilities;
mod rtc;
mod transport_config;
mod transport_event;
mod transport_peer;

pub use capabilities::*;
pub use rtc::*;
pub use transport_config::*;
pub use transport_event::*;
pub use transport_peer::*;
