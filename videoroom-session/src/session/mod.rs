mod handle_signal_impl;
mod handle_transport_impl;
mod leave_impl;
mod options;
mod start_impl;
mod subscriber;

pub use options::*;
pub use subscriber::*;
