mod trickle_bridge;

pub use trickle_bridge::*;
