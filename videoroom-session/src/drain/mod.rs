mod feedback_drain;

pub use feedback_drain::*;
