pub use videoroom_core::model::SessionId;

pub mod model {
    pub use videoroom_core::model::*;
}

#[cfg(feature = "session")]
pub mod session {
    pub use videoroom_session::*;
}
