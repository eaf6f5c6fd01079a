mod media;
mod options;
mod session;
mod signaling;

pub use media::MediaKind;
pub use options::JoinOptions;
pub use session::{SessionId, SessionState};
pub use signaling::{
    IceCandidate, IceServerConfig, Jsep, JoinResponse, SdpType, SignalEvent, Trickle,
};
