mod media_engine;
mod rtc_factory;
mod rtc_media;
mod rtc_transport;

pub use rtc_factory::RtcTransportFactory;
pub use rtc_media::{RtcReceiverFeedback, RtcRemoteTrack, RtcSenderFeedback, RtcTransceiver};
pub use rtc_transport::RtcTransport;
