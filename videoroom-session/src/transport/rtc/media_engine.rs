use anyhow::{Context, Result};
use videoroom_core::MediaKind;
use webrtc::api::media_engine::MediaEngine;
use webrtc::rtp_transceiver::RTCPFeedback;
use webrtc::rtp_transceiver::rtp_codec::{
    RTCRtpCodecCapability, RTCRtpCodecParameters, RTPCodecType,
};

use crate::transport::capabilities::{CodecCapability, CodecSet};

/// MediaEngine только с кодеками из offer, либо со стандартным набором.
pub(crate) fn media_engine_for(codecs: &CodecSet) -> Result<MediaEngine> {
    let mut m = MediaEngine::default();

    let offered = match codecs {
        CodecSet::Default => {
            m.register_default_codecs()?;
            return Ok(m);
        }
        CodecSet::Offered(offered) => offered,
    };

    for codec in offered {
        let Some(params) = codec_parameters(codec) else {
            continue;
        };
        m.register_codec(params, codec_type(codec.kind))
            .with_context(|| {
                format!(
                    "register {} as payload type {}",
                    codec.name, codec.payload_type
                )
            })?;
    }
    Ok(m)
}

pub(crate) fn codec_type(kind: MediaKind) -> RTPCodecType {
    match kind {
        MediaKind::Audio => RTPCodecType::Audio,
        MediaKind::Video => RTPCodecType::Video,
    }
}

fn codec_parameters(codec: &CodecCapability) -> Option<RTCRtpCodecParameters> {
    let mime_type = codec.mime_type()?;
    Some(RTCRtpCodecParameters {
        capability: RTCRtpCodecCapability {
            mime_type: mime_type.to_owned(),
            clock_rate: codec.clock_rate,
            channels: codec.channels,
            sdp_fmtp_line: codec.fmtp.clone(),
            rtcp_feedback: codec
                .feedback
                .iter()
                .map(|fb| RTCPFeedback {
                    typ: fb.typ.clone(),
                    parameter: fb.parameter.clone(),
                })
                .collect(),
        },
        payload_type: codec.payload_type,
        ..Default::default()
    })
}
