use std::io::Cursor;
use tracing::debug;
use videoroom_core::MediaKind;
use webrtc::sdp::description::media::MediaDescription;
use webrtc::sdp::description::session::SessionDescription;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcpFeedback {
    pub typ: String,
    pub parameter: String,
}

/// Кодек, объявленный в удаленном offer (`a=rtpmap` + `a=fmtp` + `a=rtcp-fb`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecCapability {
    pub kind: MediaKind,
    pub payload_type: u8,
    pub name: String,
    pub clock_rate: u32,
    pub channels: u16,
    pub fmtp: String,
    pub feedback: Vec<RtcpFeedback>,
}

impl CodecCapability {
    /// MIME тип для известных кодеков, `None` для всего остального (rtx, red, ulpfec...).
    pub fn mime_type(&self) -> Option<&'static str> {
        let mime = match (self.kind, self.name.to_ascii_lowercase().as_str()) {
            (MediaKind::Audio, "opus") => "audio/opus",
            (MediaKind::Audio, "pcmu") => "audio/PCMU",
            (MediaKind::Audio, "pcma") => "audio/PCMA",
            (MediaKind::Audio, "g722") => "audio/G722",
            (MediaKind::Video, "vp8") => "video/VP8",
            (MediaKind::Video, "vp9") => "video/VP9",
            (MediaKind::Video, "h264") => "video/H264",
            (MediaKind::Video, "av1") => "video/AV1",
            _ => return None,
        };
        Some(mime)
    }
}

/// Набор кодеков, под который создается транспорт.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecSet {
    /// Только то, что объявил сервер в offer.
    Offered(Vec<CodecCapability>),
    /// Offer не разобран или в нем нет знакомых кодеков.
    Default,
}

impl CodecSet {
    pub fn from_offer(sdp: &str) -> Self {
        let mut reader = Cursor::new(sdp.as_bytes());
        let desc = match SessionDescription::unmarshal(&mut reader) {
            Ok(desc) => desc,
            Err(e) => {
                debug!("Offer SDP could not be parsed, using default codecs: {}", e);
                return Self::Default;
            }
        };

        let codecs: Vec<CodecCapability> = desc
            .media_descriptions
            .iter()
            .flat_map(section_codecs)
            .filter(|codec| codec.mime_type().is_some())
            .collect();

        if codecs.is_empty() {
            debug!("Offer advertises no known codecs, using default codecs");
            return Self::Default;
        }
        Self::Offered(codecs)
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

fn section_codecs(md: &MediaDescription) -> Vec<CodecCapability> {
    let kind = match md.media_name.media.as_str() {
        "audio" => MediaKind::Audio,
        "video" => MediaKind::Video,
        _ => return Vec::new(),
    };

    let mut codecs = Vec::new();
    for format in &md.media_name.formats {
        let Ok(payload_type) = format.parse::<u8>() else {
            continue;
        };

        let rtpmap = attribute_for(md, "rtpmap", payload_type)
            .and_then(parse_rtpmap)
            .or_else(|| static_rtpmap(payload_type));
        let Some((name, clock_rate, channels)) = rtpmap else {
            continue;
        };

        codecs.push(CodecCapability {
            kind,
            payload_type,
            name,
            clock_rate,
            channels,
            fmtp: attribute_for(md, "fmtp", payload_type)
                .unwrap_or_default()
                .to_owned(),
            feedback: feedback_for(md, payload_type),
        });
    }
    codecs
}

/// Значение атрибута `a=<key>:<pt> <value>` без префикса payload type.
fn attribute_for<'a>(md: &'a MediaDescription, key: &str, payload_type: u8) -> Option<&'a str> {
    md.attributes
        .iter()
        .filter(|attr| attr.key == key)
        .filter_map(|attr| attr.value.as_deref())
        .find_map(|value| {
            let (pt, rest) = value.split_once(' ')?;
            (pt.parse::<u8>().ok()? == payload_type).then(|| rest.trim())
        })
}

// "opus/48000/2" -> ("opus", 48000, 2)
fn parse_rtpmap(encoding: &str) -> Option<(String, u32, u16)> {
    let mut parts = encoding.split('/');
    let name = parts.next()?.trim();
    if name.is_empty() {
        return None;
    }
    let clock_rate = parts.next()?.trim().parse().ok()?;
    let channels = match parts.next() {
        Some(c) => c.trim().parse().ok()?,
        None => 0,
    };
    Some((name.to_owned(), clock_rate, channels))
}

fn static_rtpmap(payload_type: u8) -> Option<(String, u32, u16)> {
    let name = match payload_type {
        0 => "PCMU",
        8 => "PCMA",
        9 => "G722",
        _ => return None,
    };
    Some((name.to_owned(), 8000, 0))
}

fn feedback_for(md: &MediaDescription, payload_type: u8) -> Vec<RtcpFeedback> {
    md.attributes
        .iter()
        .filter(|attr| attr.key == "rtcp-fb")
        .filter_map(|attr| attr.value.as_deref())
        .filter_map(|value| {
            let mut words = value.split_whitespace();
            let target = words.next()?;
            if target != "*" && target.parse::<u8>().ok()? != payload_type {
                return None;
            }
            let typ = words.next()?.to_owned();
            let parameter = words.collect::<Vec<_>>().join(" ");
            Some(RtcpFeedback { typ, parameter })
        })
        .collect()
}
