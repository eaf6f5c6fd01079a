use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::media::MediaKind;

/// Параметры запроса `join` для подписчика.
///
/// Неизвестные плагину поля кладутся в `extra` и уходят в запрос как есть.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinOptions {
    #[serde(default = "enabled")]
    pub audio: bool,
    #[serde(default = "enabled")]
    pub video: bool,
    #[serde(default)]
    pub data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn enabled() -> bool {
    true
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
            data: false,
            display: None,
            extra: Map::new(),
        }
    }
}

impl JoinOptions {
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Виды медиа, для которых нужен recv-only трансивер. Аудио всегда первым.
    pub fn media_kinds(&self) -> Vec<MediaKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.audio {
            kinds.push(MediaKind::Audio);
        }
        if self.video {
            kinds.push(MediaKind::Video);
        }
        kinds
    }
}
