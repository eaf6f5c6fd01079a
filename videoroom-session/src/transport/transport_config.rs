use serde::{Deserialize, Serialize};
use videoroom_core::IceServerConfig;

/// Диапазон локальных UDP портов для ICE.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct PortRange {
    pub min: u16,
    pub max: u16,
}

/// Конфигурация для WebRTC
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
    pub port_range: Option<PortRange>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
            port_range: Some(PortRange {
                min: 20000,
                max: 40000,
            }),
        }
    }
}

impl TransportConfig {
    /// Без STUN и без ограничения портов: только host-кандидаты.
    pub fn local() -> Self {
        Self {
            ice_servers: Vec::new(),
            port_range: None,
        }
    }
}
