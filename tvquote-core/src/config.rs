use std::time::Duration;

use crate::constants::{DEFAULT_ORIGIN, DEFAULT_WS_URL, READ_TICK};
use crate::fields::default_fields;

/// Неизменяемая конфигурация потоковой сессии
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// websocket endpoint
    pub ws_url: String,
    /// значение заголовка `Origin`
    pub origin: String,
    /// поля для `quote_set_fields`
    pub fields: Vec<String>,
    /// таймаут чтения: как часто проверяется флаг остановки
    pub read_tick: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            fields: default_fields(),
            read_tick: READ_TICK,
        }
    }
}
