//! Разбор JSON-кадров: `qsd` -> [`QuoteUpdate`], остальное игнорируется.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::constants::IGNORED_MARKERS;
use crate::error::FrameError;
use crate::protocol::Message;
use crate::types::{FieldValue, QuoteUpdate};
use crate::wire::DataFrame;

/// Метод с данными котировки
pub const QUOTE_DATA_METHOD: &str = "qsd";

/// Результат разбора кадра
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Quote(QuoteUpdate),
    Ignored,
}

#[derive(Debug, Deserialize)]
struct QuotePayload {
    n: String,
    v: Map<String, Value>,
}

/// Классифицирует JSON-кадр. Чистая функция, состояния нет.
pub fn classify(frame: &DataFrame) -> Result<Dispatch, FrameError> {
    // маркеры ищутся в сыром тексте, до разбора сообщения
    if IGNORED_MARKERS.iter().any(|m| frame.raw.contains(m)) {
        return Ok(Dispatch::Ignored);
    }

    let msg = Message::deserialize(&frame.value).map_err(|source| FrameError::Message {
        source,
        raw: frame.raw.clone(),
    })?;

    if msg.m != QUOTE_DATA_METHOD {
        return Ok(Dispatch::Ignored);
    }

    let malformed = |reason: String| FrameError::MalformedQuote {
        reason,
        raw: frame.raw.clone(),
    };

    let payload = msg
        .p
        .get(1)
        .ok_or_else(|| malformed("missing p[1]".to_string()))?;
    let payload =
        QuotePayload::deserialize(payload).map_err(|e| malformed(e.to_string()))?;

    Ok(Dispatch::Quote(QuoteUpdate {
        symbol: payload.n,
        last_price: FieldValue::from_json(payload.v.get("lp")),
        change: FieldValue::from_json(payload.v.get("ch")),
        change_percent: FieldValue::from_json(payload.v.get("chp")),
        volume: FieldValue::from_json(payload.v.get("volume")),
        low_price: FieldValue::from_json(payload.v.get("low_price")),
    }))
}
