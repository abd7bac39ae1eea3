//! Кадрирование `~m~<len>~m~<payload>`.
//!
//! `len` считается в символах (Unicode scalar values), для ASCII это то же
//! самое, что байты. Неверная длина рассинхронизирует парсер на сервере.
//!
//! Явного типа кадра в протоколе нет, поэтому классификация эвристическая:
//! есть `{` -> данные (JSON с первой `{` до конца), иначе -> ping, который надо
//! вернуть серверу как есть. Ping с `{` внутри будет принят за данные.

use serde_json::Value;

use crate::constants::{ENVELOPE_MARKER, LEGACY_HEADER_LEN};
use crate::error::FrameError;

/// Кадр после декодирования
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// JSON-сообщение
    Data(DataFrame),
    /// Keep-alive: вернуть payload серверу в новом конверте
    Ping(String),
    /// Ни JSON, ни непустого payload
    Unrecognized(String),
}

/// JSON-кадр вместе с исходным текстом
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    /// payload конверта (или весь блок, если конверт не разобрался)
    pub raw: String,
    /// разобранный JSON начиная с первой `{`
    pub value: Value,
}

/// Заворачивает payload в конверт
pub fn encode(payload: &str) -> String {
    format!(
        "{ENVELOPE_MARKER}{}{ENVELOPE_MARKER}{payload}",
        payload.chars().count()
    )
}

/// Ответ на ping: тот же payload в свежем конверте
pub fn respond_to_ping(payload: &str) -> String {
    encode(payload)
}

/// Режет блок на payload-ы конвертов.
/// `None`, если блок не является ровной склейкой корректных конвертов.
pub fn split_envelopes(raw: &str) -> Option<Vec<&str>> {
    if raw.is_empty() {
        return None;
    }

    let mut out = Vec::new();
    let mut rest = raw;

    while !rest.is_empty() {
        rest = rest.strip_prefix(ENVELOPE_MARKER)?;

        let digits = rest.find(|c: char| !c.is_ascii_digit())?;
        if digits == 0 {
            return None;
        }
        let len: usize = rest[..digits].parse().ok()?;

        rest = rest[digits..].strip_prefix(ENVELOPE_MARKER)?;

        let end = byte_offset_of_char(rest, len)?;
        out.push(&rest[..end]);
        rest = &rest[end..];
    }

    Some(out)
}

/// Декодирует один блок от транспорта.
///
/// Блок может содержать несколько конвертов подряд, тогда каждый
/// классифицируется отдельно, в порядке следования. Если конверты не
/// разбираются, весь блок классифицируется целиком со срезанием
/// фиксированного 7-символьного заголовка.
pub fn decode(raw: &str) -> Vec<Result<Frame, FrameError>> {
    match split_envelopes(raw) {
        Some(payloads) => payloads.into_iter().map(classify_payload).collect(),
        None => vec![classify_unframed(raw)],
    }
}

fn classify_payload(payload: &str) -> Result<Frame, FrameError> {
    if let Some(frame) = parse_json_tail(payload) {
        return frame;
    }
    if payload.is_empty() {
        return Ok(Frame::Unrecognized(String::new()));
    }
    Ok(Frame::Ping(payload.to_string()))
}

fn classify_unframed(raw: &str) -> Result<Frame, FrameError> {
    if let Some(frame) = parse_json_tail(raw) {
        return frame;
    }

    let rest = match raw.char_indices().nth(LEGACY_HEADER_LEN) {
        Some((i, _)) => &raw[i..],
        None => "",
    };
    if rest.is_empty() {
        return Ok(Frame::Unrecognized(raw.to_string()));
    }
    Ok(Frame::Ping(rest.to_string()))
}

// JSON-проверка всегда идёт первой
fn parse_json_tail(text: &str) -> Option<Result<Frame, FrameError>> {
    let start = text.find('{')?;
    let parsed = serde_json::from_str::<Value>(&text[start..])
        .map(|value| {
            Frame::Data(DataFrame {
                raw: text.to_string(),
                value,
            })
        })
        .map_err(|source| FrameError::Json {
            source,
            raw: text.to_string(),
        });
    Some(parsed)
}

fn byte_offset_of_char(s: &str, n: usize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    s.char_indices().map(|(i, c)| i + c.len_utf8()).nth(n - 1)
}
