use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FrameError;
use crate::types::SessionId;
use crate::wire::encode;

/// Методы, которые клиент отправляет при старте подписки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    CreateSession,
    SetFields,
    AddSymbols,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::CreateSession => "quote_create_session",
            Method::SetFields => "quote_set_fields",
            Method::AddSymbols => "quote_add_symbols",
        }
    }
}

/// Исходящее сообщение `{"m": ..., "p": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub m: &'static str,
    pub p: Vec<String>,
}

impl OutboundMessage {
    pub fn new(method: Method, params: Vec<String>) -> Self {
        Self {
            m: method.as_str(),
            p: params,
        }
    }

    /// Компактный JSON без пробелов
    pub fn to_json(&self) -> Result<String, FrameError> {
        serde_json::to_string(self).map_err(FrameError::Encode)
    }

    /// JSON в конверте, готовый к отправке
    pub fn to_frame(&self) -> Result<String, FrameError> {
        Ok(encode(&self.to_json()?))
    }
}

/// Входящее сообщение
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub m: String,
    #[serde(default)]
    pub p: Vec<Value>,
}

/// Последовательность старта подписки.
///
/// Порядок фиксирован: сервер ждёт `quote_create_session` раньше
/// `quote_set_fields` и `quote_add_symbols`. Подтверждений не ждём.
#[derive(Debug, Clone, Copy)]
pub struct Handshake<'a> {
    session: &'a SessionId,
    fields: &'a [String],
    symbol_id: &'a str,
}

impl<'a> Handshake<'a> {
    pub fn new(session: &'a SessionId, fields: &'a [String], symbol_id: &'a str) -> Self {
        Self {
            session,
            fields,
            symbol_id,
        }
    }

    pub fn messages(&self) -> Vec<OutboundMessage> {
        let sid = self.session.as_str().to_string();

        let mut set_fields = Vec::with_capacity(self.fields.len() + 1);
        set_fields.push(sid.clone());
        set_fields.extend(self.fields.iter().cloned());

        vec![
            OutboundMessage::new(Method::CreateSession, vec![sid.clone()]),
            OutboundMessage::new(Method::SetFields, set_fields),
            OutboundMessage::new(Method::AddSymbols, vec![sid, self.symbol_id.to_string()]),
        ]
    }

    pub fn frames(&self) -> Result<Vec<String>, FrameError> {
        self.messages().iter().map(OutboundMessage::to_frame).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::split_envelopes;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn fields() -> Vec<String> {
        ["lp", "low_price", "volume", "ch", "chp"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn handshake_is_ordered_create_set_add() {
        let sid = SessionId::generate_with(&mut StdRng::seed_from_u64(1));
        let fields = fields();
        let msgs = Handshake::new(&sid, &fields, "BINANCE:BTCUSDT").messages();

        let methods: Vec<&str> = msgs.iter().map(|m| m.m).collect();
        assert_eq!(
            methods,
            vec!["quote_create_session", "quote_set_fields", "quote_add_symbols"]
        );

        assert_eq!(msgs[0].p, vec![sid.to_string()]);
        assert_eq!(msgs[1].p[0], sid.to_string());
        assert_eq!(&msgs[1].p[1..], fields.as_slice());
        assert_eq!(msgs[2].p, vec![sid.to_string(), "BINANCE:BTCUSDT".to_string()]);
    }

    #[test]
    fn message_json_is_compact_and_m_first() {
        let msg = OutboundMessage::new(Method::CreateSession, vec!["qs_abc".into()]);
        assert_eq!(msg.to_json().unwrap(), r#"{"m":"quote_create_session","p":["qs_abc"]}"#);
    }

    #[test]
    fn frames_carry_exact_length_prefix() {
        let sid = SessionId::generate();
        let fields = vec!["lp".to_string()];
        let frames = Handshake::new(&sid, &fields, "BINANCE:BTCUSDT").frames().unwrap();
        assert_eq!(frames.len(), 3);

        for frame in &frames {
            let payloads = split_envelopes(frame).expect("well-formed envelope");
            assert_eq!(payloads.len(), 1);
            let v: Value = serde_json::from_str(payloads[0]).unwrap();
            assert!(v["m"].is_string());
        }
    }

    #[test]
    fn inbound_message_defaults_missing_params() {
        let m: Message = serde_json::from_str(r#"{"m":"quote_completed"}"#).unwrap();
        assert_eq!(m.m, "quote_completed");
        assert!(m.p.is_empty());
    }
}
