//! # tvquote-core
//!
//! Протокол потоковых котировок поверх websocket: кадрирование
//! `~m~<len>~m~<payload>`, keep-alive через эхо ping-сообщений, handshake
//! подписки и разбор `qsd`-сообщений в [`QuoteUpdate`].
//!
//! Этот крейт содержит:
//!
//! - [`wire`]: кодирование/декодирование кадров и ответ на ping
//! - [`protocol`]: исходящие сообщения и handshake сессии
//! - [`dispatch`]: классификация JSON-кадров и извлечение котировок
//! - [`stream`]: цикл сессии поверх трейта [`Transport`]
//! - [`symbol`]: выбор символа из ответа поиска
//! - [`fields`]: чтение и нормализация списка полей подписки
//! - [`types`]: доменные типы
//! - [`error`]: типы ошибок и таблица политик
//!
//! ## Пример: конверт и ping
//!
//! ```rust
//! use tvquote_core::wire::{decode, encode, respond_to_ping, Frame};
//!
//! assert_eq!(encode("~h~1"), "~m~4~m~~h~1");
//!
//! let frames = decode("~m~4~m~~h~1");
//! match frames.into_iter().next().unwrap().unwrap() {
//!     Frame::Ping(p) => assert_eq!(respond_to_ping(&p), "~m~4~m~~h~1"),
//!     other => panic!("unexpected frame: {other:?}"),
//! }
//! ```
//!
//! ## Пример: котировка из `qsd`
//!
//! ```rust
//! use tvquote_core::dispatch::{classify, Dispatch};
//! use tvquote_core::wire::{decode, encode, Frame};
//! use tvquote_core::FieldValue;
//!
//! let raw = encode(r#"{"m":"qsd","p":["qs_x",{"n":"BINANCE:BTCUSDT","v":{"lp":50000.5}}]}"#);
//! let Ok(Frame::Data(data)) = decode(&raw).remove(0) else { panic!() };
//! let Dispatch::Quote(q) = classify(&data).unwrap() else { panic!() };
//!
//! assert_eq!(q.symbol, "BINANCE:BTCUSDT");
//! assert_eq!(q.last_price, FieldValue::Known(50000.5));
//! assert_eq!(q.volume, FieldValue::Unknown);
//! ```
//!
//! ## Дизайн
//!
//! Как и раньше, ядро без runtime и без сетевых зависимостей: websocket и
//! HTTP живут в `tvquote-client`, сюда они приходят через [`Transport`] и
//! готовый список кандидатов.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Кадрирование `~m~<len>~m~<payload>`.
pub mod wire;

/// Исходящие сообщения и handshake.
pub mod protocol;

/// Разбор входящих JSON-кадров.
pub mod dispatch;

/// Цикл потоковой сессии.
pub mod stream;

/// Выбор символа из результатов поиска.
pub mod symbol;

/// Чтение/нормализация списка полей подписки.
pub mod fields;

/// Доменные типы.
pub mod types;

/// Конфигурация сессии.
pub mod config;

/// Ошибки `tvquote-core`.
pub mod error;

/// Общие константы
mod constants;
pub use constants::{DEFAULT_FIELDS, DEFAULT_ORIGIN, DEFAULT_WS_URL, READ_TICK};

// --- Re-exports (публичный фасад API) ---

pub use crate::config::StreamConfig;
pub use crate::error::{
    ErrorPolicy, FrameError, LookupError, QuoteCoreError, StreamError, TransportError,
};
pub use crate::stream::{QuoteSink, SessionStats, SinkClosed, StreamLoop, Transport};
pub use crate::types::{
    Category, FieldValue, QuoteUpdate, ResolvedSymbol, SessionId, SymbolCandidate, SymbolQuery,
};
