use thiserror::Error;

use crate::types::Category;

/// Верхнеуровневый тип ошибок крейта
#[derive(Debug, Error)]
pub enum QuoteCoreError {
    /// Ошибки поиска символа
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Ошибки разбора отдельного кадра
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Ошибки потоковой сессии
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Что делать с ошибкой данного вида
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Залогировать и продолжить цикл
    RecoverLocally,
    /// Завершить текущую сессию
    TerminateSession,
    /// Завершить процесс с ненулевым кодом
    TerminateProcess,
}

impl QuoteCoreError {
    /// Таблица политик: вид ошибки -> реакция
    pub fn policy(&self) -> ErrorPolicy {
        match self {
            QuoteCoreError::Lookup(_) => ErrorPolicy::TerminateProcess,
            QuoteCoreError::Frame(e) => e.policy(),
            QuoteCoreError::Stream(StreamError::Connection(_)) => ErrorPolicy::TerminateProcess,
            QuoteCoreError::Stream(_) => ErrorPolicy::TerminateSession,
        }
    }
}

/// Ошибки поиска символа
#[derive(Debug, Error)]
pub enum LookupError {
    /// Поиск не вернул ни одного кандидата
    #[error("nothing found for {query:?} in category {category}")]
    NotFound { query: String, category: Category },

    /// У кандидата пустое обязательное поле
    #[error("symbol candidate has empty field: {0}")]
    EmptyField(&'static str),
}

/// Ошибки кадра: локальные, цикл после них продолжается
#[derive(Debug, Error)]
pub enum FrameError {
    /// Подстрока с `{` не разобралась как JSON
    #[error("malformed json: {source}; message: {raw}")]
    Json {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    /// JSON не похож на сообщение `{m, p}`
    #[error("not a protocol message: {source}; message: {raw}")]
    Message {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    /// `qsd` без обязательных ключей
    #[error("malformed qsd payload: {reason}; message: {raw}")]
    MalformedQuote { reason: String, raw: String },

    /// Не удалось сериализовать исходящее сообщение
    #[error("failed to encode outbound message: {0}")]
    Encode(#[source] serde_json::Error),
}

impl FrameError {
    /// Входящие кадры восстанавливаются локально, исходящие нет
    pub fn policy(&self) -> ErrorPolicy {
        match self {
            FrameError::Encode(_) => ErrorPolicy::TerminateSession,
            _ => ErrorPolicy::RecoverLocally,
        }
    }

    /// Исходный текст кадра, если он есть
    pub fn raw(&self) -> Option<&str> {
        match self {
            FrameError::Json { raw, .. }
            | FrameError::Message { raw, .. }
            | FrameError::MalformedQuote { raw, .. } => Some(raw),
            FrameError::Encode(_) => None,
        }
    }
}

/// Ошибки транспорта (websocket или тестовый заменитель)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Соединение закрыто сервером
    #[error("connection closed")]
    Closed,

    /// Ошибка ввода-вывода
    #[error("i/o error: {0}")]
    Io(String),

    /// Ошибка протокола транспорта (handshake, tls, websocket)
    #[error("transport protocol error: {0}")]
    Protocol(String),
}

/// Причины, по которым сессия завершилась с ошибкой
#[derive(Debug, Error)]
pub enum StreamError {
    /// Не удалось установить соединение
    #[error("failed to connect: {0}")]
    Connection(#[source] TransportError),

    /// Транспорт сломался посреди сессии
    #[error("session terminated: {0}")]
    Transport(#[source] TransportError),

    /// Ошибка кадра, после которой продолжать нельзя
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Получатель котировок больше не принимает данные
    #[error("quote sink closed")]
    SinkClosed,
}
