//! Основной цикл сессии.
//!
//! `Connecting -> HandshakeSent -> Streaming -> Closed(reason)`.
//! Один поток, кадры обрабатываются строго по порядку. Ответ на ping уходит
//! до следующего `recv`. Флаг остановки проверяется между блоками, кадр,
//! который уже начали обрабатывать, дорабатывается до конца.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, trace, warn};

use crate::config::StreamConfig;
use crate::dispatch::{self, Dispatch};
use crate::error::{ErrorPolicy, FrameError, StreamError, TransportError};
use crate::protocol::Handshake;
use crate::types::{QuoteUpdate, SessionId};
use crate::wire::{self, Frame};

/// Транспорт: websocket в клиенте, скрипт в тестах
pub trait Transport {
    /// `Ok(Some(text))`: один логический блок,
    /// `Ok(None)`: таймаут чтения без данных (такт цикла)
    fn recv(&mut self) -> Result<Option<String>, TransportError>;

    /// Синхронная отправка, возвращается после записи
    fn send(&mut self, text: &str) -> Result<(), TransportError>;

    /// Закрыть соединение, ошибки игнорируются
    fn close(&mut self) {}
}

/// Получатель котировок больше не принимает данные
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

/// Куда отдаются котировки
pub trait QuoteSink {
    fn emit(&mut self, quote: QuoteUpdate) -> Result<(), SinkClosed>;
}

impl<F> QuoteSink for F
where
    F: FnMut(QuoteUpdate) -> Result<(), SinkClosed>,
{
    fn emit(&mut self, quote: QuoteUpdate) -> Result<(), SinkClosed> {
        self(quote)
    }
}

impl QuoteSink for Vec<QuoteUpdate> {
    fn emit(&mut self, quote: QuoteUpdate) -> Result<(), SinkClosed> {
        self.push(quote);
        Ok(())
    }
}

/// Почему сессия закрылась
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Cancelled,
    ConnectionError,
    TransportError,
    SinkClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Connecting,
    HandshakeSent,
    Streaming,
    Closed(CloseReason),
}

/// Счётчики сессии, для итогового лога
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub units: u64,
    pub quotes: u64,
    pub pings: u64,
    pub ignored: u64,
    pub errors: u64,
}

pub struct StreamLoop {
    config: StreamConfig,
    symbol_id: String,
    session: Option<SessionId>,
    state: StreamState,
    stats: SessionStats,
}

impl StreamLoop {
    pub fn new(config: StreamConfig, symbol_id: impl Into<String>) -> Self {
        Self {
            config,
            symbol_id: symbol_id.into(),
            session: None,
            state: StreamState::Idle,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Сессия текущего соединения, появляется после подключения
    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Подключается через `connect`, шлёт handshake и крутит цикл до
    /// остановки по `shutdown` (`Ok`) или до ошибки транспорта (`Err`).
    pub fn run<T, C, S>(
        &mut self,
        connect: C,
        sink: &mut S,
        shutdown: &AtomicBool,
    ) -> Result<SessionStats, StreamError>
    where
        T: Transport,
        C: FnOnce(&StreamConfig) -> Result<T, TransportError>,
        S: QuoteSink + ?Sized,
    {
        self.state = StreamState::Connecting;
        self.stats = SessionStats::default();
        info!("connecting to {}", self.config.ws_url);

        let mut transport = match connect(&self.config) {
            Ok(t) => t,
            Err(e) => {
                self.state = StreamState::Closed(CloseReason::ConnectionError);
                return Err(StreamError::Connection(e));
            }
        };

        let session = SessionId::generate();
        self.session = Some(session.clone());

        let result = self.drive(&mut transport, &session, sink, shutdown);
        transport.close();

        info!(
            "session {session} closed: units={}, quotes={}, pings={}, ignored={}, errors={}",
            self.stats.units, self.stats.quotes, self.stats.pings, self.stats.ignored, self.stats.errors
        );
        result
    }

    fn drive<T, S>(
        &mut self,
        transport: &mut T,
        session: &SessionId,
        sink: &mut S,
        shutdown: &AtomicBool,
    ) -> Result<SessionStats, StreamError>
    where
        T: Transport,
        S: QuoteSink + ?Sized,
    {
        let frames = Handshake::new(session, &self.config.fields, &self.symbol_id).frames();
        let frames = frames.map_err(|e| self.fatal_frame(e))?;
        for frame in &frames {
            transport.send(frame).map_err(|e| self.fail(e))?;
            trace!("sent {frame}");
        }
        self.state = StreamState::HandshakeSent;
        info!(
            "session {session}: subscribed to {} ({})",
            self.symbol_id,
            self.config.fields.join(",")
        );

        self.state = StreamState::Streaming;
        while !shutdown.load(Ordering::Relaxed) {
            let raw = match transport.recv() {
                Ok(Some(raw)) => raw,
                // просто "тик" цикла
                Ok(None) => continue,
                Err(e) => return Err(self.fail(e)),
            };

            self.stats.units += 1;
            trace!("recv {raw}");

            for decoded in wire::decode(&raw) {
                self.handle_frame(decoded, transport, sink)?;
            }
        }

        info!("shutting down session {session}");
        self.state = StreamState::Closed(CloseReason::Cancelled);
        Ok(self.stats)
    }

    fn handle_frame<T, S>(
        &mut self,
        decoded: Result<Frame, FrameError>,
        transport: &mut T,
        sink: &mut S,
    ) -> Result<(), StreamError>
    where
        T: Transport,
        S: QuoteSink + ?Sized,
    {
        let frame = match decoded {
            Ok(frame) => frame,
            Err(e) => return self.on_frame_error(e),
        };

        match frame {
            Frame::Data(data) => match dispatch::classify(&data) {
                Ok(Dispatch::Quote(quote)) => {
                    self.stats.quotes += 1;
                    if sink.emit(quote).is_err() {
                        warn!("quote sink closed; stopping session");
                        self.state = StreamState::Closed(CloseReason::SinkClosed);
                        return Err(StreamError::SinkClosed);
                    }
                }
                Ok(Dispatch::Ignored) => {
                    self.stats.ignored += 1;
                    debug!("ignored message: {}", data.raw);
                }
                Err(e) => return self.on_frame_error(e),
            },
            Frame::Ping(payload) => {
                transport
                    .send(&wire::respond_to_ping(&payload))
                    .map_err(|e| self.fail(e))?;
                self.stats.pings += 1;
                debug!("PING {payload}");
            }
            Frame::Unrecognized(raw) => {
                debug!("unrecognized message: {raw:?}");
            }
        }

        Ok(())
    }

    fn on_frame_error(&mut self, e: FrameError) -> Result<(), StreamError> {
        match e.policy() {
            ErrorPolicy::RecoverLocally => {
                self.stats.errors += 1;
                warn!("{e}");
                Ok(())
            }
            _ => Err(self.fatal_frame(e)),
        }
    }

    fn fatal_frame(&mut self, e: FrameError) -> StreamError {
        self.state = StreamState::Closed(CloseReason::TransportError);
        StreamError::Frame(e)
    }

    fn fail(&mut self, e: TransportError) -> StreamError {
        match &e {
            TransportError::Closed => info!("server closed connection"),
            other => warn!("transport error: {other}"),
        }
        self.state = StreamState::Closed(CloseReason::TransportError);
        StreamError::Transport(e)
    }
}
