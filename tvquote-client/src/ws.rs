use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;

use log::{debug, info};
use tungstenite::client::IntoClientRequest;
use tungstenite::http::HeaderValue;
use tungstenite::http::header::ORIGIN;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};
use tvquote_core::{StreamConfig, Transport, TransportError};

use crate::config::WS_WRITE_TIMEOUT;

/// Websocket-транспорт. `recv` блокируется не дольше `read_tick`,
/// чтобы цикл сессии успевал проверять флаг остановки.
pub(crate) struct WsTransport {
    ws: WebSocket<MaybeTlsStream<TcpStream>>,
}

/// Подключение с заголовком `Origin`, без токенов
pub(crate) fn connect(config: &StreamConfig) -> Result<WsTransport, TransportError> {
    let mut request = config
        .ws_url
        .as_str()
        .into_client_request()
        .map_err(map_ws_err)?;

    let origin = HeaderValue::from_str(&config.origin)
        .map_err(|e| TransportError::Protocol(format!("invalid origin header: {e}")))?;
    request.headers_mut().insert(ORIGIN, origin);

    let (ws, response) = tungstenite::connect(request).map_err(map_ws_err)?;
    info!("websocket connected: HTTP {}", response.status());

    set_timeouts(ws.get_ref(), config.read_tick)
        .map_err(|e| TransportError::Io(e.to_string()))?;

    Ok(WsTransport { ws })
}

fn set_timeouts(stream: &MaybeTlsStream<TcpStream>, read_tick: Duration) -> std::io::Result<()> {
    let tcp = match stream {
        MaybeTlsStream::Plain(s) => s,
        MaybeTlsStream::Rustls(s) => s.get_ref(),
        _ => return Ok(()),
    };
    tcp.set_nodelay(true).ok();
    tcp.set_read_timeout(Some(read_tick))?;
    tcp.set_write_timeout(Some(WS_WRITE_TIMEOUT))?;
    Ok(())
}

fn map_ws_err(e: tungstenite::Error) -> TransportError {
    match e {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TransportError::Closed
        }
        tungstenite::Error::Io(e) => TransportError::Io(e.to_string()),
        other => TransportError::Protocol(other.to_string()),
    }
}

impl Transport for WsTransport {
    fn recv(&mut self) -> Result<Option<String>, TransportError> {
        match self.ws.read() {
            Ok(Message::Text(text)) => Ok(Some(text.as_str().to_owned())),
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => Ok(Some(text)),
                Err(_) => {
                    debug!("skipping non-utf8 binary message ({} bytes)", bytes.len());
                    Ok(None)
                }
            },
            Ok(Message::Close(frame)) => {
                info!("server sent close frame: {frame:?}");
                Err(TransportError::Closed)
            }
            // websocket ping/pong отвечает сам tungstenite
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => Ok(None),
            Err(tungstenite::Error::Io(e))
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
            {
                // просто "тик" цикла, ничего не делаем
                Ok(None)
            }
            Err(e) => Err(map_ws_err(e)),
        }
    }

    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.ws
            .send(Message::text(text.to_owned()))
            .map_err(map_ws_err)
    }

    fn close(&mut self) {
        if self.ws.close(None).is_ok() {
            let _ = self.ws.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use tungstenite::handshake::server::{ErrorResponse, Request, Response};
    use tvquote_core::wire::encode;
    use tvquote_core::{FieldValue, QuoteUpdate, StreamError, StreamLoop};

    struct Seen {
        origin: Option<String>,
        handshake: Vec<String>,
        echo: String,
    }

    fn read_text(ws: &mut WebSocket<TcpStream>) -> String {
        loop {
            match ws.read().unwrap() {
                Message::Text(t) => return t.as_str().to_owned(),
                _ => continue,
            }
        }
    }

    /// Мини-сервер: handshake, ping, одна котировка, close
    fn serve_session(listener: TcpListener) -> thread::JoinHandle<Seen> {
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();

            let mut origin = None;
            let mut ws = tungstenite::accept_hdr(
                stream,
                |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    origin = req
                        .headers()
                        .get("origin")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    Ok(resp)
                },
            )
            .unwrap();

            let handshake: Vec<String> = (0..3).map(|_| read_text(&mut ws)).collect();

            ws.send(Message::text(encode("~h~1"))).unwrap();
            let echo = read_text(&mut ws);

            let qsd = encode(
                r#"{"m":"qsd","p":["qs_x",{"n":"BINANCE:BTCUSDT","v":{"lp":50000.5,"ch":-1.2}}]}"#,
            );
            ws.send(Message::text(qsd)).unwrap();
            ws.close(None).unwrap();

            // дочитываем до конца close-handshake
            while ws.read().is_ok() {}

            Seen {
                origin,
                handshake,
                echo,
            }
        })
    }

    #[test]
    fn full_session_against_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = serve_session(listener);

        let config = StreamConfig {
            ws_url: format!("ws://{addr}/socket.io/websocket"),
            ..StreamConfig::default()
        };
        let mut session = StreamLoop::new(config, "BINANCE:BTCUSDT");
        let mut quotes: Vec<QuoteUpdate> = Vec::new();

        let err = session
            .run(connect, &mut quotes, &AtomicBool::new(false))
            .unwrap_err();
        assert!(matches!(err, StreamError::Transport(TransportError::Closed)), "{err:?}");

        let seen = server.join().unwrap();
        assert_eq!(seen.origin.as_deref(), Some("https://data.tradingview.com"));
        assert!(seen.handshake[0].contains("quote_create_session"));
        assert!(seen.handshake[1].contains("quote_set_fields"));
        assert!(seen.handshake[2].contains("quote_add_symbols"));
        assert_eq!(seen.echo, "~m~4~m~~h~1");

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].symbol, "BINANCE:BTCUSDT");
        assert_eq!(quotes[0].change, FieldValue::Known(-1.2));
        assert_eq!(quotes[0].volume, FieldValue::Unknown);
    }

    #[test]
    fn connect_to_closed_port_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = StreamConfig {
            ws_url: format!("ws://{addr}/"),
            ..StreamConfig::default()
        };
        let mut session = StreamLoop::new(config, "A:B");
        let mut quotes: Vec<QuoteUpdate> = Vec::new();

        let err = session
            .run(connect, &mut quotes, &AtomicBool::new(false))
            .unwrap_err();
        assert!(matches!(err, StreamError::Connection(_)), "{err:?}");
    }

    #[test]
    fn bad_origin_header_is_rejected_before_connecting() {
        let config = StreamConfig {
            ws_url: "ws://127.0.0.1:1/".to_string(),
            origin: "bad\norigin".to_string(),
            ..StreamConfig::default()
        };
        let err = connect(&config).err().unwrap();
        assert!(matches!(err, TransportError::Protocol(_)));
    }
}
