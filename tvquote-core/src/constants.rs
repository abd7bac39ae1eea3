use std::time::Duration;

/// Адрес websocket-сервиса котировок по умолчанию
pub const DEFAULT_WS_URL: &str = "wss://data.tradingview.com/socket.io/websocket";

/// Значение заголовка `Origin`, без него сервис не отдаёт данные
pub const DEFAULT_ORIGIN: &str = "https://data.tradingview.com";

/// Поля подписки по умолчанию
pub const DEFAULT_FIELDS: &[&str] = &["lp", "low_price", "volume", "ch", "chp"];

/// Такт цикла чтения: между тактами проверяется флаг остановки
pub const READ_TICK: Duration = Duration::from_millis(200);

/// Маркер конверта `~m~<len>~m~`
pub(crate) const ENVELOPE_MARKER: &str = "~m~";

/// Длина заголовка, который срезается с ping-сообщения, когда конверт не разобрался
pub(crate) const LEGACY_HEADER_LEN: usize = 7;

/// Префикс идентификатора сессии
pub(crate) const SESSION_PREFIX: &str = "qs_";

/// Количество случайных букв в идентификаторе сессии
pub(crate) const SESSION_RANDOM_LEN: usize = 12;

/// Управляющие сообщения, которые игнорируются ещё до разбора JSON
pub(crate) const IGNORED_MARKERS: &[&str] = &["quote_completed", "session_id"];
