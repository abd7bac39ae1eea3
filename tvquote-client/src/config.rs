use std::time::Duration;

/// Сервис поиска символов
pub(crate) const SEARCH_URL: &str = "https://symbol-search.tradingview.com/symbol_search/";

/// Таймаут одноразового HTTP-запроса поиска
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Таймаут записи в websocket
pub(crate) const WS_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Ёмкость канала котировок до потока печати
pub(crate) const QUOTE_CHANNEL_CAP: usize = 1024;
