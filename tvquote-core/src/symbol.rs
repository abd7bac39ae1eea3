//! Выбор символа из ответа поиска.
//!
//! Сам HTTP-запрос живёт в клиенте, здесь только чистая логика:
//! первый кандидат, `prefix` важнее `exchange`, подсветка `<em>` срезается.

use crate::error::LookupError;
use crate::types::{ResolvedSymbol, SymbolCandidate, SymbolQuery};

/// Берёт первого кандидата и превращает его в [`ResolvedSymbol`]
pub fn select_candidate(
    query: &SymbolQuery,
    candidates: Vec<SymbolCandidate>,
) -> Result<ResolvedSymbol, LookupError> {
    let first = candidates
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::NotFound {
            query: query.query.clone(),
            category: query.category,
        })?;

    resolve_candidate(&first)
}

/// `prefix` (если непустой) важнее `exchange`
pub fn resolve_candidate(candidate: &SymbolCandidate) -> Result<ResolvedSymbol, LookupError> {
    let symbol = strip_highlight(&candidate.symbol);
    if symbol.trim().is_empty() {
        return Err(LookupError::EmptyField("symbol"));
    }

    let broker = candidate
        .prefix
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(candidate.exchange.as_str());

    ResolvedSymbol::new(broker, symbol).ok_or(LookupError::EmptyField("exchange"))
}

/// Убирает `<em>`/`</em>`, которыми сервис поиска подсвечивает совпадение
pub fn strip_highlight(s: &str) -> String {
    s.replace("<em>", "").replace("</em>", "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn candidate(symbol: &str, exchange: &str, prefix: Option<&str>) -> SymbolCandidate {
        SymbolCandidate {
            symbol: symbol.to_string(),
            exchange: exchange.to_string(),
            prefix: prefix.map(str::to_string),
            description: None,
        }
    }

    fn query() -> SymbolQuery {
        SymbolQuery::new("btcusdt", Category::Crypto)
    }

    #[test]
    fn first_candidate_wins_and_is_canonicalized() {
        let got = select_candidate(
            &query(),
            vec![
                candidate("btcusdt", "binance", None),
                candidate("BTCUSDT", "bybit", None),
            ],
        )
        .unwrap();
        assert_eq!(got.id(), "BINANCE:BTCUSDT");
    }

    #[test]
    fn prefix_is_preferred_over_exchange() {
        let got = resolve_candidate(&candidate("AAPL", "NASDAQ NMS", Some("NASDAQ"))).unwrap();
        assert_eq!(got.id(), "NASDAQ:AAPL");
    }

    #[test]
    fn empty_prefix_falls_back_to_exchange() {
        let got = resolve_candidate(&candidate("eurusd", "fx_idc", Some(""))).unwrap();
        assert_eq!(got.id(), "FX_IDC:EURUSD");
    }

    #[test]
    fn highlight_tags_are_stripped() {
        let got = resolve_candidate(&candidate("<em>BTCUSDT</em>", "BINANCE", None)).unwrap();
        assert_eq!(got.id(), "BINANCE:BTCUSDT");
    }

    #[test]
    fn empty_response_is_not_found() {
        let err = select_candidate(&query(), Vec::new()).unwrap_err();
        match err {
            LookupError::NotFound { query, category } => {
                assert_eq!(query, "btcusdt");
                assert_eq!(category, Category::Crypto);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn empty_exchange_is_rejected() {
        let err = resolve_candidate(&candidate("BTCUSDT", "", None)).unwrap_err();
        assert!(matches!(err, LookupError::EmptyField("exchange")));

        let err = resolve_candidate(&candidate("<em></em>", "BINANCE", None)).unwrap_err();
        assert!(matches!(err, LookupError::EmptyField("symbol")));
    }
}
