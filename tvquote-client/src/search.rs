use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tvquote_core::symbol::select_candidate;
use tvquote_core::{LookupError, ResolvedSymbol, SymbolCandidate, SymbolQuery};

use crate::config::HTTP_TIMEOUT;

#[derive(Debug, Error)]
pub(crate) enum SearchError {
    #[error("symbol search request failed")]
    Http(#[from] reqwest::Error),

    #[error("symbol search returned HTTP {0}")]
    Status(StatusCode),

    #[error("symbol search returned unexpected body")]
    Body(#[from] serde_json::Error),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

// старый формат: голый массив; новый: {"symbols": [...]}
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    List(Vec<SymbolCandidate>),
    Wrapped { symbols: Vec<SymbolCandidate> },
}

pub(crate) fn parse_candidates(body: &str) -> serde_json::Result<Vec<SymbolCandidate>> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    Ok(match resp {
        SearchResponse::List(list) => list,
        SearchResponse::Wrapped { symbols } => symbols,
    })
}

/// Одноразовый запрос `GET <search_url>?text=<query>&type=<category>`.
/// Ретраев нет: любая ошибка фатальна для старта.
pub(crate) fn resolve_symbol(
    search_url: &str,
    query: &SymbolQuery,
) -> Result<ResolvedSymbol, SearchError> {
    let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;

    let resp = client
        .get(search_url)
        .query(&[
            ("text", query.query.as_str()),
            ("type", query.category.as_str()),
        ])
        .send()?;

    let status = resp.status();
    if !status.is_success() {
        return Err(SearchError::Status(status));
    }

    let body = resp.text()?;
    let candidates = parse_candidates(&body)?;
    debug!("symbol search: {} candidates for {:?}", candidates.len(), query.query);

    Ok(select_candidate(query, candidates)?)
}
