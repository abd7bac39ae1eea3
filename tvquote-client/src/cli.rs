use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser};
use tvquote_core::{Category, DEFAULT_ORIGIN, DEFAULT_WS_URL, READ_TICK, StreamConfig, SymbolQuery};

use crate::config;
use crate::sink::OutputFormat;

/// tvquote-client - живые котировки одного инструмента.
///
/// HTTP используется один раз: ищем символ и берём первое совпадение.
/// Дальше открываем websocket, подписываемся и печатаем котировки до Ctrl+C.
#[derive(Parser, Debug, Clone)]
#[command(name = "tvquote-client", version, about)]
#[command(
    group(
        ArgGroup::new("fields_source")
            .required(false)
            .multiple(false)
            .args(["fields_file", "fields"])
    )
)]
pub(crate) struct Args {
    /// Что искать, например btcusdt или aapl
    pub(crate) query: String,

    /// Категория: stock, futures, forex, cfd, crypto, index, economic
    #[arg(default_value = "crypto")]
    pub(crate) category: Category,

    /// Поля подписки строкой, например: "lp,ch,chp". Нельзя вместе с --fields-file
    #[arg(long, conflicts_with = "fields_file")]
    pub(crate) fields: Option<String>,

    /// Файл полей (по одному на строку, # комментарии). Нельзя вместе с --fields
    #[arg(long, conflicts_with = "fields")]
    pub(crate) fields_file: Option<PathBuf>,

    /// Формат вывода котировок
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) output: OutputFormat,

    /// Адрес сервиса поиска символов
    #[arg(long, default_value = config::SEARCH_URL)]
    pub(crate) search_url: String,

    /// Адрес websocket-сервиса котировок
    #[arg(long, default_value = DEFAULT_WS_URL)]
    pub(crate) ws_url: String,

    /// Заголовок Origin для websocket
    #[arg(long, default_value = DEFAULT_ORIGIN)]
    pub(crate) origin: String,
}

impl Args {
    /// Валидация аргументов (url со схемой, файл полей существует и т.д.)
    pub(crate) fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            bail!("query is empty");
        }

        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            bail!("--ws-url must start with ws:// or wss:// (got: {})", self.ws_url);
        }

        if !(self.search_url.starts_with("http://") || self.search_url.starts_with("https://")) {
            bail!(
                "--search-url must start with http:// or https:// (got: {})",
                self.search_url
            );
        }

        if self.origin.trim().is_empty() {
            bail!("--origin is empty");
        }

        if let Some(path) = &self.fields_file {
            let md = std::fs::metadata(path)
                .with_context(|| format!("fields file not found: {:?}", path))?;
            if !md.is_file() {
                bail!("--fields-file must point to a file: {:?}", path);
            }
        }

        Ok(())
    }

    pub(crate) fn symbol_query(&self) -> SymbolQuery {
        SymbolQuery::new(self.query.trim(), self.category)
    }

    pub(crate) fn stream_config(&self, fields: Vec<String>) -> StreamConfig {
        StreamConfig {
            ws_url: self.ws_url.clone(),
            origin: self.origin.clone(),
            fields,
            read_tick: READ_TICK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tvquote-client").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_to_crypto_and_public_endpoints() {
        let args = parse(&["btcusdt"]);
        assert_eq!(args.category, Category::Crypto);
        assert_eq!(args.output, OutputFormat::Text);
        assert_eq!(args.ws_url, DEFAULT_WS_URL);
        assert_eq!(args.search_url, config::SEARCH_URL);
        args.validate().unwrap();

        let q = args.symbol_query();
        assert_eq!(q.query, "btcusdt");
        assert_eq!(q.category, Category::Crypto);
    }

    #[test]
    fn parses_category_and_output() {
        let args = parse(&["aapl", "stock", "--output", "json"]);
        assert_eq!(args.category, Category::Stock);
        assert_eq!(args.output, OutputFormat::Json);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let res = Args::try_parse_from(["tvquote-client", "aapl", "bonds"]);
        assert!(res.is_err());
    }

    #[test]
    fn fields_and_fields_file_conflict() {
        let res = Args::try_parse_from([
            "tvquote-client",
            "aapl",
            "--fields",
            "lp",
            "--fields-file",
            "fields.txt",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn validate_rejects_bad_urls() {
        let args = parse(&["btcusdt", "--ws-url", "http://example.com"]);
        assert!(args.validate().is_err());

        let args = parse(&["btcusdt", "--search-url", "ftp://example.com"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_fields_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let args = parse(&["btcusdt", "--fields-file", missing.to_str().unwrap()]);
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("fields file not found"));

        let args = parse(&["btcusdt", "--fields-file", dir.path().to_str().unwrap()]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn stream_config_uses_args() {
        let args = parse(&["btcusdt", "--ws-url", "ws://127.0.0.1:1/x", "--origin", "https://o"]);
        let cfg = args.stream_config(vec!["lp".to_string()]);
        assert_eq!(cfg.ws_url, "ws://127.0.0.1:1/x");
        assert_eq!(cfg.origin, "https://o");
        assert_eq!(cfg.fields, vec!["lp"]);
    }
}
