use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{SESSION_PREFIX, SESSION_RANDOM_LEN};

/// Категория инструмента, значение параметра `type` при поиске
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Stock,
    Futures,
    Forex,
    Cfd,
    Crypto,
    Index,
    Economic,
}

impl Category {
    /// Все категории в порядке объявления
    pub const ALL: [Category; 7] = [
        Category::Stock,
        Category::Futures,
        Category::Forex,
        Category::Cfd,
        Category::Crypto,
        Category::Index,
        Category::Economic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Stock => "stock",
            Category::Futures => "futures",
            Category::Forex => "forex",
            Category::Cfd => "cfd",
            Category::Crypto => "crypto",
            Category::Index => "index",
            Category::Economic => "economic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Неизвестная категория
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0:?} (expected one of stock, futures, forex, cfd, crypto, index, economic)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Запрос на поиск инструмента, собирается один раз из CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolQuery {
    pub query: String,
    pub category: Category,
}

impl SymbolQuery {
    pub fn new(query: impl Into<String>, category: Category) -> Self {
        Self {
            query: query.into(),
            category,
        }
    }
}

/// Найденный символ. Оба поля непустые.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    exchange_or_prefix: String,
    symbol_name: String,
}

impl ResolvedSymbol {
    /// `None`, если хотя бы одно поле пустое
    pub fn new(exchange_or_prefix: impl Into<String>, symbol_name: impl Into<String>) -> Option<Self> {
        let exchange_or_prefix = exchange_or_prefix.into().trim().to_string();
        let symbol_name = symbol_name.into().trim().to_string();
        if exchange_or_prefix.is_empty() || symbol_name.is_empty() {
            return None;
        }
        Some(Self {
            exchange_or_prefix,
            symbol_name,
        })
    }

    pub fn exchange_or_prefix(&self) -> &str {
        &self.exchange_or_prefix
    }

    pub fn symbol_name(&self) -> &str {
        &self.symbol_name
    }

    /// Канонический идентификатор `BROKER:SYMBOL`, уходит в подписку как есть
    pub fn id(&self) -> String {
        format!(
            "{}:{}",
            self.exchange_or_prefix.to_uppercase(),
            self.symbol_name.to_uppercase()
        )
    }
}

impl fmt::Display for ResolvedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Идентификатор quote-сессии: `qs_` + 12 строчных латинских букв.
/// Уникальность рекомендательная, не криптографическая.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    pub fn generate_with<R: Rng>(rng: &mut R) -> Self {
        let suffix: String = (0..SESSION_RANDOM_LEN)
            .map(|_| char::from(rng.random_range(b'a'..=b'z')))
            .collect();
        Self(format!("{SESSION_PREFIX}{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Значение поля котировки. Отсутствующее поле это `Unknown`, а не ноль.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Known(f64),
    #[default]
    Unknown,
}

impl FieldValue {
    /// `Known` только для числовых JSON-значений
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        match value.and_then(serde_json::Value::as_f64) {
            Some(v) => FieldValue::Known(v),
            None => FieldValue::Unknown,
        }
    }

    pub fn known(&self) -> Option<f64> {
        match self {
            FieldValue::Known(v) => Some(*v),
            FieldValue::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, FieldValue::Known(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Known(v) => write!(f, "{v}"),
            FieldValue::Unknown => f.write_str("unknown"),
        }
    }
}

/// Обновление котировки из сообщения `qsd`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteUpdate {
    pub symbol: String,
    pub last_price: FieldValue,
    pub change: FieldValue,
    pub change_percent: FieldValue,
    pub volume: FieldValue,
    pub low_price: FieldValue,
}

impl QuoteUpdate {
    /// Пустое обновление: все поля `Unknown`
    pub fn unknown(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            last_price: FieldValue::Unknown,
            change: FieldValue::Unknown,
            change_percent: FieldValue::Unknown,
            volume: FieldValue::Unknown,
            low_price: FieldValue::Unknown,
        }
    }
}

impl fmt::Display for QuoteUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> price={}, change={}, change_percentage={}, volume={}",
            self.symbol, self.last_price, self.change, self.change_percent, self.volume
        )?;
        if self.low_price.is_known() {
            write!(f, ", low_price={}", self.low_price)?;
        }
        Ok(())
    }
}

/// Кандидат из ответа поиска символа
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SymbolCandidate {
    pub symbol: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
