//! A-share stock code normalization and board classification.
//!
//! Raw codes arrive in several shapes depending on the upstream vendor:
//! bare six digits (`600000`), a dotted or undotted market suffix
//! (`600000.SH`, `000001sz`), or a leading market prefix (`SH600000`).
//! All of them normalize to the canonical `DDDDDD.XX` form. When no market
//! is stated, the exchange is inferred from the three-digit numeric prefix.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily price-move limit for ST (special treatment) shares.
pub const ST_LIMIT_RATE: f64 = 0.05;

/// Daily price-move limit for the first five sessions after listing.
pub const NEW_LISTING_LIMIT_RATE: f64 = 0.44;

/// Reserved ids that match a known prefix but never denote a real listing.
const SENTINEL_IDS: [&str; 2] = ["000000", "999999"];

/// Mainland exchange a code trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    /// Shanghai Stock Exchange.
    Sh,
    /// Shenzhen Stock Exchange.
    Sz,
    /// Beijing Stock Exchange.
    Bj,
}

impl Exchange {
    /// Uppercase two-letter suffix used in the canonical form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Sh => "SH",
            Exchange::Sz => "SZ",
            Exchange::Bj => "BJ",
        }
    }

    fn from_code(s: &str) -> Option<Self> {
        match s {
            "SH" => Some(Exchange::Sh),
            "SZ" => Some(Exchange::Sz),
            "BJ" => Some(Exchange::Bj),
            _ => None,
        }
    }
}

impl Display for Exchange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regulatory board tier. Determines the daily price-move limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Board {
    MainBoard,
    SmeBoard,
    ChiNext,
    StarMarket,
    BeijingExchange,
}

impl Board {
    /// Ordinary daily price-move limit for this board.
    ///
    /// ST shares (5%) and first-five-sessions listings (44%) override the
    /// board rate; see [`ST_LIMIT_RATE`] and [`NEW_LISTING_LIMIT_RATE`].
    pub fn limit_rate(&self) -> f64 {
        match self {
            Board::MainBoard | Board::SmeBoard => 0.10,
            Board::ChiNext | Board::StarMarket => 0.20,
            Board::BeijingExchange => 0.30,
        }
    }
}

/// Canonical A-share stock code: six digits plus exchange.
///
/// Constructed only through [`StockCode::parse`]; a value of this type is
/// always well-formed. Serializes as the canonical string (`"600000.SH"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StockCode {
    id: String,
    exchange: Exchange,
}

impl StockCode {
    /// Parse and normalize a raw code.
    ///
    /// Returns `None` for anything that is not one of the accepted shapes,
    /// for explicit suffixes outside {SH, SZ, BJ}, for bare codes whose
    /// prefix maps to no known exchange, and for the reserved sentinel ids
    /// `000000` / `999999`. Never panics on malformed input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.is_ascii() {
            return None;
        }
        let upper = trimmed.to_ascii_uppercase();

        let (id, exchange) = if let Some(parts) = split_suffixed(&upper) {
            parts
        } else if let Some(parts) = split_prefixed(&upper) {
            parts
        } else if upper.len() == 6 && upper.bytes().all(|b| b.is_ascii_digit()) {
            let exchange = infer_exchange(&upper[..3])?;
            (upper, exchange)
        } else {
            return None;
        };

        if SENTINEL_IDS.contains(&id.as_str()) {
            return None;
        }

        Some(Self { id, exchange })
    }

    /// True if `raw` normalizes successfully.
    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_some()
    }

    /// The six-digit numeric id, without the market suffix.
    pub fn numeric_id(&self) -> &str {
        &self.id
    }

    /// The three-digit prefix that drives board classification.
    pub fn prefix(&self) -> &str {
        &self.id[..3]
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Canonical textual form: `600000.SH`.
    pub fn canonical(&self) -> String {
        format!("{}.{}", self.id, self.exchange)
    }

    /// Lowercase vendor concatenation form: `sz000001`.
    pub fn vendor_format(&self) -> String {
        format!("{}{}", self.exchange.as_str().to_ascii_lowercase(), self.id)
    }

    /// Board classification. Pure function of the numeric prefix, with the
    /// exchange disambiguating SZ main board from Beijing Exchange. Total
    /// over all valid codes.
    pub fn board(&self) -> Board {
        match self.prefix() {
            "002" | "003" => Board::SmeBoard,
            "300" | "301" => Board::ChiNext,
            "688" | "689" => Board::StarMarket,
            _ if self.exchange == Exchange::Bj => Board::BeijingExchange,
            _ => Board::MainBoard,
        }
    }
}

/// `600000.SH` / `600000SH` — six digits plus explicit suffix.
fn split_suffixed(s: &str) -> Option<(String, Exchange)> {
    let bytes = s.as_bytes();
    if bytes.len() < 8 || !bytes[..6].iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let suffix = if bytes[6] == b'.' { &s[7..] } else { &s[6..] };
    let exchange = Exchange::from_code(suffix)?;
    Some((s[..6].to_string(), exchange))
}

/// `SH600000` — explicit prefix directly concatenated.
fn split_prefixed(s: &str) -> Option<(String, Exchange)> {
    let bytes = s.as_bytes();
    if bytes.len() != 8 || !bytes[2..].iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let exchange = Exchange::from_code(&s[..2])?;
    Some((s[2..].to_string(), exchange))
}

/// Ordered prefix table for bare numeric codes.
fn infer_exchange(prefix: &str) -> Option<Exchange> {
    match prefix {
        "600" | "601" | "603" | "605" | "688" | "689" => Some(Exchange::Sh),
        "000" | "001" | "002" | "003" | "300" | "301" => Some(Exchange::Sz),
        other => {
            let n: u32 = other.parse().ok()?;
            if (830..=839).contains(&n) {
                Some(Exchange::Bj)
            } else {
                None
            }
        }
    }
}

impl Display for StockCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.id, self.exchange)
    }
}

/// Hard-error wrapper over the `Option` returned by [`StockCode::parse`],
/// for callers (serde, CLI) that need a failure value.
#[derive(Debug, Clone, Error)]
#[error("unrecognized stock code: {0:?}")]
pub struct InvalidCode(pub String);

impl TryFrom<&str> for StockCode {
    type Error = InvalidCode;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value).ok_or_else(|| InvalidCode(value.to_string()))
    }
}

impl TryFrom<String> for StockCode {
    type Error = InvalidCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(InvalidCode(value))
    }
}

impl From<StockCode> for String {
    fn from(value: StockCode) -> Self {
        value.canonical()
    }
}
