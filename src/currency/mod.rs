//! Currency symbols, display formatting and static-rate conversion.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::models::CurrencyRate;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum CurrencyError {
    #[error("Unknown currency: {0}")]
    Unknown(String),
    #[error("No usable rate for {0}")]
    MissingRate(String),
    #[error("Amount is too large to convert")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CurrencyInfo {
    pub(crate) code: &'static str,
    pub(crate) symbol: &'static str,
    pub(crate) name: &'static str,
    pub(crate) decimals: u32,
}

const fn info(code: &'static str, symbol: &'static str, name: &'static str, decimals: u32) -> CurrencyInfo {
    CurrencyInfo {
        code,
        symbol,
        name,
        decimals,
    }
}

const CURRENCIES: &[CurrencyInfo] = &[
    info("USD", "$", "US Dollar", 2),
    info("EUR", "€", "Euro", 2),
    info("GBP", "£", "British Pound", 2),
    info("JPY", "¥", "Japanese Yen", 0),
    info("PHP", "₱", "Philippine Peso", 2),
    info("INR", "₹", "Indian Rupee", 2),
    info("CNY", "CN¥", "Chinese Yuan", 2),
    info("KRW", "₩", "South Korean Won", 0),
    info("AUD", "A$", "Australian Dollar", 2),
    info("CAD", "C$", "Canadian Dollar", 2),
    info("SGD", "S$", "Singapore Dollar", 2),
    info("HKD", "HK$", "Hong Kong Dollar", 2),
    info("CHF", "CHF ", "Swiss Franc", 2),
    info("MYR", "RM", "Malaysian Ringgit", 2),
    info("THB", "฿", "Thai Baht", 2),
    info("IDR", "Rp", "Indonesian Rupiah", 0),
    info("VND", "₫", "Vietnamese Dong", 0),
];

/// Units per US dollar used until an admin stores real rates.
const DEFAULT_RATES: &[(&str, &str)] = &[
    ("USD", "1"),
    ("EUR", "0.92"),
    ("GBP", "0.79"),
    ("JPY", "149.50"),
    ("PHP", "56.00"),
    ("INR", "83.20"),
    ("CNY", "7.24"),
    ("KRW", "1330"),
    ("AUD", "1.52"),
    ("CAD", "1.36"),
    ("SGD", "1.34"),
    ("HKD", "7.82"),
    ("CHF", "0.88"),
    ("MYR", "4.70"),
    ("THB", "35.80"),
    ("IDR", "15600"),
    ("VND", "24500"),
];

/// The fixed list written by the admin "update rates" action.
const SAMPLE_RATES: &[(&str, &str)] = &[
    ("EUR", "0.93"),
    ("GBP", "0.80"),
    ("JPY", "151.20"),
    ("PHP", "56.45"),
    ("INR", "83.40"),
    ("CNY", "7.23"),
    ("KRW", "1345"),
    ("AUD", "1.53"),
    ("CAD", "1.37"),
    ("SGD", "1.35"),
];

pub(crate) fn currencies() -> &'static [CurrencyInfo] {
    CURRENCIES
}

pub(crate) fn lookup(code: &str) -> Option<&'static CurrencyInfo> {
    let code = code.trim();
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

pub(crate) fn is_known(code: &str) -> bool {
    lookup(code).is_some()
}

pub(crate) fn sample_rates() -> Vec<CurrencyRate> {
    parse_rate_list(SAMPLE_RATES)
        .into_iter()
        .map(|(code, rate)| CurrencyRate::new(code, rate))
        .collect()
}

fn parse_rate_list(list: &[(&str, &str)]) -> Vec<(String, Decimal)> {
    list.iter()
        .filter_map(|(code, rate)| Decimal::from_str(rate).ok().map(|r| (code.to_string(), r)))
        .collect()
}

/// Format an amount for display: one sign, one symbol, thousands separators.
/// e.g. `-1234.5` in PHP → `"-₱1,234.50"`
pub(crate) fn format_amount(amount: Decimal, code: &str) -> String {
    let (prefix, decimals) = match lookup(code) {
        Some(c) => (c.symbol.to_string(), c.decimals),
        None => (format!("{} ", code.trim().to_uppercase()), 2),
    };

    let rounded = amount.abs().round_dp(decimals);
    let formatted = format!("{rounded:.prec$}", prec = decimals as usize);
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next();

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    let sign = if amount < Decimal::ZERO && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match dec_part {
        Some(d) => format!("{sign}{prefix}{with_commas}.{d}"),
        None => format!("{sign}{prefix}{with_commas}"),
    }
}

/// Conversion rates, stored as units per US dollar.
#[derive(Debug, Clone)]
pub(crate) struct RateTable {
    per_usd: HashMap<String, Decimal>,
}

impl RateTable {
    pub(crate) fn defaults() -> Self {
        Self {
            per_usd: parse_rate_list(DEFAULT_RATES).into_iter().collect(),
        }
    }

    /// Defaults overlaid with stored rows. Non-positive rates are ignored.
    pub(crate) fn with_rates(rows: &[CurrencyRate]) -> Self {
        let mut table = Self::defaults();
        for row in rows {
            if row.rate_per_usd > Decimal::ZERO {
                table.per_usd.insert(row.code.to_uppercase(), row.rate_per_usd);
            } else {
                tracing::warn!(code = %row.code, rate = %row.rate_per_usd, "ignoring non-positive rate");
            }
        }
        table
    }

    /// How many `to` one unit of `from` buys.
    pub(crate) fn rate(&self, from: &str, to: &str) -> Result<Decimal, CurrencyError> {
        let from_rate = self.per_usd_for(from)?;
        let to_rate = self.per_usd_for(to)?;
        to_rate.checked_div(from_rate).ok_or(CurrencyError::OutOfRange)
    }

    /// Same-currency conversion returns the amount untouched, even for codes
    /// the table does not know.
    pub(crate) fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal, CurrencyError> {
        if from.trim().eq_ignore_ascii_case(to.trim()) {
            return Ok(amount);
        }
        amount
            .checked_mul(self.rate(from, to)?)
            .ok_or(CurrencyError::OutOfRange)
    }

    fn per_usd_for(&self, code: &str) -> Result<Decimal, CurrencyError> {
        let code = code.trim().to_uppercase();
        if !is_known(&code) && !self.per_usd.contains_key(&code) {
            return Err(CurrencyError::Unknown(code));
        }
        match self.per_usd.get(&code) {
            Some(rate) if *rate > Decimal::ZERO => Ok(*rate),
            _ => Err(CurrencyError::MissingRate(code)),
        }
    }
}
