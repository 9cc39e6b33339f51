//! Normalization of raw result rows into typed sold listings

use crate::locale::{Locale, LocaleSpec};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Raw text fragments of one result row, as handed over by a page provider.
/// Every field is optional; the normalizer decides what is fatal for the row.
#[derive(Debug, Clone, Default)]
pub struct RawItem {
    pub title: Option<String>,
    pub sold_date: Option<String>,
    pub price: Option<String>,
    pub url: Option<String>,
}

/// One normalized sold-item observation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoldListing {
    pub title: String,
    pub sold_at: DateTime<Utc>,
    pub price: f64,
    pub currency: String,
    pub url: String,
}

#[derive(Debug)]
pub enum NormalizeError {
    MissingTitle,
    MissingDate,
    MissingLink,
    DateParse(String),
    PriceParse(String),
}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::MissingTitle => write!(f, "result row has no title"),
            NormalizeError::MissingDate => write!(f, "result row has no sale date"),
            NormalizeError::MissingLink => write!(f, "result row has no item link"),
            NormalizeError::DateParse(text) => write!(f, "unrecognized sale date: {:?}", text),
            NormalizeError::PriceParse(text) => write!(f, "unrecognized price: {:?}", text),
        }
    }
}

impl std::error::Error for NormalizeError {}

/// Turns raw rows into [`SoldListing`]s under one locale. Pure: the same raw
/// row and locale always produce the same outcome.
pub struct Normalizer {
    spec: &'static LocaleSpec,
}

impl Normalizer {
    pub fn new(locale: Locale) -> Self {
        Self {
            spec: locale.spec(),
        }
    }

    pub fn normalize(&self, raw: &RawItem) -> Result<SoldListing, NormalizeError> {
        let title = raw
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(NormalizeError::MissingTitle)?;

        let date_text = raw
            .sold_date
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(NormalizeError::MissingDate)?;
        let sold_on = parse_sold_date(self.spec, date_text)?;
        let sold_at = sold_on
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| NormalizeError::DateParse(date_text.to_string()))?
            .and_utc();

        let price_text = raw
            .price
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NormalizeError::PriceParse(String::new()))?;
        let (price, currency) = parse_price(self.spec, price_text)?;

        let url = raw
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(NormalizeError::MissingLink)?;

        Ok(SoldListing {
            title: title.to_string(),
            sold_at,
            price,
            currency,
            url: url.to_string(),
        })
    }
}

/// Drop the locale's sold-label prefix ("Sold  3 Jan 2021" -> " 3 Jan 2021").
/// Text without a recognized label is returned unchanged.
fn strip_sold_label<'a>(spec: &LocaleSpec, text: &'a str) -> &'a str {
    let lower = text.to_lowercase();
    for label in spec.sold_labels {
        if let Some(pos) = lower.find(label) {
            if let Some(rest) = text.get(pos + label.len()..) {
                return rest;
            }
        }
    }
    text
}

fn parse_sold_date(spec: &LocaleSpec, text: &str) -> Result<NaiveDate, NormalizeError> {
    let stripped = strip_sold_label(spec, text);

    let mut month: Option<u32> = None;
    let mut year: Option<i32> = None;
    let mut numbers: Vec<u32> = Vec::new();

    for token in stripped.split(|c: char| c.is_whitespace() || c == ',') {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric());
        if token.is_empty() {
            continue;
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            if token.len() == 4 {
                year = token.parse().ok();
            } else if let Ok(n) = token.parse() {
                numbers.push(n);
            }
        } else if month.is_none() {
            month = spec.month_from_name(token);
        }
    }

    let fail = || NormalizeError::DateParse(text.to_string());

    let (month, day) = match (month, numbers.as_slice()) {
        (Some(m), [d]) => (m, *d),
        (None, [a, b]) if spec.day_before_month => (*b, *a),
        (None, [a, b]) => (*a, *b),
        _ => return Err(fail()),
    };

    let year = year.ok_or_else(fail)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(fail)
}

fn parse_price(spec: &LocaleSpec, text: &str) -> Result<(f64, String), NormalizeError> {
    let currency = spec
        .currency_symbols
        .iter()
        .find(|(fragment, _)| text.contains(fragment))
        .map(|(_, code)| *code)
        .unwrap_or(spec.default_currency);

    // First numeric run only, so range texts ("£10.00 to £12.00") yield the
    // lower bound.
    let mut run = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            run.push(c);
        } else if (c == spec.thousands_sep || c == spec.decimal_sep) && !run.is_empty() {
            run.push(c);
        } else if !run.is_empty() {
            break;
        }
    }
    while run.ends_with(spec.thousands_sep) || run.ends_with(spec.decimal_sep) {
        run.pop();
    }

    let cleaned: String = run
        .chars()
        .filter(|c| *c != spec.thousands_sep)
        .map(|c| if c == spec.decimal_sep { '.' } else { c })
        .collect();

    cleaned
        .parse::<f64>()
        .map(|amount| (amount, currency.to_string()))
        .map_err(|_| NormalizeError::PriceParse(text.to_string()))
}
