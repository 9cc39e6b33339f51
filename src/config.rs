//! Run configuration from CLI arguments and environment variables
//!
//! Everything is validated here, at startup; invalid configuration never
//! reaches the engine.

use crate::locale::Locale;
use clap::Parser;
use std::env;
use std::path::PathBuf;

/// Compare sold-auction prices across eBay searches.
#[derive(Parser, Debug)]
#[command(name = "bidscope")]
#[command(about = "Scrape completed eBay auctions and compare sale statistics per search")]
pub struct Cli {
    /// Comma-separated search terms, e.g. "lego 42096,lego 42083"
    pub search: String,

    /// Locale for date and price formats (en_GB, en_US, de_DE)
    #[arg(short, long, default_value = "en_GB")]
    pub locale: String,

    /// eBay marketplace domain suffix, e.g. co.uk, com, de
    /// (defaults to the locale's marketplace)
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Drop sales priced outside the bias band around each search's average
    #[arg(short = 'f', long)]
    pub filter_outliers: bool,

    /// Fractional tolerance of the outlier band (0.5 keeps ±50% of average)
    #[arg(short, long, default_value_t = 0.5)]
    pub bias: f64,

    /// Write the full result set as JSON to this path
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Increase output log verbosity
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingTerms,
    UnknownLocale(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingTerms => write!(f, "no search terms given"),
            ConfigError::UnknownLocale(tag) => write!(f, "unknown locale: {}", tag),
            ConfigError::InvalidValue(msg) => write!(f, "invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated run configuration.
#[derive(Debug)]
pub struct RunConfig {
    pub terms: Vec<String>,
    pub locale: Locale,
    pub domain: String,
    /// `Some(bias)` when outlier filtering is enabled.
    pub outlier_bias: Option<f64>,
    pub export: Option<PathBuf>,
    pub verbose: bool,
    /// Bounded wait for page content, seconds.
    pub request_timeout_secs: u64,
    /// Results requested per page.
    pub page_size: u32,
}

impl RunConfig {
    /// Build from parsed CLI arguments plus environment overrides.
    ///
    /// Environment variables:
    /// - `BIDSCOPE_TIMEOUT_SECS` (default: 10)
    /// - `BIDSCOPE_PAGE_SIZE` (default: 200)
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let mut terms: Vec<String> = Vec::new();
        for term in cli.search.split(',') {
            let term = term.trim();
            if !term.is_empty() && !terms.iter().any(|t| t == term) {
                terms.push(term.to_string());
            }
        }
        if terms.is_empty() {
            return Err(ConfigError::MissingTerms);
        }

        let locale = Locale::from_tag(&cli.locale)
            .ok_or_else(|| ConfigError::UnknownLocale(cli.locale.clone()))?;

        let outlier_bias = if cli.filter_outliers {
            if cli.bias <= 0.0 || !cli.bias.is_finite() {
                return Err(ConfigError::InvalidValue(format!(
                    "outlier bias must be a positive fraction, got {}",
                    cli.bias
                )));
            }
            Some(cli.bias)
        } else {
            None
        };

        let domain = cli
            .domain
            .unwrap_or_else(|| locale.spec().ebay_domain.to_string());

        let request_timeout_secs = env::var("BIDSCOPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let page_size = env::var("BIDSCOPE_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200);

        Ok(Self {
            terms,
            locale,
            domain,
            outlier_bias,
            export: cli.export,
            verbose: cli.verbose,
            request_timeout_secs,
            page_size,
        })
    }
}
