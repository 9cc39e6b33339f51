//! Locale conventions for date and price text
//!
//! Each marketplace locale carries its own sold-label prefix, month names,
//! day/month order and number separators. The active locale is an explicit
//! value threaded through the normalizer, never process-wide state, so two
//! searches in one run can use different locales without contaminating each
//! other.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    EnGb,
    EnUs,
    DeDe,
}

/// Static parsing conventions for one locale.
#[derive(Debug)]
pub struct LocaleSpec {
    pub tag: &'static str,
    /// Default eBay marketplace domain suffix for this locale.
    pub ebay_domain: &'static str,
    /// Label prefixes preceding the date in a sold tag, lowercase.
    pub sold_labels: &'static [&'static str],
    /// Month-name prefixes (lowercase) to month numbers.
    pub month_names: &'static [(&'static str, u32)],
    /// Whether a fully numeric date reads day-first.
    pub day_before_month: bool,
    pub thousands_sep: char,
    pub decimal_sep: char,
    /// Currency symbol/code fragments to ISO codes, longest fragment first.
    pub currency_symbols: &'static [(&'static str, &'static str)],
    pub default_currency: &'static str,
}

const EN_MONTHS: &[(&str, u32)] = &[
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

const DE_MONTHS: &[(&str, u32)] = &[
    ("jan", 1),
    ("feb", 2),
    ("mär", 3),
    ("apr", 4),
    ("mai", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("okt", 10),
    ("nov", 11),
    ("dez", 12),
];

static EN_GB: LocaleSpec = LocaleSpec {
    tag: "en_GB",
    ebay_domain: "co.uk",
    sold_labels: &["sold"],
    month_names: EN_MONTHS,
    day_before_month: true,
    thousands_sep: ',',
    decimal_sep: '.',
    currency_symbols: &[
        ("US $", "USD"),
        ("GBP", "GBP"),
        ("EUR", "EUR"),
        ("USD", "USD"),
        ("£", "GBP"),
        ("€", "EUR"),
        ("$", "USD"),
    ],
    default_currency: "GBP",
};

static EN_US: LocaleSpec = LocaleSpec {
    tag: "en_US",
    ebay_domain: "com",
    sold_labels: &["sold"],
    month_names: EN_MONTHS,
    day_before_month: false,
    thousands_sep: ',',
    decimal_sep: '.',
    currency_symbols: &[
        ("US $", "USD"),
        ("GBP", "GBP"),
        ("EUR", "EUR"),
        ("USD", "USD"),
        ("$", "USD"),
        ("£", "GBP"),
        ("€", "EUR"),
    ],
    default_currency: "USD",
};

static DE_DE: LocaleSpec = LocaleSpec {
    tag: "de_DE",
    ebay_domain: "de",
    sold_labels: &["verkauft"],
    month_names: DE_MONTHS,
    day_before_month: true,
    thousands_sep: '.',
    decimal_sep: ',',
    currency_symbols: &[
        ("US $", "USD"),
        ("EUR", "EUR"),
        ("GBP", "GBP"),
        ("€", "EUR"),
        ("£", "GBP"),
        ("$", "USD"),
    ],
    default_currency: "EUR",
};

impl Locale {
    pub fn as_str(&self) -> &'static str {
        self.spec().tag
    }

    /// Parse a locale tag. Accepts `_` or `-` separators and the common
    /// `en_UK` alias for `en_GB`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().replace('-', "_").as_str() {
            "en_gb" | "en_uk" => Some(Locale::EnGb),
            "en_us" => Some(Locale::EnUs),
            "de_de" => Some(Locale::DeDe),
            _ => None,
        }
    }

    pub fn all() -> [Locale; 3] {
        [Locale::EnGb, Locale::EnUs, Locale::DeDe]
    }

    pub fn spec(&self) -> &'static LocaleSpec {
        match self {
            Locale::EnGb => &EN_GB,
            Locale::EnUs => &EN_US,
            Locale::DeDe => &DE_DE,
        }
    }
}

impl LocaleSpec {
    /// Match a token against the month-name table, prefix style, so both
    /// "Jan" and "January" resolve to 1.
    pub fn month_from_name(&self, token: &str) -> Option<u32> {
        let token = token.to_lowercase();
        self.month_names
            .iter()
            .find(|(name, _)| token.starts_with(name))
            .map(|(_, number)| *number)
    }
}
