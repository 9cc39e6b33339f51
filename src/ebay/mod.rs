//! eBay sold-listings page provider
//!
//! Implements the page-source contract over eBay search result pages for
//! completed auctions. Pages are fetched over plain HTTP with a bounded
//! timeout; item rows and the next-page link are extracted from the result
//! HTML.
//!
//! ## Search URL
//!
//! `https://www.ebay.<domain>/sch/i.html?_nkw=<term>&LH_Sold=1&LH_Complete=1&LH_Auction=1&_ipg=<page size>`
//!
//! The next-page location comes from the `a.pagination__next` href; eBay
//! links the last page to itself, which the pagination controller detects
//! as an unchanged location.

use crate::scrape_core::normalizer::RawItem;
use crate::scrape_core::provider::{PageProvider, ProviderError, ProviderFactory};
use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use std::time::Duration;

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

/// Everything the provider keeps from one fetched page. The parsed DOM is
/// dropped as soon as this is built; only owned data crosses await points.
#[derive(Debug, Clone)]
struct ParsedPage {
    items: Vec<RawItem>,
    next_url: Option<String>,
    total: Option<u64>,
}

fn parse_results_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let row_sel = Selector::parse(".srp-results li.s-item").expect("row selector");
    let title_sel = Selector::parse(".s-item__title").expect("title selector");
    let date_sel = Selector::parse(".s-item__title--tagblock .POSITIVE").expect("date selector");
    let price_sel = Selector::parse(".s-item__price").expect("price selector");
    let link_sel = Selector::parse("a.s-item__link").expect("link selector");
    let count_sel =
        Selector::parse(".srp-controls__count-heading .BOLD").expect("count selector");
    let next_sel = Selector::parse("a.pagination__next").expect("next selector");

    let text_of = |row: &scraper::ElementRef<'_>, sel: &Selector| -> Option<String> {
        row.select(sel).next().map(|el| {
            el.text().collect::<String>().trim().to_string()
        })
    };

    let items = document
        .select(&row_sel)
        .map(|row| RawItem {
            title: text_of(&row, &title_sel),
            sold_date: text_of(&row, &date_sel),
            price: text_of(&row, &price_sel),
            url: row
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string),
        })
        .collect();

    let total = document.select(&count_sel).next().and_then(|el| {
        let digits: String = el
            .text()
            .collect::<String>()
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    });

    let next_url = document
        .select(&next_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    ParsedPage {
        items,
        next_url,
        total,
    }
}

async fn fetch_page(client: &Client, url: &str) -> Result<ParsedPage, ProviderError> {
    log::debug!("Fetching {}", url);
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ProviderError::Http(format!(
            "status {} for {}",
            response.status(),
            url
        )));
    }
    let body = response.text().await?;
    Ok(parse_results_page(&body))
}

/// Opens one [`EbayProvider`] session per search term.
pub struct EbayProviderFactory {
    client: Client,
    domain: String,
    page_size: u32,
}

impl EbayProviderFactory {
    pub fn new(domain: &str, page_size: u32, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) bidscope/0.1")
            .build()?;
        Ok(Self {
            client,
            domain: domain.to_string(),
            page_size,
        })
    }

    fn search_url(&self, term: &str) -> Result<String, ProviderError> {
        let base = format!("https://www.ebay.{}/sch/i.html", self.domain);
        let mut url = Url::parse(&base)
            .map_err(|e| ProviderError::Navigation(format!("bad search url {}: {}", base, e)))?;
        url.query_pairs_mut()
            .append_pair("_nkw", term)
            .append_pair("LH_Sold", "1")
            .append_pair("LH_Complete", "1")
            .append_pair("LH_Auction", "1")
            .append_pair("_ipg", &self.page_size.to_string());
        Ok(url.into())
    }
}

#[async_trait]
impl ProviderFactory for EbayProviderFactory {
    async fn open(&self, term: &str) -> Result<Box<dyn PageProvider>, ProviderError> {
        let url = self.search_url(term)?;
        let page = fetch_page(&self.client, &url).await?;
        Ok(Box::new(EbayProvider {
            client: self.client.clone(),
            url,
            page,
        }))
    }
}

pub struct EbayProvider {
    client: Client,
    url: String,
    page: ParsedPage,
}

#[async_trait]
impl PageProvider for EbayProvider {
    async fn current_page_items(&mut self) -> Result<Vec<RawItem>, ProviderError> {
        Ok(self.page.items.clone())
    }

    fn total_count(&self) -> Option<u64> {
        self.page.total
    }

    async fn advance_to_next_page(&mut self) -> Result<bool, ProviderError> {
        let Some(next) = self.page.next_url.clone() else {
            return Ok(false);
        };
        self.page = fetch_page(&self.client, &next).await?;
        self.url = next;
        Ok(true)
    }

    fn location(&self) -> &str {
        &self.url
    }

    async fn close(&mut self) -> Result<(), ProviderError> {
        // Stateless HTTP session; nothing server-side to release.
        log::debug!("Closing session at {}", self.url);
        Ok(())
    }
}
