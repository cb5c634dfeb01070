use crate::error::{Result, ScrapeError};
use crate::record::Record;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// List of hot-spring resorts in Japan, grouped by prefecture.
pub const SOURCE_URL: &str = "https://ja.wikipedia.org/wiki/日本の温泉地一覧";

/// Provenance tag written to every scraped record.
pub const SOURCE_TAG: &str = "Wikipedia";

/// Terminal characters of a genuine prefecture-level section heading
/// (metropolis, circuit, urban prefecture, prefecture).
pub const REGION_SUFFIXES: [char; 4] = ['都', '道', '府', '県'];

pub const USER_AGENT: &str = concat!("onsen-map/", env!("CARGO_PKG_VERSION"));

// Legacy MediaWiki markup wraps heading text in span.mw-headline; current
// markup puts a bare hN inside div.mw-heading. Both can appear nested.
const LEGACY_HEADING_SELECTOR: &str = "span.mw-headline";
const HEADING_SELECTOR: &str =
    "span.mw-headline, div.mw-heading > h2, div.mw-heading > h3, div.mw-heading > h4";

/// Returns true if a section heading names a prefecture-level region.
pub fn is_region_heading(text: &str) -> bool {
    text.trim()
        .chars()
        .last()
        .is_some_and(|c| REGION_SUFFIXES.contains(&c))
}

/// Fetches the source page and turns it into records.
pub struct PageFetcher {
    client: Client,
    url: Url,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        Self::with_url(SOURCE_URL, 30)
    }

    pub fn with_url(url: &str, timeout_secs: u64) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", url, e)))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// One GET of the source page. Non-2xx statuses are errors: a partial
    /// scrape is never returned in place of a failed fetch.
    pub async fn fetch(&self) -> Result<String> {
        debug!("Fetching {}", self.url);

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    pub async fn collect(&self) -> Result<Vec<Record>> {
        info!("Collecting records from {}", self.url);
        let html = self.fetch().await?;
        let records = parse_records(&html);
        info!("Collected {} records from {}", records.len(), self.url);
        Ok(records)
    }
}

enum Marker<'a> {
    Heading(String),
    Table(ElementRef<'a>),
}

/// Extract records from the page markup.
///
/// Every accepted heading reads the first table that follows it in document
/// order. Sections without a table and rows with fewer than two data cells
/// are skipped; this function never fails.
pub fn parse_records(html: &str) -> Vec<Record> {
    let document = Html::parse_document(html);
    let heading_selector = selector(HEADING_SELECTOR);
    let legacy_heading_selector = selector(LEGACY_HEADING_SELECTOR);
    let table_selector = selector("table");
    let row_selector = selector("tr");
    let cell_selector = selector("td");

    let markers: Vec<Marker> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|element| {
            if heading_selector.matches(&element) {
                // One marker per heading: an hN wrapping a legacy span defers to the span
                if !legacy_heading_selector.matches(&element)
                    && element.select(&legacy_heading_selector).next().is_some()
                {
                    return None;
                }
                Some(Marker::Heading(element_text(&element)))
            } else if table_selector.matches(&element) {
                Some(Marker::Table(element))
            } else {
                None
            }
        })
        .collect();

    let heading_count = markers
        .iter()
        .filter(|m| matches!(m, Marker::Heading(_)))
        .count();
    debug!("Found {} section headings", heading_count);

    let mut records = Vec::new();

    for (idx, marker) in markers.iter().enumerate() {
        let Marker::Heading(region) = marker else {
            continue;
        };

        if !is_region_heading(region) {
            debug!("Skipping section '{}': not a region", region);
            continue;
        }

        let Some(table) = markers[idx + 1..].iter().find_map(|m| match m {
            Marker::Table(table) => Some(table),
            Marker::Heading(_) => None,
        }) else {
            debug!("No table found for section '{}'", region);
            continue;
        };

        let rows: Vec<ElementRef> = table.select(&row_selector).collect();
        debug!("Section '{}': table with {} rows", region, rows.len());

        // First row is the header
        for row in rows.iter().skip(1) {
            let cells: Vec<String> = row.select(&cell_selector).map(|c| element_text(&c)).collect();
            if cells.len() < 2 {
                continue;
            }

            records.push(Record::new(
                cells[0].clone(),
                region.clone(),
                cells[1].clone(),
                SOURCE_TAG.to_string(),
            ));
        }
    }

    records
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}
