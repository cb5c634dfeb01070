use crate::error::CollectError;
use crate::store::RecordStore;
use indicatif::{ProgressBar, ProgressStyle};
use onsen_scraper::geocode::{DEFAULT_COOLDOWN, NOMINATIM_ENDPOINT};
use onsen_scraper::page::SOURCE_URL;
use onsen_scraper::{GeocodeService, Geocoder, NominatimClient, PageFetcher, Record, ScrapeError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Options for configuring a collection run
pub struct CollectOptions {
    pub data_dir: PathBuf,
    pub source_url: String,
    pub geocoder_endpoint: String,
    pub timeout_secs: u64,
    pub cooldown: Duration,
    pub pause_every: usize,
    pub show_progress_bars: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            source_url: SOURCE_URL.to_string(),
            geocoder_endpoint: NOMINATIM_ENDPOINT.to_string(),
            timeout_secs: 30,
            cooldown: DEFAULT_COOLDOWN,
            pause_every: 5,
            show_progress_bars: true,
        }
    }
}

/// Callback for reporting collection progress
pub type CollectProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Scrape, geocode and persist, strictly in that order.
pub struct Collector<S> {
    fetcher: PageFetcher,
    geocoder: Geocoder<S>,
    store: RecordStore,
    cooldown: Duration,
    pause_every: usize,
    progress_callback: Option<CollectProgressCallback>,
    show_progress_bar: bool,
}

impl<S: GeocodeService> Collector<S> {
    pub fn new(fetcher: PageFetcher, geocoder: Geocoder<S>, store: RecordStore) -> Self {
        Self {
            fetcher,
            geocoder,
            store,
            cooldown: DEFAULT_COOLDOWN,
            pause_every: 5,
            progress_callback: None,
            show_progress_bar: false,
        }
    }

    /// Pause inserted between batches of geocoded records.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Batch size for the rate-limit pause. Zero disables pausing.
    pub fn with_pause_every(mut self, pause_every: usize) -> Self {
        self.pause_every = pause_every;
        self
    }

    pub fn with_progress_callback(mut self, callback: CollectProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress_bar = show;
        self
    }

    fn report(&self, message: String) {
        if let Some(ref callback) = self.progress_callback {
            callback(message);
        }
    }

    /// Run the whole pipeline and return the enriched records.
    ///
    /// A scrape failure aborts before anything is written. A geocoding
    /// service error aborts the run and nothing is persisted.
    pub async fn run(&self) -> Result<Vec<Record>, CollectError> {
        self.report(format!("Collecting records from {}", self.fetcher.url()));
        let mut records = self.fetcher.collect().await?;
        self.report(format!("Collected {} records", records.len()));

        self.geocode_records(&mut records).await?;

        if records.is_empty() {
            self.report("No records to save".to_string());
        }
        for path in self.store.save(&records)? {
            self.report(format!("Saved {}", path.display()));
        }

        Ok(records)
    }

    /// Attach coordinates to each record in order, pausing before every
    /// `pause_every`-th record. The counter is records, not service calls.
    pub async fn geocode_records(&self, records: &mut [Record]) -> Result<(), ScrapeError> {
        let total = records.len();
        let progress_bar = self.show_progress_bar.then(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        });

        for (idx, record) in records.iter_mut().enumerate() {
            if idx > 0 && self.pause_every > 0 && idx % self.pause_every == 0 {
                self.report(format!("{}/{} records processed...", idx, total));
                tokio::time::sleep(self.cooldown).await;
            }

            if let Some(ref pb) = progress_bar {
                pb.set_message(record.name.clone());
            }

            let coordinates = self.geocoder.locate(&record.region, &record.address).await?;
            if coordinates.is_none() {
                warn!("Could not geocode '{}' ({} {})", record.name, record.region, record.address);
            }
            record.set_coordinates(coordinates);

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
        }

        let located = records.iter().filter(|r| r.is_located()).count();
        if let Some(ref pb) = progress_bar {
            pb.finish_with_message(format!("{} of {} located", located, total));
        }
        info!("Geocoding complete: {} of {} records located", located, total);
        self.report(format!("Geocoded {} of {} records", located, total));

        Ok(())
    }
}

/// Execute a collection run against the configured page and Nominatim
/// endpoint. Returns the enriched records.
pub async fn execute_collection(
    options: CollectOptions,
    progress_callback: Option<CollectProgressCallback>,
) -> Result<Vec<Record>, CollectError> {
    let CollectOptions {
        data_dir,
        source_url,
        geocoder_endpoint,
        timeout_secs,
        cooldown,
        pause_every,
        show_progress_bars,
    } = options;

    let fetcher = PageFetcher::with_url(&source_url, timeout_secs)?;
    let client = NominatimClient::with_endpoint(&geocoder_endpoint, timeout_secs)?;
    let geocoder = Geocoder::new(client).with_cooldown(cooldown);

    let mut collector = Collector::new(fetcher, geocoder, RecordStore::new(data_dir))
        .with_cooldown(cooldown)
        .with_pause_every(pause_every)
        .with_progress_bar(show_progress_bars);

    if let Some(callback) = progress_callback {
        collector = collector.with_progress_callback(callback);
    }

    collector.run().await
}
