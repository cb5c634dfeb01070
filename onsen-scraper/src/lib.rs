pub mod error;
pub mod geocode;
pub mod page;
pub mod record;

pub use error::ScrapeError;
pub use geocode::{GeocodeService, Geocoder, NominatimClient};
pub use page::PageFetcher;
pub use record::{Coordinates, Record};
