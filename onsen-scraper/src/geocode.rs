use crate::error::{Result, ScrapeError};
use crate::page::USER_AGENT;
use crate::record::Coordinates;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// Pause between the region-qualified query and the fallback query.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

/// A free-text address search backend.
///
/// `Ok(None)` means the service answered but had no usable match. `Err` is
/// reserved for transport or decoding failures.
#[allow(async_fn_in_trait)]
pub trait GeocodeService {
    async fn search(&self, query: &str) -> Result<Option<Coordinates>>;
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Client for the OpenStreetMap Nominatim search API.
pub struct NominatimClient {
    client: Client,
    endpoint: Url,
}

impl NominatimClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(NOMINATIM_ENDPOINT, 10)
    }

    pub fn with_endpoint(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .build()?;

        Ok(Self { client, endpoint })
    }
}

impl GeocodeService for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<Coordinates>> {
        debug!("Geocoding '{}'", query);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoding '{}' returned HTTP {}", query, status.as_u16());
            return Ok(None);
        }

        let places: Vec<Place> = response.json().await?;
        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = parse_degrees(&place.lat)?;
        let longitude = parse_degrees(&place.lon)?;
        Ok(Some(Coordinates::new(latitude, longitude)))
    }
}

fn parse_degrees(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| ScrapeError::ParseError(format!("invalid coordinate '{}': {}", value, e)))
}

/// Region-qualified lookup with a single address-only fallback.
pub struct Geocoder<S> {
    service: S,
    cooldown: Duration,
}

impl<S: GeocodeService> Geocoder<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            cooldown: DEFAULT_COOLDOWN,
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Queries "`region` `address`", then `address` alone after the cooldown.
    /// Two misses yield `None`; there is never a third query.
    pub async fn locate(&self, region: &str, address: &str) -> Result<Option<Coordinates>> {
        let qualified = format!("{} {}", region, address);
        if let Some(coordinates) = self.service.search(&qualified).await? {
            return Ok(Some(coordinates));
        }

        tokio::time::sleep(self.cooldown).await;

        let coordinates = self.service.search(address).await?;
        if coordinates.is_none() {
            debug!("No match for '{}' ({})", address, region);
        }
        Ok(coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    /// Answers from a fixed table and records every query it sees.
    struct ScriptedService {
        answers: HashMap<String, Coordinates>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn new(answers: &[(&str, Coordinates)]) -> Self {
            Self {
                answers: answers.iter().map(|(q, c)| (q.to_string(), *c)).collect(),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl GeocodeService for ScriptedService {
        async fn search(&self, query: &str) -> Result<Option<Coordinates>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.answers.get(query).copied())
        }
    }

    struct FailingService;

    impl GeocodeService for FailingService {
        async fn search(&self, _query: &str) -> Result<Option<Coordinates>> {
            Err(ScrapeError::ParseError("boom".to_string()))
        }
    }

    fn geocoder(service: ScriptedService) -> Geocoder<ScriptedService> {
        Geocoder::new(service).with_cooldown(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_qualified_query_hits() {
        let hit = Coordinates::new(36.62, 138.59);
        let geocoder = geocoder(ScriptedService::new(&[("群馬県 草津町", hit)]));

        let result = geocoder.locate("群馬県", "草津町").await.unwrap();

        assert_eq!(result, Some(hit));
        assert_eq!(geocoder.service().queries(), vec!["群馬県 草津町"]);
    }

    #[tokio::test]
    async fn test_fallback_to_address_only() {
        let hit = Coordinates::new(35.1, 139.07);
        let geocoder = geocoder(ScriptedService::new(&[("熱海市", hit)]));

        let result = geocoder.locate("静岡県", "熱海市").await.unwrap();

        assert_eq!(result, Some(hit));
        assert_eq!(geocoder.service().queries(), vec!["静岡県 熱海市", "熱海市"]);
    }

    #[tokio::test]
    async fn test_two_misses_is_none_and_no_third_query() {
        let geocoder = geocoder(ScriptedService::new(&[]));

        let result = geocoder.locate("秋田県", "どこか").await.unwrap();

        assert_eq!(result, None);
        assert_eq!(geocoder.service().queries().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_waits_one_cooldown() {
        let geocoder = Geocoder::new(ScriptedService::new(&[])).with_cooldown(Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        let result = geocoder.locate("秋田県", "どこか").await.unwrap();

        assert_eq!(result, None);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_qualified_hit_does_not_wait() {
        let hit = Coordinates::new(36.62, 138.59);
        let geocoder = Geocoder::new(ScriptedService::new(&[("群馬県 草津町", hit)]))
            .with_cooldown(Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        geocoder.locate("群馬県", "草津町").await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let geocoder = Geocoder::new(FailingService).with_cooldown(Duration::ZERO);
        assert!(geocoder.locate("x県", "y").await.is_err());
    }

    #[tokio::test]
    async fn test_nominatim_parses_first_place() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "群馬県 草津町"))
            .and(query_param("format", "json"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "36.6207", "lon": "138.5960", "display_name": "草津町"}
            ])))
            .mount(&mock_server)
            .await;

        let client = NominatimClient::with_endpoint(&format!("{}/search", mock_server.uri()), 5).unwrap();
        let result = client.search("群馬県 草津町").await.unwrap();

        assert_eq!(result, Some(Coordinates::new(36.6207, 138.596)));
    }

    #[tokio::test]
    async fn test_nominatim_empty_result_is_miss() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let client = NominatimClient::with_endpoint(&format!("{}/search", mock_server.uri()), 5).unwrap();
        assert_eq!(client.search("nowhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_nominatim_error_status_is_miss() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let client = NominatimClient::with_endpoint(&format!("{}/search", mock_server.uri()), 5).unwrap();
        assert_eq!(client.search("somewhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_geocoder_over_nominatim_falls_back_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "大分県 別府市"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("q", "別府市"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"lat": "33.28", "lon": "131.49"}])),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = NominatimClient::with_endpoint(&format!("{}/search", mock_server.uri()), 5).unwrap();
        let geocoder = Geocoder::new(client).with_cooldown(Duration::from_millis(1));

        let result = geocoder.locate("大分県", "別府市").await.unwrap();
        assert_eq!(result, Some(Coordinates::new(33.28, 131.49)));
    }
}
