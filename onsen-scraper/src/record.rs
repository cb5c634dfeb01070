use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A latitude/longitude pair returned by a successful geocoding lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One hot-spring entry.
///
/// Serde field names are the persisted JSON keys; the CSV writer uses its own
/// header (see `onsen_core::store`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "名称")]
    pub name: String,
    #[serde(rename = "都道府県")]
    pub region: String,
    #[serde(rename = "所在地", default)]
    pub address: String,
    #[serde(rename = "出典")]
    pub source: String,
    #[serde(rename = "緯度", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "経度", default)]
    pub longitude: Option<f64>,
}

impl Record {
    pub fn new(name: String, region: String, address: String, source: String) -> Self {
        Self {
            name,
            region,
            address,
            source,
            latitude: None,
            longitude: None,
        }
    }

    /// Attach the outcome of a geocoding pass. `None` leaves both fields null.
    pub fn set_coordinates(&mut self, coordinates: Option<Coordinates>) {
        self.latitude = coordinates.map(|c| c.latitude);
        self.longitude = coordinates.map(|c| c.longitude);
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn is_located(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Field name -> value mapping, keyed the same way as the JSON file.
    pub fn to_field_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
