// Read side: persisted records back into memory, plus the table queries

use crate::error::{DataError, Result};
use crate::store::{self, CSV_FILENAME, JSON_FILENAME};
use onsen_scraper::Record;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Holds one loaded data set. Every query fails with
/// [`DataError::NotLoaded`] until a load succeeds.
pub struct OnsenLoader {
    data_dir: PathBuf,
    data: Option<Vec<Record>>,
}

impl OnsenLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            data: None,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load_from_csv(&mut self, filename: &str) -> Result<&[Record]> {
        let path = self.data_dir.join(filename);
        let records = store::read_csv(&path)?;
        Ok(self.replace(records, &path))
    }

    pub fn load_from_json(&mut self, filename: &str) -> Result<&[Record]> {
        let path = self.data_dir.join(filename);
        let records = store::read_json(&path)?;
        Ok(self.replace(records, &path))
    }

    /// Load the JSON file, falling back to the CSV file only when the JSON
    /// file does not exist. Any other JSON failure is returned as-is.
    pub fn load(&mut self) -> Result<&[Record]> {
        let json_path = self.data_dir.join(JSON_FILENAME);
        match store::read_json(&json_path) {
            Ok(records) => Ok(self.replace(records, &json_path)),
            Err(DataError::NotFound(_)) => {
                debug!("{} not found, trying CSV", json_path.display());
                self.load_from_csv(CSV_FILENAME)
            }
            Err(e) => Err(e),
        }
    }

    fn replace(&mut self, records: Vec<Record>, path: &Path) -> &[Record] {
        info!("Loaded {} records from {}", records.len(), path.display());
        self.data.insert(records)
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn records(&self) -> Result<&[Record]> {
        self.data.as_deref().ok_or(DataError::NotLoaded)
    }

    /// Rows whose region contains `region` (case-sensitive).
    pub fn filter_by_region(&self, region: &str) -> Result<Vec<&Record>> {
        Ok(self
            .records()?
            .iter()
            .filter(|r| r.region.contains(region))
            .collect())
    }

    /// Rows whose region is exactly `region`.
    pub fn in_region(&self, region: &str) -> Result<Vec<&Record>> {
        Ok(self
            .records()?
            .iter()
            .filter(|r| r.region == region)
            .collect())
    }

    /// Rows with both coordinates present.
    pub fn located(&self) -> Result<Vec<&Record>> {
        Ok(self.records()?.iter().filter(|r| r.is_located()).collect())
    }

    /// First row whose name equals `name`; `Ok(None)` when there is none.
    /// See [`OnsenLoader::details_by_name`] for the field map of that row.
    pub fn find_by_name(&self, name: &str) -> Result<Option<&Record>> {
        Ok(self.records()?.iter().find(|r| r.name == name))
    }

    /// Field map of the first row named `name`, keyed by the JSON field names
    /// with `null` for missing coordinates.
    pub fn details_by_name(&self, name: &str) -> Result<Option<Map<String, Value>>> {
        Ok(self.find_by_name(name)?.map(Record::to_field_map))
    }

    pub fn search_by_name(&self, query: &str) -> Result<Vec<&Record>> {
        Ok(self
            .records()?
            .iter()
            .filter(|r| r.name.contains(query))
            .collect())
    }

    /// Distinct region names, sorted.
    pub fn regions(&self) -> Result<Vec<&str>> {
        let regions: BTreeSet<&str> = self.records()?.iter().map(|r| r.region.as_str()).collect();
        Ok(regions.into_iter().collect())
    }
}
