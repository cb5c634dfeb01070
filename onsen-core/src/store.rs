// Flat-file persistence for collected records

use crate::error::{DataError, Result};
use onsen_scraper::Record;
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CSV_FILENAME: &str = "onsen_data.csv";
pub const JSON_FILENAME: &str = "onsen_data.json";

/// Column names of the delimited file, in order.
pub const CSV_HEADER: [&str; 6] = ["name", "region", "address", "source", "latitude", "longitude"];

/// CSV row shape; field order is the column order.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    name: String,
    region: String,
    address: String,
    source: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<&Record> for CsvRow {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            region: record.region.clone(),
            address: record.address.clone(),
            source: record.source.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

impl From<CsvRow> for Record {
    fn from(row: CsvRow) -> Self {
        Record {
            name: row.name,
            region: row.region,
            address: row.address,
            source: row.source,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

fn open_existing(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DataError::NotFound(path.to_path_buf()),
        _ => DataError::IoError(e),
    })
}

/// Overwrite `path` with a header row plus one row per record. Missing
/// coordinates are written as empty fields.
pub fn write_csv(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(File::create(path)?));
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::Reader::from_reader(BufReader::new(open_existing(path)?));
    reader
        .deserialize::<CsvRow>()
        .map(|row| row.map(Record::from).map_err(DataError::from))
        .collect()
}

/// Overwrite `path` with a pretty-printed (4-space) JSON array. Non-ASCII
/// text is written as-is.
pub fn write_json(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json(path: &Path) -> Result<Vec<Record>> {
    let reader = BufReader::new(open_existing(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Writes a run's records to the data directory in both formats.
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn csv_path(&self) -> PathBuf {
        self.data_dir.join(CSV_FILENAME)
    }

    pub fn json_path(&self) -> PathBuf {
        self.data_dir.join(JSON_FILENAME)
    }

    /// Write both files and return the paths written.
    ///
    /// Each format is attempted regardless of the other's outcome; the first
    /// failure is returned afterwards. An empty record list writes nothing.
    pub fn save(&self, records: &[Record]) -> Result<Vec<PathBuf>> {
        if records.is_empty() {
            warn!("No records to save");
            return Ok(Vec::new());
        }

        fs::create_dir_all(&self.data_dir)?;

        let csv_path = self.csv_path();
        let json_path = self.json_path();
        let csv_result = write_csv(&csv_path, records);
        let json_result = write_json(&json_path, records);

        let mut written = Vec::new();
        let mut first_error = None;
        for (path, result) in [(csv_path, csv_result), (json_path, json_result)] {
            match result {
                Ok(()) => {
                    info!("Saved {} records to {}", records.len(), path.display());
                    written.push(path);
                }
                Err(e) => {
                    warn!("Failed to save {}: {}", path.display(), e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }
}
