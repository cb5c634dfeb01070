// Plain-text renderings of loaded records

use onsen_scraper::Record;
use serde_json::Value;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Totals plus a per-region count, regions in first-seen order.
pub fn generate_summary_report(records: &[Record]) -> String {
    let located = records.iter().filter(|r| r.is_located()).count();

    let mut by_region: Vec<(&str, usize, usize)> = Vec::new();
    for record in records {
        let located = usize::from(record.is_located());
        match by_region.iter().position(|(region, _, _)| *region == record.region) {
            Some(idx) => {
                by_region[idx].1 += 1;
                by_region[idx].2 += located;
            }
            None => by_region.push((record.region.as_str(), 1, located)),
        }
    }

    let mut report = String::new();
    report.push_str(RULE);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Hot springs: {}\n", records.len()));
    report.push_str(&format!("  With coordinates: {}\n", located));
    report.push_str(&format!("  Without coordinates: {}\n", records.len() - located));
    report.push_str(&format!("  Regions: {}\n", by_region.len()));
    report.push('\n');
    report.push_str(RULE);
    report.push_str("\n\n");

    for (region, count, located) in by_region {
        report.push_str(&format!("  {}  {} ({} located)\n", region, count, located));
    }

    report
}

pub fn format_coordinates(record: &Record) -> String {
    match record.coordinates() {
        Some(c) => format!("{:.5}, {:.5}", c.latitude, c.longitude),
        None => "-".to_string(),
    }
}

/// One line per record: name, region, address, coordinates.
pub fn generate_record_table<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
    let mut table = String::new();
    for record in records {
        table.push_str(&format!(
            "  {}\t{}\t{}\t{}\n",
            record.name,
            record.region,
            record.address,
            format_coordinates(record)
        ));
    }
    table
}

/// All fields of one record, keyed by their persisted names.
pub fn format_record_details(record: &Record) -> String {
    let mut details = String::new();
    for (key, value) in record.to_field_map() {
        let value = match value {
            Value::Null => "-".to_string(),
            Value::String(s) => s,
            other => other.to_string(),
        };
        details.push_str(&format!("  {}: {}\n", key, value));
    }
    details
}
