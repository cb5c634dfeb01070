use onsen_core::RecordStore;
use onsen_map::handlers::*;
use onsen_scraper::Record;
use std::fs;
use tempfile::TempDir;

fn record(name: &str, region: &str, coordinates: Option<(f64, f64)>) -> Record {
    let mut record = Record::new(
        name.to_string(),
        region.to_string(),
        "どこか".to_string(),
        "Wikipedia".to_string(),
    );
    record.latitude = coordinates.map(|c| c.0);
    record.longitude = coordinates.map(|c| c.1);
    record
}

fn data_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    RecordStore::new(temp_dir.path())
        .save(&[
            record("草津温泉", "群馬県", Some((36.62, 138.59))),
            record("伊香保温泉", "群馬県", None),
            record("有馬温泉", "兵庫県", Some((34.79, 135.24))),
            record("奥多摩温泉", "東京都", None),
        ])
        .unwrap();
    temp_dir
}

#[test]
fn test_resolve_data_dir_plain() {
    assert_eq!(resolve_data_dir("./data"), std::path::PathBuf::from("./data"));
}

#[test]
fn test_resolve_data_dir_expands_tilde() {
    let resolved = resolve_data_dir("~/onsen");
    assert!(!resolved.starts_with("~"));
    assert!(resolved.ends_with("onsen"));
}

#[test]
fn test_load_data_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let result = load_data(&temp_dir.path().join("missing"));

    let err = result.err().unwrap();
    assert!(err.to_string().contains("Failed to load hot-spring data"));
    assert!(matches!(
        err.downcast_ref::<onsen_core::DataError>(),
        Some(onsen_core::DataError::NotFound(_))
    ));
}

#[test]
fn test_load_data_falls_back_to_csv() {
    let temp_dir = data_dir();
    fs::remove_file(temp_dir.path().join("onsen_data.json")).unwrap();

    let loader = load_data(temp_dir.path()).unwrap();
    assert_eq!(loader.records().unwrap().len(), 4);
}

#[test]
fn test_select_records_no_filter() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = data_dir();
    let loader = load_data(temp_dir.path())?;

    let rows = select_records(&loader, &ListFilter::default())?;
    assert_eq!(rows.len(), 4);
    Ok(())
}

#[test]
fn test_select_records_region_and_located() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = data_dir();
    let loader = load_data(temp_dir.path())?;

    let filter = ListFilter {
        region: Some("群馬".to_string()),
        search: None,
        located_only: true,
    };
    let rows = select_records(&loader, &filter)?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "草津温泉");
    Ok(())
}

#[test]
fn test_select_records_located_only() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = data_dir();
    let loader = load_data(temp_dir.path())?;

    let filter = ListFilter {
        located_only: true,
        ..ListFilter::default()
    };
    let names: Vec<&str> = select_records(&loader, &filter)?
        .into_iter()
        .map(|r| r.name.as_str())
        .collect();

    assert_eq!(names, vec!["草津温泉", "有馬温泉"]);
    Ok(())
}

#[test]
fn test_select_records_search() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = data_dir();
    let loader = load_data(temp_dir.path())?;

    let filter = ListFilter {
        search: Some("有馬".to_string()),
        ..ListFilter::default()
    };
    let rows = select_records(&loader, &filter)?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].region, "兵庫県");
    Ok(())
}

#[test]
fn test_suggest_names() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = data_dir();
    let loader = load_data(temp_dir.path())?;

    assert_eq!(suggest_names(&loader, "草津")?, vec!["草津温泉"]);
    assert!(suggest_names(&loader, "銀山")?.is_empty());
    Ok(())
}

#[test]
fn test_suggest_names_lists_each_name_once() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    RecordStore::new(temp_dir.path()).save(&[
        record("草津温泉", "群馬県", None),
        record("草津湯元", "滋賀県", None),
        record("草津温泉", "滋賀県", None),
    ])?;
    let loader = load_data(temp_dir.path())?;

    assert_eq!(suggest_names(&loader, "草津")?, vec!["草津温泉", "草津湯元"]);
    Ok(())
}
