use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use onsen_core::collect::{CollectOptions, CollectProgressCallback, execute_collection};
use onsen_core::report::{format_record_details, generate_record_table, generate_summary_report};
use onsen_core::{DataError, OnsenLoader};
use onsen_scraper::Record;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Row filters for the `list` command
#[derive(Debug, Default)]
pub struct ListFilter {
    pub region: Option<String>,
    pub search: Option<String>,
    pub located_only: bool,
}

/// Expand `~` in a user-supplied data directory
pub fn resolve_data_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Load the data directory, JSON first with CSV as the fallback
pub fn load_data(data_dir: &Path) -> Result<OnsenLoader> {
    debug!("Loading data from {}", data_dir.display());
    let mut loader = OnsenLoader::new(data_dir);
    loader
        .load()
        .with_context(|| format!("Failed to load hot-spring data from {}", data_dir.display()))?;
    Ok(loader)
}

/// Apply the `list` filters on top of the loader's queries
pub fn select_records<'a>(loader: &'a OnsenLoader, filter: &ListFilter) -> Result<Vec<&'a Record>> {
    let mut rows = if let Some(ref region) = filter.region {
        loader.filter_by_region(region)?
    } else if filter.located_only {
        loader.located()?
    } else {
        loader.records()?.iter().collect()
    };

    if filter.located_only {
        rows.retain(|r| r.is_located());
    }
    if let Some(ref search) = filter.search {
        rows.retain(|r| r.name.contains(search.as_str()));
    }

    Ok(rows)
}

/// Names to suggest when an exact lookup misses, each once, in data order
pub fn suggest_names(loader: &OnsenLoader, name: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    Ok(loader
        .search_by_name(name)?
        .into_iter()
        .filter(|r| seen.insert(r.name.as_str()))
        .map(|r| r.name.clone())
        .collect())
}

fn data_dir_from(args: &ArgMatches) -> PathBuf {
    let raw = args
        .get_one::<String>("data-dir")
        .map(String::as_str)
        .unwrap_or("./data");
    resolve_data_dir(raw)
}

/// Load or print a warning and exit. Missing data is reported as a notice
/// pointing at `collect`, not as a failure trace.
fn load_or_exit(data_dir: &Path) -> OnsenLoader {
    match load_data(data_dir) {
        Ok(loader) => loader,
        Err(e) => {
            if let Some(DataError::NotFound(_)) = e.downcast_ref::<DataError>() {
                eprintln!(
                    "{} No hot-spring data found in {}. Run `onsen-map collect` first.",
                    "⚠".yellow().bold(),
                    data_dir.display().to_string().bright_white()
                );
            } else {
                eprintln!("{} {:#}", "✗".red().bold(), e);
            }
            std::process::exit(1);
        }
    }
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

pub async fn handle_collect(sub_matches: &ArgMatches, quiet: bool) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let data_dir = data_dir_from(sub_matches);
    let source_url = sub_matches.get_one::<Url>("url");
    let geocoder = sub_matches.get_one::<Url>("geocoder");
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap_or(&30);
    let cooldown_ms = *sub_matches.get_one::<u64>("cooldown-ms").unwrap_or(&1000);

    let defaults = CollectOptions::default();
    let options = CollectOptions {
        data_dir: data_dir.clone(),
        source_url: source_url.map(Url::to_string).unwrap_or(defaults.source_url),
        geocoder_endpoint: geocoder.map(Url::to_string).unwrap_or(defaults.geocoder_endpoint),
        timeout_secs,
        cooldown: Duration::from_millis(cooldown_ms),
        pause_every: defaults.pause_every,
        show_progress_bars: !quiet,
    };

    if !quiet {
        print_divider();
        println!("{}", "  ONSEN COLLECTION".bright_white().bold());
        print_divider();
        println!("{} Source: {}", "→".blue(), options.source_url.bright_white());
        println!("{} Geocoder: {}", "→".blue(), options.geocoder_endpoint.bright_white());
        println!("{} Output: {}", "→".blue(), data_dir.display().to_string().bright_white());
        println!();
    }

    let progress_callback: Option<CollectProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| {
            println!("{} {}", "→".blue(), msg);
        }))
    };

    match execute_collection(options, progress_callback).await {
        Ok(records) => {
            let located = records.iter().filter(|r| r.is_located()).count();
            println!();
            println!(
                "{} Collection complete: {} hot springs, {} with coordinates",
                "✓".green().bold(),
                records.len().to_string().cyan(),
                located.to_string().cyan()
            );
        }
        Err(e) => {
            eprintln!("{} Collection failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub fn handle_list(sub_matches: &ArgMatches) {
    let data_dir = data_dir_from(sub_matches);
    let loader = load_or_exit(&data_dir);

    let filter = ListFilter {
        region: sub_matches.get_one::<String>("region").cloned(),
        search: sub_matches.get_one::<String>("search").cloned(),
        located_only: sub_matches.get_flag("located"),
    };

    let rows = match select_records(&loader, &filter) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if rows.is_empty() {
        println!("{} No data to display.", "ℹ".blue());
        return;
    }

    if sub_matches.get_flag("summary") {
        let owned: Vec<Record> = rows.into_iter().cloned().collect();
        print!("{}", generate_summary_report(&owned));
        return;
    }

    println!("{} {} hot springs", "✓".green().bold(), rows.len().to_string().cyan());
    print!("{}", generate_record_table(rows));
}

pub fn handle_show(sub_matches: &ArgMatches) {
    let data_dir = data_dir_from(sub_matches);
    let loader = load_or_exit(&data_dir);
    let Some(name) = sub_matches.get_one::<String>("NAME") else {
        return;
    };

    match loader.find_by_name(name) {
        Ok(Some(record)) => {
            println!("{}", record.name.bright_white().bold());
            print!("{}", format_record_details(record));
        }
        Ok(None) => {
            println!("{} No hot spring named '{}'", "ℹ".blue(), name);
            if let Ok(suggestions) = suggest_names(&loader, name)
                && !suggestions.is_empty()
            {
                println!("Did you mean:");
                for suggestion in suggestions {
                    println!("  {} {}", "•".yellow(), suggestion);
                }
            }
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub fn handle_regions(sub_matches: &ArgMatches) {
    let data_dir = data_dir_from(sub_matches);
    let loader = load_or_exit(&data_dir);

    match loader.regions() {
        Ok(regions) if regions.is_empty() => println!("{} No data to display.", "ℹ".blue()),
        Ok(regions) => {
            for region in regions {
                let count = loader.in_region(region).map(|rows| rows.len()).unwrap_or(0);
                println!("  {} ({})", region, count);
            }
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
