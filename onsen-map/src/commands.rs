use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

fn data_dir_arg() -> clap::Arg {
    arg!(-d --"data-dir" <PATH>)
        .required(false)
        .help("Directory holding onsen_data.csv and onsen_data.json")
        .default_value("./data")
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("onsen-map")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("onsen-map")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress progress bars and non-essential output").required(false))
        .subcommand_required(true)
        .subcommand(
            command!("collect")
                .about(
                    "Scrape the hot-spring list, geocode every entry and write the CSV and JSON \
                data files.",
                )
                .arg(data_dir_arg())
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("Encyclopedia page to scrape")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(onsen_scraper::page::SOURCE_URL),
                )
                .arg(
                    arg!(-g --"geocoder" <URL>)
                        .required(false)
                        .help("Nominatim-compatible search endpoint")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(onsen_scraper::geocode::NOMINATIM_ENDPOINT),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"cooldown-ms" <MILLISECONDS>)
                        .required(false)
                        .help("Pause between geocoding batches and before each fallback query")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("1000"),
                ),
        )
        .subcommand(
            command!("list")
                .about("List collected hot springs")
                .arg(data_dir_arg())
                .arg(
                    arg!(-r --"region" <TEXT>)
                        .required(false)
                        .help("Only regions containing this text"),
                )
                .arg(
                    arg!(-s --"search" <TEXT>)
                        .required(false)
                        .help("Only names containing this text"),
                )
                .arg(
                    arg!(--"located")
                        .required(false)
                        .help("Only entries with coordinates")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"summary")
                        .required(false)
                        .help("Print per-region totals instead of rows")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("show")
                .about("Show every field of one hot spring")
                .arg(arg!(<NAME>).help("Exact name of the hot spring"))
                .arg(data_dir_arg()),
        )
        .subcommand(
            command!("regions")
                .about("List the regions present in the data")
                .arg(data_dir_arg()),
        )
}
