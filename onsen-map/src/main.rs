use commands::command_argument_builder;
use onsen_map::handlers::{handle_collect, handle_list, handle_regions, handle_show};

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    match chosen_command.subcommand() {
        Some(("collect", primary_command)) => handle_collect(primary_command, quiet).await,
        Some(("list", primary_command)) => handle_list(primary_command),
        Some(("show", primary_command)) => handle_show(primary_command),
        Some(("regions", primary_command)) => handle_regions(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
