use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use linkweave::handlers::{
    handle_anchors, handle_export, handle_import, handle_init, handle_projects, handle_recommend,
    handle_stats,
};
use linkweave_core::print_banner;
use tracing::Level;

mod commands;

fn init_logging(matches: &ArgMatches) {
    let level = match matches.get_count("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    init_logging(&chosen_command);

    let result = match chosen_command.subcommand() {
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("import", primary_command)) => handle_import(primary_command),
        Some(("projects", primary_command)) => handle_projects(primary_command),
        Some(("stats", primary_command)) => handle_stats(primary_command),
        Some(("export", primary_command)) => handle_export(primary_command),
        Some(("recommend", primary_command)) => handle_recommend(primary_command),
        Some(("anchors", primary_command)) => handle_anchors(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
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
