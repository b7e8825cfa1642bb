use crate::CLAP_STYLING;
use clap::{arg, command};
use linkweave_core::config::DEFAULT_CONFIG_DIR;
use std::path::PathBuf;

fn project_arg() -> clap::Arg {
    arg!(-p --"project" <ID>)
        .required(true)
        .help("Id of the imported project (see `linkweave projects`)")
        .value_parser(clap::value_parser!(i64))
}

fn max_pages_arg() -> clap::Arg {
    arg!(-m --"max-pages" <COUNT>)
        .required(false)
        .help("Upper bound on the pages pulled into the graph (default from config)")
        .value_parser(clap::value_parser!(usize))
}

fn output_arg() -> clap::Arg {
    arg!(-o --"output" <PATH>)
        .required(false)
        .help("Save report to file (default: display to screen)")
        .value_parser(clap::value_parser!(PathBuf))
}

fn report_format_arg() -> clap::Arg {
    arg!(-f --"format" <FORMAT>)
        .required(false)
        .help("Report format: text, json, csv, markdown")
        .value_parser(["text", "json", "csv", "markdown"])
        .default_value("text")
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("linkweave")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linkweave")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" ... "Log more detail to stderr (-v info, -vv debug, -vvv trace)")
                .global(true),
        )
        .arg(
            arg!(-d --"database" <PATH>)
                .required(false)
                .global(true)
                .help("Database file (default: ~/.config/linkweave/linkweave.db)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(-c --"config" <PATH>)
                .required(false)
                .global(true)
                .help("Engine config file (default: ~/.config/linkweave/config.json)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the linkweave database and config on your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory to store the linkweave database and config")
                        .default_value(DEFAULT_CONFIG_DIR),
                )
                .arg(
                    arg!(-f - -"force")
                        .help(
                            "Forces the overwriting of any existing database at the specified \
                        location.",
                        )
                        .required(false),
                ),
        )
        .subcommand(
            command!("import")
                .about("Imports a crawl snapshot (JSON) as a new project")
                .arg(
                    arg!(-s --"snapshot" <PATH>)
                        .required(true)
                        .help("Path to the snapshot file")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(command!("projects").about("List imported projects"))
        .subcommand(
            command!("stats")
                .about("Ranks pages and reports hubs, authorities and orphans")
                .arg(project_arg())
                .arg(max_pages_arg())
                .arg(report_format_arg())
                .arg(output_arg()),
        )
        .subcommand(
            command!("export")
                .about("Exports the link graph with ranks for visualization")
                .arg(project_arg())
                .arg(max_pages_arg())
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Export format: json (nodes and edges) or csv (edge list)")
                        .value_parser(["json", "csv"])
                        .default_value("json"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            command!("recommend")
                .about(
                    "Suggests new internal links from shared keywords. Scans the top pages \
                unless --page is given.",
                )
                .arg(project_arg())
                .arg(
                    arg!(--"page" <ID>)
                        .required(false)
                        .help("Only recommend links from this page")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    arg!(-l --"limit" <COUNT>)
                        .required(false)
                        .help("Maximum number of recommendations (default from config)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(report_format_arg())
                .arg(output_arg()),
        )
        .subcommand(
            command!("anchors")
                .about("Audits the anchor texts of internal links")
                .arg(project_arg())
                .arg(max_pages_arg())
                .arg(report_format_arg())
                .arg(output_arg()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_valid() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn global_args_reach_subcommands() {
        let matches = command_argument_builder()
            .try_get_matches_from([
                "linkweave", "stats", "-p", "3", "-d", "/tmp/lw.db", "-vv", "-f", "csv",
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();

        assert_eq!(name, "stats");
        assert_eq!(sub.get_one::<i64>("project"), Some(&3));
        assert_eq!(
            sub.get_one::<PathBuf>("database"),
            Some(&PathBuf::from("/tmp/lw.db"))
        );
        assert_eq!(sub.get_one::<String>("format").map(String::as_str), Some("csv"));
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn recommend_requires_project() {
        let result = command_argument_builder().try_get_matches_from(["linkweave", "recommend"]);
        assert!(result.is_err());
    }

    #[test]
    fn export_rejects_text_format() {
        let result = command_argument_builder()
            .try_get_matches_from(["linkweave", "export", "-p", "1", "-f", "text"]);
        assert!(result.is_err());
    }
}
