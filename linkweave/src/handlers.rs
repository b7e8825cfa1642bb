use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use linkweave_core::config::{
    CONFIG_FILE, DATABASE_FILE, DEFAULT_CONFIG_DIR, load_config, save_config,
};
use linkweave_core::data::Database;
use linkweave_core::import::{ImportSummary, import_snapshot, load_snapshot};
use linkweave_core::report::{
    ReportFormat, ReportHeader, generate_anchor_report, generate_export,
    generate_recommendations_report, generate_stats_report, save_report,
};
use linkweave_core::CoreError;
use linkweave_engine::{
    EngineConfig, EngineError, anchor_report, export_graph, graph_stats, recommendations,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Database and config file locations for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub database: PathBuf,
    pub config: PathBuf,
}

impl Workspace {
    /// Explicit paths win; anything left out lives in the default config dir.
    pub fn resolve(database: Option<&Path>, config: Option<&Path>) -> Self {
        let default_dir = expand_path(DEFAULT_CONFIG_DIR);
        Self {
            database: database
                .map(Path::to_path_buf)
                .unwrap_or_else(|| default_dir.join(DATABASE_FILE)),
            config: config
                .map(Path::to_path_buf)
                .unwrap_or_else(|| default_dir.join(CONFIG_FILE)),
        }
    }

    pub fn from_args(args: &ArgMatches) -> Self {
        let database = args.get_one::<PathBuf>("database").map(|p| expand_path_buf(p));
        let config = args.get_one::<PathBuf>("config").map(|p| expand_path_buf(p));
        Self::resolve(database.as_deref(), config.as_deref())
    }

    pub fn load_config(&self) -> Result<EngineConfig> {
        load_config(&self.config)
            .with_context(|| format!("Failed to load config from {}", self.config.display()))
    }

    pub fn open_database(&self) -> Result<Database> {
        if !Database::exists(&self.database) {
            bail!(
                "No database at {}. Run `linkweave init` first.",
                self.database.display()
            );
        }
        Database::new(&self.database)
            .with_context(|| format!("Failed to open database {}", self.database.display()))
    }
}

/// Expand a leading `~` in a user supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

fn expand_path_buf(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => expand_path(raw),
        None => path.to_path_buf(),
    }
}

pub fn parse_format(raw: &str) -> Result<ReportFormat> {
    ReportFormat::from_str(raw).ok_or_else(|| anyhow!("Unsupported report format '{}'", raw))
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitOutcome {
    pub database: PathBuf,
    pub config: PathBuf,
    pub replaced_database: bool,
    pub wrote_config: bool,
}

/// Create the config directory, the database and a default config file.
///
/// An existing database is only replaced when `overwrite` is set. An existing
/// config file is never touched.
pub fn init_workspace(dir: &Path, overwrite: bool) -> Result<InitOutcome> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create config directory {}", dir.display()))?;

    let database = dir.join(DATABASE_FILE);
    let config = dir.join(CONFIG_FILE);

    let replaced_database = overwrite && Database::exists(&database);
    if replaced_database {
        debug!("Dropping existing database at {}", database.display());
        Database::drop(&database)
            .with_context(|| format!("Failed to remove {}", database.display()))?;
    }
    Database::new(&database)
        .with_context(|| format!("Failed to create database {}", database.display()))?;

    let wrote_config = !config.exists();
    if wrote_config {
        save_config(&config, &EngineConfig::default())?;
    }

    info!("Workspace ready at {}", dir.display());
    Ok(InitOutcome {
        database,
        config,
        replaced_database,
        wrote_config,
    })
}

pub fn project_header(db: &Database, project_id: i64) -> Result<ReportHeader> {
    let project = db
        .get_project(project_id)?
        .ok_or(CoreError::ProjectNotFound(project_id))?;
    Ok(ReportHeader::from(&project))
}

fn engine_failure(err: EngineError) -> anyhow::Error {
    if err.is_retryable() {
        anyhow::Error::new(err).context("The database is busy, try again in a moment")
    } else {
        anyhow::Error::new(err)
    }
}

// Rendering, split from the handlers so it runs without a terminal

pub fn render_stats(
    db: &Database,
    project_id: i64,
    max_pages: Option<usize>,
    config: &EngineConfig,
    format: ReportFormat,
) -> Result<String> {
    let header = project_header(db, project_id)?;
    let max_pages = max_pages.unwrap_or(config.default_max_pages);
    let stats = graph_stats(db, project_id, max_pages, config).map_err(engine_failure)?;
    Ok(generate_stats_report(&stats, &header, format)?)
}

pub fn render_export(
    db: &Database,
    project_id: i64,
    max_pages: Option<usize>,
    config: &EngineConfig,
    format: ReportFormat,
) -> Result<String> {
    project_header(db, project_id)?;
    let max_pages = max_pages.unwrap_or(config.default_max_pages);
    let export = export_graph(db, project_id, max_pages, config).map_err(engine_failure)?;
    Ok(generate_export(&export, format)?)
}

pub fn render_recommendations(
    db: &Database,
    project_id: i64,
    page_id: Option<i64>,
    limit: Option<usize>,
    config: &EngineConfig,
    format: ReportFormat,
) -> Result<String> {
    let header = project_header(db, project_id)?;
    let set = recommendations(db, project_id, page_id, limit, config).map_err(engine_failure)?;
    Ok(generate_recommendations_report(&set, &header, format)?)
}

pub fn render_anchors(
    db: &Database,
    project_id: i64,
    max_pages: Option<usize>,
    config: &EngineConfig,
    format: ReportFormat,
) -> Result<String> {
    let header = project_header(db, project_id)?;
    let max_pages = max_pages.unwrap_or(config.default_max_pages);
    let report = anchor_report(db, project_id, max_pages, config).map_err(engine_failure)?;
    Ok(generate_anchor_report(&report, &header, format)?)
}

/// Print `content`, or write it to `output` when given.
pub fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            save_report(content, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> io::Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_lowercase())
}

fn start_spinner(args: &ArgMatches, message: String) -> Result<ProgressBar> {
    if args.try_get_one::<bool>("quiet").ok().flatten() == Some(&true) {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    Ok(spinner)
}

/// Shared arguments of the report producing subcommands.
struct ReportArgs {
    project_id: i64,
    max_pages: Option<usize>,
    format: ReportFormat,
    output: Option<PathBuf>,
}

impl ReportArgs {
    fn from_args(args: &ArgMatches) -> Result<Self> {
        let project_id = *args
            .get_one::<i64>("project")
            .ok_or_else(|| anyhow!("--project is required"))?;
        let format = match args.get_one::<String>("format") {
            Some(raw) => parse_format(raw)?,
            None => ReportFormat::Text,
        };
        let max_pages = args
            .try_get_one::<usize>("max-pages")
            .ok()
            .flatten()
            .copied();
        Ok(Self {
            project_id,
            max_pages,
            format,
            output: args.get_one::<PathBuf>("output").map(|p| expand_path_buf(p)),
        })
    }
}

// Handlers

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    print_divider();
    println!("{}", "  LINKWEAVE INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let raw_dir = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_DIR);
    let force = args.get_flag("force");
    let dir = expand_path(raw_dir);

    println!(
        "{} Target: {}",
        "→".blue(),
        dir.display().to_string().bright_white()
    );
    println!();

    let database = dir.join(DATABASE_FILE);
    let mut overwrite = force;
    if Database::exists(&database) && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("Database already exists at:");
        println!(
            "  {} {}",
            "•".yellow(),
            database.display().to_string().bright_white()
        );
        println!();

        let response = print_prompt("Would you like to overwrite it? [y/N]:")?;
        println!();
        overwrite = response == "y" || response == "yes";
        if !overwrite {
            println!("{} Keeping existing database", "→".blue());
        }
    }

    let outcome = init_workspace(&dir, overwrite)?;

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    if outcome.replaced_database {
        println!("{} Existing database removed", "✓".green().bold());
    }
    println!(
        "{} Database: {}",
        "✓".green().bold(),
        outcome.database.display().to_string().bright_white()
    );
    let config_note = if outcome.wrote_config {
        "written with defaults"
    } else {
        "kept"
    };
    println!(
        "{} Config: {} ({})",
        "✓".green().bold(),
        outcome.config.display().to_string().bright_white(),
        config_note
    );
    println!();
    Ok(())
}

pub fn handle_import(args: &ArgMatches) -> Result<()> {
    let workspace = Workspace::from_args(args);
    let db = workspace.open_database()?;
    let path = args
        .get_one::<PathBuf>("snapshot")
        .map(|p| expand_path_buf(p))
        .ok_or_else(|| anyhow!("--snapshot is required"))?;

    let snapshot = load_snapshot(&path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;

    let spinner = start_spinner(args, format!("Importing {}", snapshot.project.name))?;
    let progress = |msg: String| spinner.set_message(msg);
    let result = import_snapshot(&db, &snapshot, Some(&progress));
    spinner.finish_and_clear();
    let summary = result?;

    print_import_summary(&snapshot.project.name, &summary);
    Ok(())
}

fn print_import_summary(name: &str, summary: &ImportSummary) {
    println!(
        "{} Imported {} as project {}",
        "✓".green().bold(),
        name.bright_white(),
        summary.project_id.to_string().cyan()
    );
    println!("  {} pages:      {}", "•".blue(), summary.pages);
    println!("  {} links:      {}", "•".blue(), summary.links);
    println!("  {} external:   {}", "•".blue(), summary.external_links);
    if summary.unresolved_links > 0 {
        println!(
            "  {} unresolved: {}",
            "•".yellow(),
            summary.unresolved_links.to_string().yellow()
        );
    }
    if summary.skipped_links > 0 {
        println!(
            "  {} skipped:    {}",
            "•".yellow(),
            summary.skipped_links.to_string().yellow()
        );
    }
}

pub fn handle_projects(args: &ArgMatches) -> Result<()> {
    let workspace = Workspace::from_args(args);
    let db = workspace.open_database()?;
    let projects = db.list_projects()?;

    if projects.is_empty() {
        println!("No projects yet. Import one with `linkweave import -s <SNAPSHOT>`.");
        return Ok(());
    }

    print_divider();
    println!(
        "{}",
        format!("  {:>4}  {:<28} {:<24} {:>6} {:>7}", "ID", "NAME", "DOMAIN", "PAGES", "LINKS")
            .bright_white()
            .bold()
    );
    print_divider();
    for project in projects {
        println!(
            "  {:>4}  {:<28} {:<24} {:>6} {:>7}",
            project.id.to_string().cyan(),
            project.name,
            project.domain,
            project.page_count,
            project.link_count
        );
    }
    Ok(())
}

pub fn handle_stats(args: &ArgMatches) -> Result<()> {
    let workspace = Workspace::from_args(args);
    let config = workspace.load_config()?;
    let db = workspace.open_database()?;
    let report = ReportArgs::from_args(args)?;

    let spinner = start_spinner(args, "Ranking pages...".to_string())?;
    let rendered = render_stats(&db, report.project_id, report.max_pages, &config, report.format);
    spinner.finish_and_clear();

    emit(&rendered?, report.output.as_deref())
}

pub fn handle_export(args: &ArgMatches) -> Result<()> {
    let workspace = Workspace::from_args(args);
    let config = workspace.load_config()?;
    let db = workspace.open_database()?;
    let report = ReportArgs::from_args(args)?;

    let spinner = start_spinner(args, "Exporting link graph...".to_string())?;
    let rendered = render_export(&db, report.project_id, report.max_pages, &config, report.format);
    spinner.finish_and_clear();

    emit(&rendered?, report.output.as_deref())
}

pub fn handle_recommend(args: &ArgMatches) -> Result<()> {
    let workspace = Workspace::from_args(args);
    let config = workspace.load_config()?;
    let db = workspace.open_database()?;
    let report = ReportArgs::from_args(args)?;
    let page_id = args.get_one::<i64>("page").copied();
    let limit = args.get_one::<usize>("limit").copied();

    let message = match page_id {
        Some(page) => format!("Matching keywords of page {}...", page),
        None => "Matching keywords across top pages...".to_string(),
    };
    let spinner = start_spinner(args, message)?;
    let rendered = render_recommendations(
        &db,
        report.project_id,
        page_id,
        limit,
        &config,
        report.format,
    );
    spinner.finish_and_clear();

    emit(&rendered?, report.output.as_deref())
}

pub fn handle_anchors(args: &ArgMatches) -> Result<()> {
    let workspace = Workspace::from_args(args);
    let config = workspace.load_config()?;
    let db = workspace.open_database()?;
    let report = ReportArgs::from_args(args)?;

    let spinner = start_spinner(args, "Auditing anchor texts...".to_string())?;
    let rendered = render_anchors(&db, report.project_id, report.max_pages, &config, report.format);
    spinner.finish_and_clear();

    emit(&rendered?, report.output.as_deref())
}
