use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::{subscriber::set_global_default, Level};
use tracing_subscriber::EnvFilter;

use refrain::persist::{default_config_path, AppSettings};
use refrain::report;
use refrain::{Action, ActionExecutor, DuplicateScanner, ScanContext};

fn init_tracing(verbosity: u8) {
    // Map -q/-v to tracing levels; default WARN
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr) // logs to stderr
        .with_target(false)
        .with_level(true)
        .compact()
        .finish();

    // Ignore error if already set in tests or env
    let _ = set_global_default(subscriber);
}

fn main() {
    let opts = Opts::parse();
    init_tracing(opts.verbose.saturating_sub(opts.quiet));
    if let Err(e) = run(opts) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(opts: Opts) -> anyhow::Result<()> {
    let settings_path = default_config_path();
    let settings = match &settings_path {
        Some(path) => AppSettings::load_or_default(path),
        None => AppSettings::default(),
    };

    match opts.command {
        Command::Scan {
            directories,
            dry_run,
            move_to,
            delete,
            threshold,
            no_tags,
            exact_size,
            yes,
        } => {
            let mut config = settings.to_scan_config();
            if delete {
                config.action = Action::Delete;
                config.destination = None;
            }
            if let Some(dest) = move_to {
                config.action = Action::Move;
                config.destination = Some(dest);
            }
            if let Some(t) = threshold {
                config.similarity_threshold = t;
            }
            if no_tags {
                config.use_tags = false;
            }
            if exact_size {
                config.exact_size_match = true;
            }
            config.validate()?;

            let scanner = DuplicateScanner::new(config.clone());
            let ctx = ScanContext::new();
            let result = scanner.scan(&directories, &ctx)?;

            for group in result.groups.values() {
                for line in report::render_group(group, settings.verbose) {
                    println!("{line}");
                }
                println!();
            }
            println!("{}", report::render_summary(&result));

            if result.is_empty() {
                return Ok(());
            }
            if !dry_run && !yes && !confirm()? {
                println!("Aborted.");
                return Ok(());
            }

            let executor = ActionExecutor::new(&config, dry_run)?;
            let action_report = executor.apply(&result, &ctx)?;
            for (path, outcome) in &action_report.outcomes {
                println!("{}", report::render_outcome(path, outcome));
            }
            println!("{}", report::render_processed_count(&action_report, dry_run));
        }
        Command::Config => {
            match &settings_path {
                Some(path) => println!("Settings file: {}", path.display()),
                None => println!("Settings file: <no config directory available>"),
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}

fn confirm() -> anyhow::Result<bool> {
    print!("Do you want to proceed with processing these duplicates? (y/n): ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[derive(Parser)]
#[command(version, about = "Find and clean up duplicate music files")]
pub struct Opts {
    /// Increase verbosity (-v, -vv). Default WARN.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Decrease verbosity (-q). Each -q reduces level by one step.
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan directories for duplicate songs and delete or relocate them
    Scan {
        /// Directories to scan
        #[arg(required = true)]
        directories: Vec<PathBuf>,

        /// Report what would happen without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Move duplicates into this directory instead of deleting
        #[arg(long = "move", value_name = "DIR", conflicts_with = "delete")]
        move_to: Option<PathBuf>,

        /// Delete duplicates in place
        #[arg(long)]
        delete: bool,

        /// Similarity threshold override (0.0 to 1.0)
        #[arg(long)]
        threshold: Option<f64>,

        /// Group by filename only, ignoring embedded tags
        #[arg(long)]
        no_tags: bool,

        /// Only treat byte-identical sizes as duplicates
        #[arg(long)]
        exact_size: bool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show the settings file location and current values
    Config,
}
