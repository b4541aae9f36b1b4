//! `runwatch`: derive a single status label for an agent run.
//!
//! Reads the run's metadata record, self-report and tmux session, and prints
//! one of the stable status labels (`merged`, `needs input`, `stalled`, ...).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;

use runwatch::check::{ReportCheck, check_report};
use runwatch::core::report::RunnerReport;
use runwatch::exit_codes;
use runwatch::io::config::load_config;
use runwatch::io::paths::RunPaths;
use runwatch::io::report_store::write_report;
use runwatch::io::tmux::Tmux;
use runwatch::logging;
use runwatch::snapshot::{ReportPolicy, SnapshotRequest};
use runwatch::status::evaluate_run;

#[derive(Parser)]
#[command(
    name = "runwatch",
    version,
    about = "Derive a stable status label for agent runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the derived status of one run.
    Status {
        /// Run directory holding `.runner/state/`.
        run_dir: PathBuf,
        /// Worktree checkout (defaults to `<RUN_DIR>/worktree`).
        #[arg(long)]
        worktree: Option<PathBuf>,
        /// Tmux session bound to the run.
        #[arg(short, long)]
        session: Option<String>,
        /// Metadata record (defaults to `.runner/state/meta.json`).
        #[arg(long)]
        metadata: Option<PathBuf>,
        /// Watcher config (defaults to `.runner/state/watch.toml`).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Use self-reports that fail validation instead of ignoring them.
        #[arg(long)]
        lenient: bool,
        /// Print JSON instead of a single line.
        #[arg(long)]
        json: bool,
    },
    /// Runner self-report helpers.
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Write the initial `working` self-report.
    Init {
        run_dir: PathBuf,
        /// Overwrite an existing report.
        #[arg(short, long)]
        force: bool,
    },
    /// Check the self-report against the schema and field rules.
    Check { run_dir: PathBuf },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Status {
            run_dir,
            worktree,
            session,
            metadata,
            config,
            lenient,
            json,
        } => cmd_status(&StatusArgs {
            run_dir,
            worktree,
            session,
            metadata,
            config,
            lenient,
            json,
        }),
        Command::Report(ReportCommand::Init { run_dir, force }) => cmd_report_init(&run_dir, force),
        Command::Report(ReportCommand::Check { run_dir }) => cmd_report_check(&run_dir),
    }
}

struct StatusArgs {
    run_dir: PathBuf,
    worktree: Option<PathBuf>,
    session: Option<String>,
    metadata: Option<PathBuf>,
    config: Option<PathBuf>,
    lenient: bool,
    json: bool,
}

fn cmd_status(args: &StatusArgs) -> Result<i32> {
    let paths = RunPaths::new(&args.run_dir);
    let config_path = args.config.as_ref().unwrap_or(&paths.config_path);
    let config = load_config(config_path).context("load watch config")?;
    let metadata_path = args.metadata.as_ref().unwrap_or(&paths.metadata_path);
    let worktree = args.worktree.as_ref().unwrap_or(&paths.worktree_dir);

    let request = SnapshotRequest {
        run_dir: &args.run_dir,
        worktree,
        session: args.session.as_deref(),
        stall_threshold: config.stall_threshold(),
        report_policy: if args.lenient {
            ReportPolicy::Lenient
        } else {
            ReportPolicy::Strict
        },
        now: Utc::now(),
    };
    let view = evaluate_run(&request, metadata_path, &Tmux::new(&config.tmux));

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&view).context("serialize status")?
        );
    } else {
        println!("{}", view.render_line());
    }
    Ok(exit_codes::OK)
}

fn cmd_report_init(run_dir: &Path, force: bool) -> Result<i32> {
    let path = RunPaths::new(run_dir).report_path;
    if path.exists() && !force {
        bail!(
            "runner report already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    write_report(run_dir, &RunnerReport::initial())?;
    info!(path = %path.display(), "initial runner report written");
    println!("{}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_report_check(run_dir: &Path) -> Result<i32> {
    match check_report(run_dir)? {
        ReportCheck::Valid(report) => {
            println!("ok: {} - {}", report.status, report.summary);
            Ok(exit_codes::OK)
        }
        ReportCheck::Missing => {
            println!("missing: no runner report under {}", run_dir.display());
            Ok(exit_codes::REPORT_INVALID)
        }
        ReportCheck::Invalid(problems) => {
            println!("invalid:\n- {}", problems.join("\n- "));
            Ok(exit_codes::REPORT_INVALID)
        }
    }
}
