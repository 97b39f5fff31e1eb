use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use git_relnotes::config;
use git_relnotes::ui;
use git_relnotes::Scanner;

#[derive(clap::Parser)]
#[command(
    name = "git-relnotes",
    about = "Map release note files to the versions where they first appeared"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, default_value = ".", help = "Path to the repository to scan")]
    repo_root: String,

    #[arg(long, help = "Subdirectory containing the note files")]
    notes_dir: Option<String>,

    #[arg(short, long, help = "Branch to scan (defaults to the current HEAD)")]
    branch: Option<String>,

    #[arg(long, help = "Oldest version to include in the report")]
    earliest_version: Option<String>,

    #[arg(long, help = "Keep alpha/beta/rc versions as their own sections")]
    no_collapse_pre_releases: bool,

    #[arg(long, help = "Scan past the point where the branch left master")]
    no_stop_at_branch_base: bool,

    #[arg(long, help = "Hide the owning commit next to each note file")]
    no_commits: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Diagnostics go to stderr; the report itself is the only stdout output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    if args.version {
        println!("git-relnotes {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration and apply command line overrides
    let mut config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    config.reporoot = args.repo_root.into();
    if let Some(notes_dir) = args.notes_dir {
        config.notes_subdir = notes_dir;
    }
    if args.branch.is_some() {
        config.branch = args.branch;
    }
    if args.earliest_version.is_some() {
        config.earliest_version = args.earliest_version;
    }
    if args.no_collapse_pre_releases {
        config.collapse_pre_releases = false;
    }
    if args.no_stop_at_branch_base {
        config.stop_at_branch_base = false;
    }

    let scanner = match Scanner::new(config) {
        Ok(scanner) => scanner,
        Err(e) => {
            ui::display_error(&format!("Git repository error: {}", e));
            std::process::exit(1);
        }
    };

    let results = match scanner.notes_by_version() {
        Ok(results) => results,
        Err(e) => {
            ui::display_error(&format!("Scan failed: {}", e));
            std::process::exit(1);
        }
    };

    if results.is_empty() {
        ui::display_status("No release notes found");
        return Ok(());
    }

    ui::display_scan_report(&results, !args.no_commits);
    Ok(())
}
