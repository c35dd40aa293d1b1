use clap::Parser;
use clipsort::cli::{RunPaths, run_cli_with_config};
use clipsort::output::OutputFormatter;
use std::path::PathBuf;

/// Relocate note clippings from an inbox into a categorized archive tree,
/// driven by a declarative manifest.
#[derive(Parser)]
#[command(name = "clipsort", version, about)]
struct Args {
    /// Manifest file mapping note filenames to categories
    #[arg(default_value = "categorize_all.txt")]
    manifest: PathBuf,

    /// Inbox directory containing the unorganized notes
    #[arg(long, default_value = "Clippings")]
    inbox: PathBuf,

    /// Archive root directory the category tree lives under
    #[arg(long, default_value = "Archives")]
    archive: PathBuf,

    /// Resolve matches and print planned placements without moving anything
    #[arg(long)]
    dry_run: bool,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let paths = RunPaths {
        manifest: args.manifest,
        inbox: args.inbox,
        archive_root: args.archive,
    };

    if let Err(e) = run_cli_with_config(&paths, args.dry_run, args.config.as_deref()) {
        OutputFormatter::error(&e);
        std::process::exit(1);
    }
}
