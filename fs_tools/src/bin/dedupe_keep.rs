use clap::Parser;
use console::style;
use fs_tools::{find_redundant, normalize_keep_extension};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dedupe-keep")]
#[command(
    version,
    about = "Delete files shadowed by a same-stem sibling in the kept format",
    long_about = None
)]
struct Cli {
    /// Directory to scan recursively
    #[arg(value_name = "DIR")]
    target: PathBuf,

    /// Extension that marks the copy to keep
    #[arg(short, long, value_name = "EXT", default_value = ".jxl")]
    keep: String,

    /// Actually delete; the default is a dry run that only prints
    #[arg(long)]
    delete: bool,

    /// Verbose output and debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = shared_utils::logging::init_logging(
        "dedupe_keep",
        shared_utils::logging::LogConfig::from_verbosity(cli.verbose),
    );

    if !cli.target.is_dir() {
        anyhow::bail!("directory not found: {}", cli.target.display());
    }
    if let Err(reason) = shared_utils::check_dangerous_directory(&cli.target) {
        anyhow::bail!(reason);
    }

    let keep = normalize_keep_extension(&cli.keep);
    if keep.is_empty() {
        anyhow::bail!("--keep needs an extension, e.g. --keep .jxl");
    }

    println!("📂 Scanning recursively: {}", cli.target.display());
    let candidates = find_redundant(&cli.target, &keep);

    if candidates.is_empty() {
        println!(
            "✅ Nothing to clean: no stem has both a .{} copy and leftovers",
            keep
        );
        return Ok(());
    }

    let mut deleted = 0usize;
    let mut failed = 0usize;
    for path in &candidates {
        if cli.delete {
            match std::fs::remove_file(path) {
                Ok(()) => {
                    println!("{} {}", style("[DELETED]").red(), path.display());
                    deleted += 1;
                }
                Err(error) => {
                    eprintln!(
                        "{} could not delete {}: {}",
                        style("[ERROR]").red().bold(),
                        path.display(),
                        error
                    );
                    failed += 1;
                }
            }
        } else {
            println!(
                "{} would delete: {}",
                style("[DRY RUN]").yellow(),
                path.display()
            );
        }
    }

    if cli.delete {
        println!("♻️ Cleanup complete. Deleted {} files.", deleted);
        if failed > 0 {
            anyhow::bail!("{} files could not be deleted", failed);
        }
    } else {
        println!(
            "📌 Dry run: {} files would be deleted. Re-run with --delete to remove them.",
            candidates.len()
        );
    }
    Ok(())
}
