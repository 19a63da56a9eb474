use clap::Parser;
use console::style;
use fs_tools::{diff_trees, index_tree};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tree-diff")]
#[command(
    version,
    about = "Compare two directory trees by relative path, ignoring extensions",
    long_about = None
)]
struct Cli {
    /// Left tree
    #[arg(value_name = "DIR1")]
    left: PathBuf,

    /// Right tree
    #[arg(value_name = "DIR2")]
    right: PathBuf,

    /// Verbose output and debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn print_section(missing_in: &str, found_in: &str, entries: &[(PathBuf, BTreeSet<String>)]) {
    println!();
    println!("=== Missing in {} ===", missing_in);
    if entries.is_empty() {
        println!("None ✅");
        return;
    }
    for (key, exts) in entries {
        let exts = exts.iter().cloned().collect::<Vec<_>>().join(", ");
        println!("{}   (found in {} as: {})", key.display(), found_in, exts);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = shared_utils::logging::init_logging(
        "tree_diff",
        shared_utils::logging::LogConfig::from_verbosity(cli.verbose),
    );

    if !cli.left.is_dir() || !cli.right.is_dir() {
        anyhow::bail!("both arguments must be directories");
    }

    let diff = diff_trees(&index_tree(&cli.left), &index_tree(&cli.right));

    print_section("DIR2", "DIR1", &diff.missing_in_right);
    print_section("DIR1", "DIR2", &diff.missing_in_left);

    println!();
    if diff.is_match() {
        println!(
            "{} Directories match (path-aware, extension ignored)",
            style("✔").green()
        );
    } else {
        println!("{} Directories differ", style("✘").red());
    }

    // Informational tool: differences are findings, not failures.
    Ok(())
}
