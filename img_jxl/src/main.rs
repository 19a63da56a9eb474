use clap::Parser;
use img_jxl::config::{CONVERT_EXTENSIONS, PASSTHROUGH_EXTENSIONS};
use img_jxl::{
    convert_file, normalize_copy_extensions, Cjxl, Config, ConflictPolicy, ConversionRequest,
    FileOutcome, Prompter, QualityFloor, TerminalPrompter,
};
use rayon::prelude::*;
use shared_utils::{BatchProgress, BatchResult, ThreadPlan};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Set by the Ctrl-C handler; in-flight files finish, no new ones start.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[derive(Parser)]
#[command(name = "img-jxl")]
#[command(
    version,
    about = "Convert an image tree to JPEG XL, keeping only outputs that save space",
    long_about = None
)]
struct Cli {
    /// Source directory, scanned recursively
    #[arg(value_name = "SOURCE_DIR")]
    source: PathBuf,

    /// Destination root mirroring the source tree
    #[arg(value_name = "DEST_DIR")]
    dest: PathBuf,

    /// Persist encoder output even when it is not smaller than the source
    #[arg(long = "force-jxl")]
    force_jxl: bool,

    /// Copy files with this extension verbatim instead of converting (repeatable)
    #[arg(long = "copy", value_name = "EXT")]
    copy: Vec<String>,

    /// cjxl effort, 1 (fast) to 9 (small)
    #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u8).range(1..=9))]
    effort: u8,

    /// Overwrite existing destination files without asking
    #[arg(long, conflicts_with = "skip")]
    overwrite: bool,

    /// Skip files whose destination already exists
    #[arg(long)]
    skip: bool,

    /// Allow the quality search to step down to 85
    #[arg(long = "compress-hq", group = "floor")]
    compress_hq: bool,

    /// Allow the quality search to step down to 80
    #[arg(long = "compress-mq", group = "floor")]
    compress_mq: bool,

    /// Allow the quality search to step down to 75
    #[arg(long = "compress-lq", group = "floor")]
    compress_lq: bool,

    /// Number of files converted in parallel
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    jobs: Option<usize>,

    /// Verbose output and debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn conflict_policy(&self) -> ConflictPolicy {
        if self.overwrite {
            ConflictPolicy::AlwaysOverwrite
        } else if self.skip {
            ConflictPolicy::AlwaysSkip
        } else {
            ConflictPolicy::Prompt
        }
    }

    fn quality_floor(&self) -> QualityFloor {
        if self.compress_hq {
            QualityFloor::Hq
        } else if self.compress_mq {
            QualityFloor::Mq
        } else if self.compress_lq {
            QualityFloor::Lq
        } else {
            QualityFloor::Default
        }
    }
}

/// Routes overwrite questions through the progress bar so the prompt and
/// the redraw never interleave.
struct SuspendingPrompter<'a> {
    progress: &'a BatchProgress,
    inner: TerminalPrompter,
}

impl Prompter for SuspendingPrompter<'_> {
    fn confirm_overwrite(&self, dest: &Path) -> io::Result<bool> {
        self.progress.suspend(|| self.inner.confirm_overwrite(dest))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = shared_utils::logging::init_logging(
        "img_jxl",
        shared_utils::logging::LogConfig::from_verbosity(cli.verbose),
    );

    let encoder = Cjxl::ensure_available()
        .map_err(|e| anyhow::anyhow!("{} (install libjxl to get cjxl)", e))?;
    if !shared_utils::metadata::is_exiftool_available() {
        eprintln!("⚠️  exiftool not found: embedded tags will not be propagated");
    }

    if !cli.source.is_dir() {
        eprintln!(
            "❌ Error: source is not a directory: {}",
            cli.source.display()
        );
        std::process::exit(1);
    }

    let plan = shared_utils::plan_image_workers(cli.jobs);
    let config = Config {
        effort: cli.effort,
        force_output: cli.force_jxl,
        conflict: cli.conflict_policy(),
        floor: cli.quality_floor(),
        copy_extensions: normalize_copy_extensions(&cli.copy),
        encoder_threads: plan.encoder_threads,
        verbose: cli.verbose,
    };

    ctrlc::set_handler(|| {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        eprintln!("\n🛑 Interrupt received: finishing in-flight files (press again to abort)");
    })?;

    run_batch(&encoder, &cli.source, &cli.dest, &config, plan)
}

fn run_batch(
    encoder: &Cjxl,
    src_root: &Path,
    dst_root: &Path,
    config: &Config,
    plan: ThreadPlan,
) -> anyhow::Result<()> {
    let start_time = Instant::now();

    // Enumerate everything the run will touch: convertibles, passthrough
    // formats, and any user-requested copy extensions.
    let mut extensions: Vec<&str> = Vec::new();
    extensions.extend_from_slice(CONVERT_EXTENSIONS);
    extensions.extend_from_slice(PASSTHROUGH_EXTENSIONS);
    extensions.extend(config.copy_extensions.iter().map(|s| s.as_str()));

    let files = shared_utils::collect_files(src_root, &extensions, true);
    let total = files.len();
    if total == 0 {
        println!("📂 No image files found in {}", src_root.display());
        return Ok(());
    }

    println!("📂 Found {} files under {}", total, src_root.display());
    if config.verbose {
        println!(
            "🔧 Thread Strategy: {} parallel files x {} encoder threads (CPU cores: {})",
            plan.workers,
            plan.encoder_threads,
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        );
        println!(
            "⚙️  Effort: {} | Quality floor: {}",
            config.effort,
            config.quality_floor()
        );
    }
    match config.conflict {
        ConflictPolicy::AlwaysOverwrite => println!("♻️  Existing outputs will be overwritten"),
        ConflictPolicy::AlwaysSkip => println!("⏭️  Existing outputs will be skipped"),
        ConflictPolicy::Prompt => {}
    }
    if config.force_output {
        println!("📌 Force mode: outputs are persisted even when they are not smaller");
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(plan.workers)
        .build()
        .or_else(|_| rayon::ThreadPoolBuilder::new().num_threads(2).build())
        .map_err(|e| anyhow::anyhow!("failed to create thread pool: {}", e))?;

    let pb = BatchProgress::new(total as u64, "Converting");
    let prompter = SuspendingPrompter {
        progress: &pb,
        inner: TerminalPrompter,
    };

    // None marks a file the interrupt left unprocessed.
    let outcomes: Vec<(PathBuf, Option<FileOutcome>)> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                if INTERRUPTED.load(Ordering::SeqCst) {
                    return (path.clone(), None);
                }

                let req = ConversionRequest {
                    input: path,
                    src_root,
                    dst_root,
                };
                let outcome = convert_file(encoder, &req, config, &prompter);

                let name = path
                    .strip_prefix(src_root)
                    .unwrap_or(path)
                    .display()
                    .to_string();
                pb.println(&outcome.status_line(&name));
                pb.set_message(name);
                pb.inc();

                (path.clone(), Some(outcome))
            })
            .collect()
    });

    pb.finish_and_clear();

    let mut result = BatchResult::new();
    let mut unprocessed = 0usize;
    for (path, outcome) in &outcomes {
        match outcome {
            Some(FileOutcome::Converted {
                src_size, out_size, ..
            }) => result.converted(*src_size, *out_size),
            Some(FileOutcome::Forced {
                src_size, out_size, ..
            }) => result.forced(*src_size, *out_size),
            Some(FileOutcome::Copied { .. }) => result.copied(),
            Some(FileOutcome::Skipped) => result.skipped(),
            Some(FileOutcome::Failed { error, .. }) => {
                result.failed(path.clone(), error.to_string())
            }
            None => unprocessed += 1,
        }
    }

    shared_utils::print_summary_report(&result, start_time.elapsed(), "Image Conversion");

    if unprocessed > 0 {
        eprintln!(
            "🛑 Interrupted: {} of {} files were not processed",
            unprocessed, total
        );
    }
    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
