use clap::Parser;
use shared_utils::{BatchProgress, BatchResult};
use std::path::PathBuf;
use std::time::Instant;
use vid_hevc::{process_file, VideoOutcome, VIDEO_EXTENSIONS};

#[derive(Parser)]
#[command(name = "vid-hevc")]
#[command(
    version,
    about = "Convert a video tree to HEVC with NVENC, copying already-efficient codecs",
    long_about = None
)]
struct Cli {
    /// Source directory, scanned recursively
    #[arg(value_name = "SOURCE_DIR")]
    source: PathBuf,

    /// Destination root mirroring the source tree
    #[arg(value_name = "DEST_DIR")]
    dest: PathBuf,

    /// Verbose output and debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = shared_utils::logging::init_logging(
        "vid_hevc",
        shared_utils::logging::LogConfig::from_verbosity(cli.verbose),
    );

    if !vid_hevc::is_ffmpeg_available() {
        anyhow::bail!("ffmpeg not found on PATH");
    }
    if !shared_utils::is_ffprobe_available() {
        anyhow::bail!("ffprobe not found on PATH");
    }

    if !cli.source.is_dir() {
        eprintln!(
            "❌ Error: source is not a directory: {}",
            cli.source.display()
        );
        std::process::exit(1);
    }

    let start_time = Instant::now();
    let files = shared_utils::collect_files(&cli.source, VIDEO_EXTENSIONS, true);
    let total = files.len();
    if total == 0 {
        println!("📂 No video files found in {}", cli.source.display());
        return Ok(());
    }

    println!("📂 Found {} video files under {}", total, cli.source.display());
    println!("🎬 Encoding sequentially (hevc_nvenc, CQ 18)");

    let pb = BatchProgress::new(total as u64, "Encoding");
    let mut result = BatchResult::new();

    for input in &files {
        let name = input
            .strip_prefix(&cli.source)
            .unwrap_or(input)
            .display()
            .to_string();
        pb.set_message(name.clone());

        let outcome = process_file(input, &cli.source, &cli.dest);
        pb.println(&outcome.status_line(&name));
        pb.inc();

        match outcome {
            VideoOutcome::Encoded { src_size, out_size } => result.converted(src_size, out_size),
            VideoOutcome::Copied { .. } => result.copied(),
            VideoOutcome::Skipped => result.skipped(),
            VideoOutcome::Failed { error } => result.failed(input.clone(), error.to_string()),
        }
    }

    pb.finish_and_clear();
    shared_utils::print_summary_report(&result, start_time.elapsed(), "Video Conversion");

    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
