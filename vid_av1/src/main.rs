use clap::Parser;
use shared_utils::{BatchProgress, BatchResult};
use std::path::PathBuf;
use std::time::Instant;
use vid_av1::{convert_video, Av1Outcome, QualityTier, VIDEO_EXTENSIONS};

#[derive(Parser)]
#[command(name = "vid-av1")]
#[command(
    version,
    about = "Convert a video file or tree to AV1 with SVT-AV1, copying already-efficient codecs",
    long_about = None
)]
struct Cli {
    /// Source video file, or directory scanned recursively
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Destination file for a single input, or destination root for a tree
    #[arg(value_name = "DEST")]
    dest: PathBuf,

    /// Quality tier: hq (preset 3, crf 26), mq (preset 8, crf 28),
    /// lq (preset 9, crf 30)
    #[arg(short, long, value_enum, default_value = "mq")]
    quality: QualityTier,

    /// Verbose output and debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = shared_utils::logging::init_logging(
        "vid_av1",
        shared_utils::logging::LogConfig::from_verbosity(cli.verbose),
    );

    if !vid_av1::is_ffmpeg_available() {
        anyhow::bail!("ffmpeg not found on PATH");
    }
    if !shared_utils::is_ffprobe_available() {
        anyhow::bail!("ffprobe not found on PATH");
    }

    if cli.source.is_file() {
        convert_single(&cli)
    } else if cli.source.is_dir() {
        convert_tree(&cli)
    } else {
        eprintln!(
            "❌ Error: source is neither a file nor a directory: {}",
            cli.source.display()
        );
        std::process::exit(1);
    }
}

fn convert_single(cli: &Cli) -> anyhow::Result<()> {
    // A directory destination gets the obvious file name inside it.
    let output = if cli.dest.is_dir() {
        match cli.source.file_name() {
            Some(name) => cli.dest.join(name).with_extension("mkv"),
            None => cli.dest.clone(),
        }
    } else {
        cli.dest.clone()
    };

    println!(
        "🎬 Converting {} (libsvtav1, {}: preset {}, crf {})",
        cli.source.display(),
        cli.quality.label(),
        cli.quality.preset(),
        cli.quality.crf()
    );

    let name = cli
        .source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.source.display().to_string());
    let outcome = convert_video(&cli.source, &output, cli.quality);
    println!("{}", outcome.status_line(&name));

    if matches!(outcome, Av1Outcome::Failed { .. }) {
        std::process::exit(1);
    }
    Ok(())
}

fn convert_tree(cli: &Cli) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let files = shared_utils::collect_files(&cli.source, VIDEO_EXTENSIONS, true);
    let total = files.len();
    if total == 0 {
        println!("📂 No video files found in {}", cli.source.display());
        return Ok(());
    }

    println!("📂 Found {} video files under {}", total, cli.source.display());
    println!(
        "🎬 Encoding sequentially (libsvtav1, {}: preset {}, crf {})",
        cli.quality.label(),
        cli.quality.preset(),
        cli.quality.crf()
    );

    let pb = BatchProgress::new(total as u64, "Encoding");
    let mut result = BatchResult::new();

    for input in &files {
        let name = input
            .strip_prefix(&cli.source)
            .unwrap_or(input)
            .display()
            .to_string();
        pb.set_message(name.clone());

        let outcome = match shared_utils::copier::mirror_path_with_extension(
            input,
            &cli.source,
            &cli.dest,
            "mkv",
        ) {
            Ok(output) => convert_video(input, &output, cli.quality),
            Err(error) => Av1Outcome::Failed {
                error: error.into(),
            },
        };
        pb.println(&outcome.status_line(&name));
        pb.inc();

        match outcome {
            Av1Outcome::Encoded { src_size, out_size } => result.converted(src_size, out_size),
            Av1Outcome::Copied { .. } => result.copied(),
            Av1Outcome::AlreadyModern { .. } | Av1Outcome::Skipped => result.skipped(),
            Av1Outcome::Failed { error } => result.failed(input.clone(), error.to_string()),
        }
    }

    pb.finish_and_clear();
    shared_utils::print_summary_report(&result, start_time.elapsed(), "Video Conversion");

    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
