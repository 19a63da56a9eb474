//! Per-file conversion pipeline.
//!
//! Order of business for each file: classify, resolve the destination,
//! run the quality search, then decide between persisting the encoder
//! output and retaining the original. Every failure is folded into the
//! returned outcome so one bad file never stops the batch.

use crate::config::{classify, Config, FileClass, ImageKind};
use crate::conflict::{resolve_destination, Prompter, Resolution};
use crate::decode::decode_to_png;
use crate::encoder::{EncodeParams, EncoderInput, JxlEncoder};
use crate::error::{ConvertError, Result};
use crate::strategy::{strategies_for, Strategy};
use console::style;
use shared_utils::{copier, metadata};
use std::path::Path;

/// Where the search starts, and the only quality at which the bit-exact
/// JPEG transcode is attempted.
pub const INITIAL_QUALITY: u8 = 90;
const QUALITY_STEP: u8 = 5;

/// One file's coordinates within the batch.
pub struct ConversionRequest<'a> {
    pub input: &'a Path,
    pub src_root: &'a Path,
    pub dst_root: &'a Path,
}

/// Terminal state of one file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Encoder output was smaller than the source and was written.
    Converted {
        method: String,
        src_size: u64,
        out_size: u64,
    },
    /// Output was not smaller but force mode persisted it anyway.
    Forced {
        method: String,
        src_size: u64,
        out_size: u64,
    },
    /// Destination conflict resolved to leaving the existing file alone.
    Skipped,
    /// Source mirrored verbatim into the destination tree.
    Copied { reason: &'static str },
    /// Conversion failed; `retained` records whether the original was
    /// copied across as a consolation.
    Failed {
        error: ConvertError,
        retained: bool,
    },
}

impl FileOutcome {
    /// Size change relative to the source. Positive means the output
    /// is smaller.
    pub fn delta_percent(&self) -> Option<f64> {
        match self {
            FileOutcome::Converted {
                src_size, out_size, ..
            }
            | FileOutcome::Forced {
                src_size, out_size, ..
            } => {
                if *src_size == 0 {
                    Some(0.0)
                } else {
                    Some((*src_size as f64 - *out_size as f64) / *src_size as f64 * 100.0)
                }
            }
            _ => None,
        }
    }

    /// One line for the batch log.
    pub fn status_line(&self, name: &str) -> String {
        match self {
            FileOutcome::Converted { method, .. } => format!(
                "{} {} ({:+.1}%) [{}]",
                style("[OK]").green().bold(),
                name,
                self.delta_percent().unwrap_or(0.0),
                method
            ),
            FileOutcome::Forced { method, .. } => format!(
                "{} {} ({:+.1}%) [{}]",
                style("[FORCED]").yellow().bold(),
                name,
                self.delta_percent().unwrap_or(0.0),
                method
            ),
            FileOutcome::Skipped => {
                format!("{} {} (already exists)", style("[SKIP]").dim(), name)
            }
            FileOutcome::Copied { reason } => {
                format!("{} {} ({})", style("[COPY]").cyan(), name, reason)
            }
            FileOutcome::Failed { error, retained } => {
                let mut line = format!("{} {}: {}", style("[ERROR]").red().bold(), name, error);
                if *retained {
                    line.push_str(" (original copied)");
                }
                line
            }
        }
    }
}

/// Accepted result of one encode attempt.
struct Attempt {
    bytes: Vec<u8>,
    method: String,
}

fn params(cfg: &Config, quality: Option<u8>) -> EncodeParams {
    EncodeParams {
        quality,
        effort: cfg.effort,
        threads: cfg.encoder_threads,
    }
}

/// Decode once, then reuse the PNG bytes across every quality step.
fn fallback_attempt(
    encoder: &dyn JxlEncoder,
    input: &Path,
    cfg: &Config,
    quality: u8,
    decoded: &mut Option<Vec<u8>>,
    method_prefix: &str,
) -> Result<Attempt> {
    let png: &Vec<u8> = match decoded {
        Some(png) => png,
        None => decoded.insert(decode_to_png(input)?),
    };
    let bytes = encoder.encode(EncoderInput::Memory(png), &params(cfg, Some(quality)))?;
    Ok(Attempt {
        bytes,
        method: format!("{}-Q{}", method_prefix, quality),
    })
}

/// Produce output at one quality, burning through the strategy chain.
/// Encoder failures fall through to the next strategy and finally to the
/// decode-ourselves fallback; decode failures are terminal immediately.
fn attempt_at(
    encoder: &dyn JxlEncoder,
    input: &Path,
    kind: ImageKind,
    cfg: &Config,
    quality: u8,
    decoded: &mut Option<Vec<u8>>,
) -> Result<Attempt> {
    let mut last_failure: Option<String> = None;

    for strategy in strategies_for(kind, quality) {
        let result = match strategy {
            Strategy::LosslessTranscode => encoder
                .encode(EncoderInput::File(input), &params(cfg, None))
                .map(|bytes| Attempt {
                    bytes,
                    method: "JPEG-Transcode".to_string(),
                }),
            Strategy::QualityReencode => {
                let method = match kind {
                    ImageKind::Jpeg => format!("JPEG-ReEncode-Q{}", quality),
                    _ => format!("Direct-CJXL-Q{}", quality),
                };
                encoder
                    .encode(EncoderInput::File(input), &params(cfg, Some(quality)))
                    .map(|bytes| Attempt { bytes, method })
            }
            Strategy::FallbackDecodeEncode => {
                return fallback_attempt(encoder, input, cfg, quality, decoded, "HEIC-Decode");
            }
        };

        match result {
            Ok(attempt) => return Ok(attempt),
            Err(ConvertError::EncodeFailure(msg)) => {
                tracing::debug!(
                    input = %input.display(),
                    quality,
                    error = %msg,
                    "direct strategy failed, trying next"
                );
                last_failure = Some(msg);
            }
            Err(other) => return Err(other),
        }
    }

    // Every direct strategy refused this file. Decode it ourselves and
    // stream the pixels instead.
    match fallback_attempt(encoder, input, cfg, quality, decoded, "Fallback-Decode") {
        Ok(attempt) => Ok(attempt),
        Err(ConvertError::EncodeFailure(fallback)) => {
            let primary =
                last_failure.unwrap_or_else(|| "no direct strategy applied".to_string());
            Err(ConvertError::EncodeFailure(format!(
                "primary: {}; fallback: {}",
                primary, fallback
            )))
        }
        Err(other) => Err(other),
    }
}

/// Step quality down from [`INITIAL_QUALITY`] until the output beats the
/// source size or the configured floor is reached. The floor attempt is
/// final whatever its size; what happens to it is the caller's decision.
fn run_search(
    encoder: &dyn JxlEncoder,
    input: &Path,
    kind: ImageKind,
    cfg: &Config,
    src_size: u64,
) -> Result<Attempt> {
    let floor = cfg.quality_floor();
    let mut quality = INITIAL_QUALITY;
    let mut decoded: Option<Vec<u8>> = None;

    loop {
        let attempt = attempt_at(encoder, input, kind, cfg, quality, &mut decoded)?;
        if (attempt.bytes.len() as u64) < src_size {
            return Ok(attempt);
        }
        if quality > floor {
            tracing::debug!(
                input = %input.display(),
                quality,
                produced = attempt.bytes.len(),
                source = src_size,
                "not smaller, stepping quality down"
            );
            quality -= QUALITY_STEP;
        } else {
            return Ok(attempt);
        }
    }
}

fn retain_outcome(req: &ConversionRequest<'_>, reason: &'static str) -> FileOutcome {
    match copier::retain_original(req.input, req.src_root, req.dst_root) {
        Ok(_) => FileOutcome::Copied { reason },
        Err(e) => FileOutcome::Failed {
            error: ConvertError::Io(e),
            retained: false,
        },
    }
}

fn write_output(dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, bytes)
}

fn persist_or_retain(
    req: &ConversionRequest<'_>,
    cfg: &Config,
    dest: &Path,
    attempt: Attempt,
    src_size: u64,
) -> FileOutcome {
    let out_size = attempt.bytes.len() as u64;
    let smaller = out_size < src_size;

    if !smaller && !cfg.force_output {
        return retain_outcome(req, "output not smaller");
    }

    if let Err(e) = write_output(dest, &attempt.bytes) {
        return FileOutcome::Failed {
            error: ConvertError::Io(e),
            retained: false,
        };
    }
    metadata::propagate(req.input, dest);

    if smaller {
        FileOutcome::Converted {
            method: attempt.method,
            src_size,
            out_size,
        }
    } else {
        FileOutcome::Forced {
            method: attempt.method,
            src_size,
            out_size,
        }
    }
}

fn convert_image(
    encoder: &dyn JxlEncoder,
    req: &ConversionRequest<'_>,
    cfg: &Config,
    prompter: &dyn Prompter,
    kind: ImageKind,
) -> FileOutcome {
    let dest =
        match copier::mirror_path_with_extension(req.input, req.src_root, req.dst_root, "jxl") {
            Ok(dest) => dest,
            Err(e) => {
                return FileOutcome::Failed {
                    error: ConvertError::Io(e),
                    retained: false,
                }
            }
        };

    match resolve_destination(&dest, cfg.conflict, prompter) {
        Ok(Resolution::Proceed) => {}
        Ok(Resolution::Skip) => return FileOutcome::Skipped,
        Err(e) => {
            return FileOutcome::Failed {
                error: ConvertError::Io(e),
                retained: false,
            }
        }
    }

    let src_size = match std::fs::metadata(req.input) {
        Ok(meta) => meta.len(),
        Err(e) => {
            return FileOutcome::Failed {
                error: ConvertError::Io(e),
                retained: false,
            }
        }
    };

    match run_search(encoder, req.input, kind, cfg, src_size) {
        Ok(attempt) => persist_or_retain(req, cfg, &dest, attempt, src_size),
        Err(error) => {
            let retained = !cfg.force_output
                && copier::retain_original(req.input, req.src_root, req.dst_root).is_ok();
            FileOutcome::Failed { error, retained }
        }
    }
}

/// Run one file through the whole pipeline. Infallible by construction:
/// errors become [`FileOutcome::Failed`] and the batch moves on.
pub fn convert_file(
    encoder: &dyn JxlEncoder,
    req: &ConversionRequest<'_>,
    cfg: &Config,
    prompter: &dyn Prompter,
) -> FileOutcome {
    match classify(req.input, &cfg.copy_extensions) {
        FileClass::ExplicitCopy => retain_outcome(req, "requested copy"),
        FileClass::Passthrough => retain_outcome(req, "unsupported format"),
        FileClass::Unknown => {
            tracing::debug!(input = %req.input.display(), "unrecognized extension, ignoring");
            FileOutcome::Skipped
        }
        FileClass::Convert(kind) => convert_image(encoder, req, cfg, prompter, kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{normalize_copy_extensions, QualityFloor};
    use crate::conflict::ConflictPolicy;
    use std::collections::{BTreeSet, VecDeque};
    use std::io;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    enum Step {
        Produce(Vec<u8>),
        FailEncode(&'static str),
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        from_memory: bool,
        quality: Option<u8>,
        effort: u8,
        threads: usize,
    }

    struct ScriptedEncoder {
        script: Mutex<VecDeque<Step>>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedEncoder {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                script: Mutex::new(steps.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl JxlEncoder for ScriptedEncoder {
        fn encode(&self, input: EncoderInput<'_>, params: &EncodeParams) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(Call {
                from_memory: matches!(input, EncoderInput::Memory(_)),
                quality: params.quality,
                effort: params.effort,
                threads: params.threads,
            });
            match self.script.lock().unwrap().pop_front() {
                Some(Step::Produce(bytes)) => Ok(bytes),
                Some(Step::FailEncode(msg)) => Err(ConvertError::EncodeFailure(msg.to_string())),
                None => panic!("encoder invoked more times than scripted"),
            }
        }
    }

    /// Panics if consulted; used where the prompt must stay untouched.
    struct NoPrompt;

    impl Prompter for NoPrompt {
        fn confirm_overwrite(&self, dest: &Path) -> io::Result<bool> {
            panic!("unexpected prompt for {}", dest.display());
        }
    }

    struct AnswerPrompt(bool);

    impl Prompter for AnswerPrompt {
        fn confirm_overwrite(&self, _dest: &Path) -> io::Result<bool> {
            Ok(self.0)
        }
    }

    struct Tree {
        _temp: TempDir,
        src_root: PathBuf,
        dst_root: PathBuf,
    }

    fn tree() -> Tree {
        let temp = TempDir::new().unwrap();
        let src_root = temp.path().join("in");
        let dst_root = temp.path().join("out");
        std::fs::create_dir_all(&src_root).unwrap();
        std::fs::create_dir_all(&dst_root).unwrap();
        Tree {
            _temp: temp,
            src_root,
            dst_root,
        }
    }

    fn write_source(tree: &Tree, name: &str, bytes: &[u8]) -> PathBuf {
        let path = tree.src_root.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn request<'a>(input: &'a Path, tree: &'a Tree) -> ConversionRequest<'a> {
        ConversionRequest {
            input,
            src_root: &tree.src_root,
            dst_root: &tree.dst_root,
        }
    }

    fn test_config(floor: QualityFloor) -> Config {
        Config {
            effort: 7,
            force_output: false,
            conflict: ConflictPolicy::Prompt,
            floor,
            copy_extensions: BTreeSet::new(),
            encoder_threads: 2,
            verbose: false,
        }
    }

    #[test]
    fn test_jpeg_success_at_initial_quality_is_one_invocation() {
        let tree = tree();
        let input = write_source(&tree, "photo.jpg", &[0u8; 1000]);
        let encoder = ScriptedEncoder::new(vec![Step::Produce(vec![1u8; 400])]);
        let cfg = test_config(QualityFloor::Lq);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Converted {
                method,
                src_size,
                out_size,
            } => {
                assert_eq!(method, "JPEG-Transcode");
                assert_eq!(*src_size, 1000);
                assert_eq!(*out_size, 400);
            }
            other => panic!("expected Converted, got {:?}", other),
        }
        let calls = encoder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].quality, None);
        assert_eq!(
            std::fs::read(tree.dst_root.join("photo.jxl")).unwrap(),
            vec![1u8; 400]
        );
    }

    #[test]
    fn test_raster_success_at_initial_quality() {
        let tree = tree();
        let input = write_source(&tree, "art.png", &[0u8; 1000]);
        let encoder = ScriptedEncoder::new(vec![Step::Produce(vec![2u8; 500])]);
        let cfg = test_config(QualityFloor::Mq);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Converted { method, .. } => assert_eq!(method, "Direct-CJXL-Q90"),
            other => panic!("expected Converted, got {:?}", other),
        }
        let calls = encoder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].quality, Some(90));
    }

    #[test]
    fn test_jpeg_walkthrough_lossless_fails_then_search_lands_at_q85() {
        let tree = tree();
        let input = write_source(&tree, "big.jpg", &vec![0u8; 2_000_000]);
        let encoder = ScriptedEncoder::new(vec![
            Step::FailEncode("bitstream reconstruction data unavailable"),
            Step::Produce(vec![0u8; 2_100_000]),
            Step::Produce(vec![0u8; 1_900_000]),
        ]);
        let cfg = test_config(QualityFloor::Lq);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Converted {
                method,
                src_size,
                out_size,
            } => {
                assert_eq!(method, "JPEG-ReEncode-Q85");
                assert_eq!(*src_size, 2_000_000);
                assert_eq!(*out_size, 1_900_000);
            }
            other => panic!("expected Converted, got {:?}", other),
        }
        assert!((outcome.delta_percent().unwrap() - 5.0).abs() < 0.01);
        assert!(outcome.status_line("big.jpg").contains("+5.0%"));

        let qualities: Vec<_> = encoder.calls().iter().map(|c| c.quality).collect();
        assert_eq!(qualities, vec![None, Some(90), Some(85)]);
    }

    #[test]
    fn test_floor_is_never_crossed() {
        let tree = tree();
        let input = write_source(&tree, "photo.png", &vec![0u8; 1000]);
        let encoder = ScriptedEncoder::new(vec![
            Step::Produce(vec![0u8; 1500]),
            Step::Produce(vec![0u8; 1200]),
        ]);
        let cfg = test_config(QualityFloor::Hq);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Copied { reason } => assert_eq!(*reason, "output not smaller"),
            other => panic!("expected Copied, got {:?}", other),
        }
        let qualities: Vec<_> = encoder.calls().iter().map(|c| c.quality).collect();
        assert_eq!(qualities, vec![Some(90), Some(85)]);
        assert!(!tree.dst_root.join("photo.jxl").exists());
        assert_eq!(
            std::fs::read(tree.dst_root.join("photo.png")).unwrap(),
            vec![0u8; 1000]
        );
    }

    #[test]
    fn test_total_encode_failure_retains_original() {
        let tree = tree();
        let input = tree.src_root.join("real.png");
        image::RgbImage::from_pixel(8, 8, image::Rgb([1, 2, 3]))
            .save(&input)
            .unwrap();
        let original = std::fs::read(&input).unwrap();

        let encoder = ScriptedEncoder::new(vec![
            Step::FailEncode("direct path rejected"),
            Step::FailEncode("stdin path rejected"),
        ]);
        let cfg = test_config(QualityFloor::Default);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Failed {
                error: ConvertError::EncodeFailure(msg),
                retained,
            } => {
                assert!(msg.contains("primary: direct path rejected"));
                assert!(msg.contains("fallback: stdin path rejected"));
                assert!(*retained);
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        let calls = encoder.calls();
        assert_eq!(calls.len(), 2);
        assert!(!calls[0].from_memory);
        assert!(calls[1].from_memory);
        assert!(!tree.dst_root.join("real.jxl").exists());
        assert_eq!(std::fs::read(tree.dst_root.join("real.png")).unwrap(), original);
    }

    #[test]
    fn test_corrupt_heic_is_retained_with_its_own_extension() {
        let tree = tree();
        let input = write_source(&tree, "broken.heic", b"not actually heif");
        let encoder = ScriptedEncoder::new(vec![]);
        let cfg = test_config(QualityFloor::Lq);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Failed {
                error: ConvertError::DecodeFailure(_),
                retained,
            } => assert!(*retained),
            other => panic!("expected DecodeFailure, got {:?}", other),
        }
        assert!(encoder.calls().is_empty());
        assert!(!tree.dst_root.join("broken.jxl").exists());
        assert_eq!(
            std::fs::read(tree.dst_root.join("broken.heic")).unwrap(),
            b"not actually heif"
        );
    }

    #[test]
    fn test_decode_failure_after_direct_failure_stays_a_decode_failure() {
        let tree = tree();
        let input = write_source(&tree, "torn.png", b"png header missing");
        let encoder = ScriptedEncoder::new(vec![Step::FailEncode("cjxl cannot read this")]);
        let cfg = test_config(QualityFloor::Default);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Failed {
                error: ConvertError::DecodeFailure(_),
                retained: true,
            } => {}
            other => panic!("expected retained DecodeFailure, got {:?}", other),
        }
        assert_eq!(encoder.calls().len(), 1);
    }

    #[test]
    fn test_force_persists_floor_attempt_even_when_larger() {
        let tree = tree();
        let input = write_source(&tree, "stubborn.png", &vec![9u8; 1000]);
        let encoder = ScriptedEncoder::new(vec![
            Step::Produce(vec![1u8; 1500]),
            Step::Produce(vec![2u8; 1400]),
            Step::Produce(vec![3u8; 1300]),
        ]);
        let mut cfg = test_config(QualityFloor::Mq);
        cfg.force_output = true;

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Forced {
                method,
                src_size,
                out_size,
            } => {
                assert_eq!(method, "Direct-CJXL-Q80");
                assert_eq!(*src_size, 1000);
                assert_eq!(*out_size, 1300);
            }
            other => panic!("expected Forced, got {:?}", other),
        }
        assert_eq!(
            std::fs::read(tree.dst_root.join("stubborn.jxl")).unwrap(),
            vec![3u8; 1300]
        );
        assert!((outcome.delta_percent().unwrap() + 30.0).abs() < 0.01);
        assert!(outcome.status_line("stubborn.png").contains("-30.0%"));
    }

    #[test]
    fn test_always_skip_never_invokes_the_encoder() {
        let tree = tree();
        let input = write_source(&tree, "seen.jpg", &[1u8; 100]);
        std::fs::write(tree.dst_root.join("seen.jxl"), b"from a previous run").unwrap();

        let encoder = ScriptedEncoder::new(vec![]);
        let mut cfg = test_config(QualityFloor::Lq);
        cfg.conflict = ConflictPolicy::AlwaysSkip;

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        assert!(matches!(outcome, FileOutcome::Skipped));
        assert!(encoder.calls().is_empty());
        assert_eq!(
            std::fs::read(tree.dst_root.join("seen.jxl")).unwrap(),
            b"from a previous run"
        );
    }

    #[test]
    fn test_zero_byte_destination_is_replaced_even_under_skip_policy() {
        let tree = tree();
        let input = write_source(&tree, "redo.jpg", &[1u8; 1000]);
        std::fs::write(tree.dst_root.join("redo.jxl"), b"").unwrap();

        let encoder = ScriptedEncoder::new(vec![Step::Produce(vec![7u8; 300])]);
        let mut cfg = test_config(QualityFloor::Lq);
        cfg.conflict = ConflictPolicy::AlwaysSkip;

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        assert!(matches!(outcome, FileOutcome::Converted { .. }));
        assert_eq!(
            std::fs::read(tree.dst_root.join("redo.jxl")).unwrap(),
            vec![7u8; 300]
        );
    }

    #[test]
    fn test_equal_size_output_is_not_persisted() {
        let tree = tree();
        let input = write_source(&tree, "tie.png", &vec![0u8; 800]);
        let encoder = ScriptedEncoder::new(vec![
            Step::Produce(vec![0u8; 800]),
            Step::Produce(vec![0u8; 800]),
            Step::Produce(vec![0u8; 800]),
            Step::Produce(vec![0u8; 800]),
        ]);
        let cfg = test_config(QualityFloor::Lq);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Copied { reason } => assert_eq!(*reason, "output not smaller"),
            other => panic!("expected Copied, got {:?}", other),
        }
        assert_eq!(encoder.calls().len(), 4);
        assert!(!tree.dst_root.join("tie.jxl").exists());
    }

    #[test]
    fn test_prompt_decides_overwrite() {
        let tree = tree();
        let input = write_source(&tree, "ask.jpg", &[1u8; 1000]);
        std::fs::write(tree.dst_root.join("ask.jxl"), b"old output").unwrap();
        let cfg = test_config(QualityFloor::Lq);

        let declined = convert_file(
            &ScriptedEncoder::new(vec![]),
            &request(&input, &tree),
            &cfg,
            &AnswerPrompt(false),
        );
        assert!(matches!(declined, FileOutcome::Skipped));
        assert_eq!(
            std::fs::read(tree.dst_root.join("ask.jxl")).unwrap(),
            b"old output"
        );

        let encoder = ScriptedEncoder::new(vec![Step::Produce(vec![5u8; 200])]);
        let accepted = convert_file(&encoder, &request(&input, &tree), &cfg, &AnswerPrompt(true));
        assert!(matches!(accepted, FileOutcome::Converted { .. }));
        assert_eq!(
            std::fs::read(tree.dst_root.join("ask.jxl")).unwrap(),
            vec![5u8; 200]
        );
    }

    #[test]
    fn test_explicit_copy_extension_bypasses_conversion() {
        let tree = tree();
        let input = write_source(&tree, "keep.png", &[3u8; 50]);
        let encoder = ScriptedEncoder::new(vec![]);
        let mut cfg = test_config(QualityFloor::Lq);
        cfg.copy_extensions = normalize_copy_extensions(["png"]);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Copied { reason } => assert_eq!(*reason, "requested copy"),
            other => panic!("expected Copied, got {:?}", other),
        }
        assert!(encoder.calls().is_empty());
        assert_eq!(std::fs::read(tree.dst_root.join("keep.png")).unwrap(), [3u8; 50]);
    }

    #[test]
    fn test_unconvertible_formats_are_mirrored() {
        let tree = tree();
        let input = write_source(&tree, "anim.gif", &[4u8; 60]);
        let encoder = ScriptedEncoder::new(vec![]);
        let cfg = test_config(QualityFloor::Lq);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Copied { reason } => assert_eq!(*reason, "unsupported format"),
            other => panic!("expected Copied, got {:?}", other),
        }
        assert!(encoder.calls().is_empty());
        assert_eq!(std::fs::read(tree.dst_root.join("anim.gif")).unwrap(), [4u8; 60]);
    }

    #[test]
    fn test_fallback_rescues_a_direct_failure() {
        let tree = tree();
        let input = tree.src_root.join("odd.png");
        image::RgbImage::from_pixel(6, 6, image::Rgb([9, 9, 9]))
            .save(&input)
            .unwrap();
        let src_size = std::fs::metadata(&input).unwrap().len();

        let smaller = vec![1u8; (src_size / 2) as usize];
        let encoder = ScriptedEncoder::new(vec![
            Step::FailEncode("unreadable by cjxl"),
            Step::Produce(smaller.clone()),
        ]);
        let cfg = test_config(QualityFloor::Default);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        match &outcome {
            FileOutcome::Converted { method, .. } => assert_eq!(method, "Fallback-Decode-Q90"),
            other => panic!("expected Converted, got {:?}", other),
        }
        let calls = encoder.calls();
        assert!(!calls[0].from_memory);
        assert!(calls[1].from_memory);
        assert_eq!(calls[1].quality, Some(90));
        assert_eq!(std::fs::read(tree.dst_root.join("odd.jxl")).unwrap(), smaller);
    }

    #[test]
    fn test_fallback_decode_feeds_every_quality_step() {
        let tree = tree();
        let input = tree.src_root.join("odd2.png");
        image::RgbImage::from_pixel(5, 5, image::Rgb([20, 40, 60]))
            .save(&input)
            .unwrap();

        let encoder = ScriptedEncoder::new(vec![
            Step::FailEncode("direct refused"),
            Step::Produce(vec![1u8; 5000]),
            Step::FailEncode("direct refused"),
            Step::Produce(vec![1u8; 4000]),
        ]);
        let cfg = test_config(QualityFloor::Hq);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        assert!(matches!(outcome, FileOutcome::Copied { .. }));
        let pattern: Vec<_> = encoder
            .calls()
            .iter()
            .map(|c| (c.from_memory, c.quality))
            .collect();
        assert_eq!(
            pattern,
            vec![
                (false, Some(90)),
                (true, Some(90)),
                (false, Some(85)),
                (true, Some(85)),
            ]
        );
    }

    #[test]
    fn test_encoder_receives_effort_and_thread_hints() {
        let tree = tree();
        let input = write_source(&tree, "p.jpg", &[0u8; 100]);
        let encoder = ScriptedEncoder::new(vec![Step::Produce(vec![1u8; 10])]);
        let mut cfg = test_config(QualityFloor::Default);
        cfg.effort = 9;
        cfg.encoder_threads = 3;

        convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        let call = &encoder.calls()[0];
        assert_eq!(call.effort, 9);
        assert_eq!(call.threads, 3);
    }

    #[test]
    fn test_nested_sources_mirror_their_subtree() {
        let tree = tree();
        std::fs::create_dir_all(tree.src_root.join("2023/trip")).unwrap();
        let input = tree.src_root.join("2023/trip/beach.jpg");
        std::fs::write(&input, vec![0u8; 500]).unwrap();

        let encoder = ScriptedEncoder::new(vec![Step::Produce(vec![1u8; 100])]);
        let cfg = test_config(QualityFloor::Default);

        let outcome = convert_file(&encoder, &request(&input, &tree), &cfg, &NoPrompt);

        assert!(matches!(outcome, FileOutcome::Converted { .. }));
        assert!(tree.dst_root.join("2023/trip/beach.jxl").exists());
    }

    #[test]
    fn test_status_lines_carry_method_and_delta() {
        let converted = FileOutcome::Converted {
            method: "JPEG-Transcode".to_string(),
            src_size: 1000,
            out_size: 800,
        };
        let line = converted.status_line("a.jpg");
        assert!(line.contains("[OK]"));
        assert!(line.contains("+20.0%"));
        assert!(line.contains("[JPEG-Transcode]"));

        let failed = FileOutcome::Failed {
            error: ConvertError::DecodeFailure("bad header".to_string()),
            retained: true,
        };
        let line = failed.status_line("b.heic");
        assert!(line.contains("[ERROR]"));
        assert!(line.contains("bad header"));
        assert!(line.contains("original copied"));

        let skipped = FileOutcome::Skipped.status_line("c.jpg");
        assert!(skipped.contains("[SKIP]"));
        assert!(skipped.contains("already exists"));
    }
}
