//! cjxl process invocation.
//!
//! One call here is exactly one external `cjxl` process. Retry and quality
//! stepping live in the search loop, never down here.

use crate::error::{ConvertError, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

static CJXL: OnceLock<Option<PathBuf>> = OnceLock::new();

fn cjxl_path() -> Option<&'static Path> {
    CJXL.get_or_init(|| which::which("cjxl").ok()).as_deref()
}

/// Settings for one invocation. `quality: None` requests the bit-exact
/// JPEG transcode; `Some(q)` a lossy re-encode at that quality.
#[derive(Debug, Clone, Copy)]
pub struct EncodeParams {
    pub quality: Option<u8>,
    pub effort: u8,
    pub threads: usize,
}

/// Where the source pixels come from.
#[derive(Debug, Clone, Copy)]
pub enum EncoderInput<'a> {
    /// Let cjxl read the file itself.
    File(&'a Path),
    /// Stream an already-decoded image (PNG bytes) over stdin.
    Memory(&'a [u8]),
}

/// Seam for the pipeline; tests substitute a scripted implementation.
pub trait JxlEncoder: Sync {
    fn encode(&self, input: EncoderInput<'_>, params: &EncodeParams) -> Result<Vec<u8>>;
}

/// The real encoder, backed by the `cjxl` binary on PATH.
pub struct Cjxl;

impl Cjxl {
    /// Fails fast if `cjxl` is not installed, so the batch never starts
    /// a run it cannot finish.
    pub fn ensure_available() -> Result<Self> {
        match cjxl_path() {
            Some(_) => Ok(Cjxl),
            None => Err(ConvertError::ToolNotFound("cjxl".to_string())),
        }
    }
}

fn build_args(input: &EncoderInput<'_>, params: &EncodeParams) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(8);
    match input {
        EncoderInput::File(path) => args.push(path.as_os_str().to_os_string()),
        EncoderInput::Memory(_) => args.push("-".into()),
    }
    // Output always goes to stdout so nothing lands on disk until the
    // outcome decision says it should.
    args.push("-".into());
    match params.quality {
        None => args.push("--lossless_jpeg=1".into()),
        Some(q) => {
            args.push("--quality".into());
            args.push(q.to_string().into());
            args.push("--lossless_jpeg=0".into());
        }
    }
    args.push("--num_threads".into());
    args.push(params.threads.to_string().into());
    args.push("--effort".into());
    args.push(params.effort.to_string().into());
    args
}

fn stderr_tail(stderr: &[u8]) -> String {
    const KEEP: usize = 400;
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.len() <= KEEP {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - KEEP;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    format!("... {}", &trimmed[start..])
}

impl JxlEncoder for Cjxl {
    fn encode(&self, input: EncoderInput<'_>, params: &EncodeParams) -> Result<Vec<u8>> {
        let program = cjxl_path().ok_or_else(|| ConvertError::ToolNotFound("cjxl".to_string()))?;

        let mut cmd = Command::new(program);
        cmd.args(build_args(&input, params))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.stdin(match input {
            EncoderInput::File(_) => Stdio::null(),
            EncoderInput::Memory(_) => Stdio::piped(),
        });

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConvertError::ToolNotFound("cjxl".to_string())
            } else {
                ConvertError::Io(e)
            }
        })?;

        let output = match input {
            EncoderInput::Memory(data) => {
                let mut stdin = child.stdin.take().ok_or_else(|| {
                    ConvertError::EncodeFailure("cjxl stdin was not captured".to_string())
                })?;
                std::thread::scope(|scope| {
                    scope.spawn(move || {
                        // cjxl may stop reading early; the exit status below
                        // is what decides success.
                        let _ = stdin.write_all(data);
                    });
                    child.wait_with_output()
                })?
            }
            EncoderInput::File(_) => child.wait_with_output()?,
        };

        if !output.status.success() {
            return Err(ConvertError::EncodeFailure(stderr_tail(&output.stderr)));
        }
        if output.stdout.is_empty() {
            return Err(ConvertError::EncodeFailure(
                "cjxl exited cleanly but produced no output".to_string(),
            ));
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_lossless_transcode_args() {
        let params = EncodeParams {
            quality: None,
            effort: 7,
            threads: 2,
        };
        let args = build_args(&EncoderInput::File(Path::new("/tmp/a.jpg")), &params);
        assert_eq!(
            to_strings(&args),
            [
                "/tmp/a.jpg",
                "-",
                "--lossless_jpeg=1",
                "--num_threads",
                "2",
                "--effort",
                "7"
            ]
        );
    }

    #[test]
    fn test_lossy_args_disable_jpeg_passthrough() {
        let params = EncodeParams {
            quality: Some(85),
            effort: 9,
            threads: 4,
        };
        let args = build_args(&EncoderInput::File(Path::new("in.png")), &params);
        assert_eq!(
            to_strings(&args),
            [
                "in.png",
                "-",
                "--quality",
                "85",
                "--lossless_jpeg=0",
                "--num_threads",
                "4",
                "--effort",
                "9"
            ]
        );
    }

    #[test]
    fn test_memory_input_streams_both_ends() {
        let params = EncodeParams {
            quality: Some(90),
            effort: 7,
            threads: 1,
        };
        let data = [0u8; 4];
        let args = build_args(&EncoderInput::Memory(&data), &params);
        let strings = to_strings(&args);
        assert_eq!(strings[0], "-");
        assert_eq!(strings[1], "-");
    }

    #[test]
    fn test_stderr_tail_short_message_passes_through() {
        assert_eq!(stderr_tail(b"  boom  \n"), "boom");
    }

    #[test]
    fn test_stderr_tail_truncates_long_output() {
        let long = "x".repeat(1000);
        let tail = stderr_tail(long.as_bytes());
        assert!(tail.starts_with("... "));
        assert_eq!(tail.len(), 404);
    }
}
