//! Destination conflict handling.
//!
//! Resolved before any encoding work starts, so a skip costs nothing.

use dialoguer::Confirm;
use std::io;
use std::path::Path;
use std::sync::Mutex;

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Ask per file.
    Prompt,
    AlwaysOverwrite,
    AlwaysSkip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Proceed,
    Skip,
}

/// Seam for the interactive question; tests script the answers.
pub trait Prompter: Sync {
    fn confirm_overwrite(&self, dest: &Path) -> io::Result<bool>;
}

/// Workers prompt one at a time so questions never interleave.
static PROMPT_LOCK: Mutex<()> = Mutex::new(());

pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm_overwrite(&self, dest: &Path) -> io::Result<bool> {
        let _guard = PROMPT_LOCK.lock().unwrap();
        Confirm::new()
            .with_prompt(format!("Overwrite {}?", dest.display()))
            .default(false)
            .interact()
    }
}

/// Decide whether the pipeline may write `dest`.
///
/// A zero-byte destination is treated as debris from an interrupted run:
/// it is deleted and conversion proceeds under every policy.
pub fn resolve_destination(
    dest: &Path,
    policy: ConflictPolicy,
    prompter: &dyn Prompter,
) -> io::Result<Resolution> {
    let meta = match std::fs::metadata(dest) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Resolution::Proceed),
        Err(e) => return Err(e),
    };

    if meta.len() == 0 {
        tracing::debug!("removing stale zero-byte destination {}", dest.display());
        std::fs::remove_file(dest)?;
        return Ok(Resolution::Proceed);
    }

    match policy {
        ConflictPolicy::AlwaysSkip => Ok(Resolution::Skip),
        ConflictPolicy::AlwaysOverwrite => Ok(Resolution::Proceed),
        ConflictPolicy::Prompt => match prompter.confirm_overwrite(dest) {
            Ok(true) => Ok(Resolution::Proceed),
            Ok(false) => Ok(Resolution::Skip),
            Err(e) => {
                tracing::warn!(
                    "cannot prompt for {} ({}), skipping instead",
                    dest.display(),
                    e
                );
                Ok(Resolution::Skip)
            }
        },
    }
}
