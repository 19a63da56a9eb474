//! Guard rails for destructive operations.

use std::path::Path;

const PROTECTED_DIRS: &[&str] = &[
    "/",
    "/System",
    "/usr",
    "/bin",
    "/sbin",
    "/etc",
    "/var",
    "/private",
    "/Library",
    "/Applications",
    "/Users",
    "/home",
    "/root",
    "/boot",
    "/dev",
    "/proc",
    "/sys",
    "/tmp",
    "/opt",
];

/// Refuse to run a delete loop against a system directory or a bare home
/// directory. Returns a user-facing message on refusal.
pub fn check_dangerous_directory(path: &Path) -> Result<(), String> {
    let path_str = path.to_string_lossy();

    for protected in PROTECTED_DIRS {
        if path_str == *protected {
            return Err(format!(
                "refusing to operate on protected system directory '{}'; \
                 pick a specific subdirectory instead",
                protected
            ));
        }
    }

    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let canonical_str = canonical.to_string_lossy();
    if (canonical_str.starts_with("/Users/") || canonical_str.starts_with("/home/"))
        && canonical.components().count() <= 3
    {
        return Err(format!(
            "'{}' is a home directory root; deleting here could touch \
             everything you own. Pick a subdirectory.",
            path.display()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_directories_are_blocked() {
        assert!(check_dangerous_directory(Path::new("/")).is_err());
        assert!(check_dangerous_directory(Path::new("/usr")).is_err());
        assert!(check_dangerous_directory(Path::new("/etc")).is_err());
        assert!(check_dangerous_directory(Path::new("/home")).is_err());
    }

    #[test]
    fn test_nested_directories_are_allowed() {
        assert!(check_dangerous_directory(Path::new("/home/user/photos/2024")).is_ok());
        assert!(check_dangerous_directory(Path::new("/Users/u/Documents/scans")).is_ok());
    }

    #[test]
    fn test_home_root_is_blocked() {
        // Non-existent paths skip canonicalisation but keep their shape.
        assert!(check_dangerous_directory(Path::new("/home/someone")).is_err());
        assert!(check_dangerous_directory(Path::new("/Users/someone")).is_err());
    }
}
