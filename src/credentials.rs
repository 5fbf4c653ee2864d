//! API key loading.
//!
//! The key lives in a plain-text file and is read once per run.

use crate::error::{Result, XploreError};
use std::path::PathBuf;
use tracing::{debug, info};

/// Default key file: `api-keys/ieee.key` relative to the working directory
pub const DEFAULT_KEY_FILE: &str = "api-keys/ieee.key";

/// Reads the API key from disk
pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the key, trimmed of surrounding whitespace.
    pub fn load(&self) -> Result<String> {
        debug!("Reading API key from {:?}", self.path);
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            XploreError::Config(format!("Cannot read API key file {:?}: {}", self.path, e))
        })?;

        let key = content.trim();
        if key.is_empty() {
            return Err(XploreError::Config(format!("API key file {:?} is empty", self.path)));
        }

        info!("Loaded API key from {:?}", self.path);
        Ok(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file() {
        let key_file = KeyFile::new("/nonexistent/ieee.key");
        assert!(matches!(key_file.load(), Err(XploreError::Config(_))));
    }

    #[test]
    fn test_key_is_trimmed() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        writeln!(temp, "  abc123xyz \n")?;

        let key_file = KeyFile::new(temp.path());
        assert_eq!(key_file.load()?, "abc123xyz");
        Ok(())
    }

    #[test]
    fn test_blank_file_rejected() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        writeln!(temp, "   ")?;
        assert!(KeyFile::new(temp.path()).load().is_err());
        Ok(())
    }
}
