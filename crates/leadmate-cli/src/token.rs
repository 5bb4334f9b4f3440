use std::path::{Path, PathBuf};

/// Persists the bearer token between CLI invocations — the only client
/// state on disk beyond the config file.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(home: &Path) -> Self {
        Self {
            path: home.join("token"),
        }
    }

    /// The stored token, or `None` when logged out.
    pub fn load(&self) -> Option<String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }

    pub fn save(&self, token: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    /// Delete the stored token (no-op if none exists).
    pub fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
