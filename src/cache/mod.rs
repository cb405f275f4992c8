use anyhow::{Context, Result};
use log::debug;
use schema::{RenderSettings, TurnData};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Cache of rendered PNGs, keyed by everything that affects the pixels
pub struct Cache {
    cache_dir: PathBuf,
}

/// Hex SHA-256 of the renderer version and both inputs in canonical JSON form
pub fn render_key(turn: &TurnData, settings: &RenderSettings) -> Result<String> {
    let turn_json = serde_json::to_vec(turn).context("Failed to serialize turn")?;
    let settings_json = serde_json::to_vec(settings).context("Failed to serialize settings")?;

    let mut hasher = Sha256::new();
    hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
    hasher.update([0]);
    hasher.update(&turn_json);
    hasher.update([0]);
    hasher.update(&settings_json);
    Ok(format!("{:x}", hasher.finalize()))
}

impl Cache {
    /// Create a new cache with the given directory
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();

        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)
                .context("Failed to create cache directory")?;
        }

        Ok(Self { cache_dir })
    }

    /// Returns the cached PNG for a render key, if any
    pub fn get_cached_file(&self, key: &str) -> Option<PathBuf> {
        let file_path = self.get_cache_path(key);
        if file_path.exists() {
            debug!("Cache hit for {}", key);
            Some(file_path)
        } else {
            None
        }
    }

    /// Save an encoded PNG to the cache
    pub fn save_to_cache(&self, key: &str, data: &[u8]) -> Result<PathBuf> {
        let file_path = self.get_cache_path(key);

        let mut file = File::create(&file_path)
            .context("Failed to create cache file")?;
        file.write_all(data)
            .context("Failed to write data to cache file")?;

        Ok(file_path)
    }

    fn get_cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.png", key))
    }

    /// Clear the cache
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)
                .context("Failed to remove cache directory")?;
            fs::create_dir_all(&self.cache_dir)
                .context("Failed to recreate cache directory")?;
        }

        Ok(())
    }
}
