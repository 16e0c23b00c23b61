//! Replay file storage with Zstd compression.
//!
//! Replays are stored as compressed binary files in `{replay_dir}/{hash}.r`.
//! Data is serialized with `bincode` before compression to minimize size.

use crate::error::{LaneJudgeError, Result};
use crate::models::replay::ReplayData;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zstd::stream::{decode_all, encode_all};

/// Zstd level used for replay files.
const COMPRESSION_LEVEL: i32 = 21;

/// Persistence of replay records, keyed by beatmap hash.
pub trait ReplayStore: Send {
    fn store(&self, hash: &str, data: &ReplayData) -> Result<()>;
    fn load(&self, hash: &str) -> Result<ReplayData>;
}

/// Stores one replay file per beatmap hash in a directory.
#[derive(Debug, Clone)]
pub struct FileReplayStore {
    dir: PathBuf,
}

impl FileReplayStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the path for a replay file given its hash.
    pub fn replay_path(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{}.r", hash))
    }

    pub fn exists(&self, hash: &str) -> bool {
        self.replay_path(hash).exists()
    }

    /// Delete a replay file. Missing files are not an error.
    pub fn delete(&self, hash: &str) -> Result<()> {
        let path = self.replay_path(hash);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl ReplayStore for FileReplayStore {
    fn store(&self, hash: &str, data: &ReplayData) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let binary_data = bincode::serde::encode_to_vec(data, bincode::config::standard())?;
        let compressed_data = encode_all(&binary_data[..], COMPRESSION_LEVEL)?;

        let path = self.replay_path(hash);
        let mut file = File::create(&path)?;
        file.write_all(&compressed_data)?;

        log::info!(
            "REPLAY: Saved {} records to {}",
            data.len(),
            path.display()
        );
        Ok(())
    }

    fn load(&self, hash: &str) -> Result<ReplayData> {
        let path = self.replay_path(hash);
        if !path.exists() {
            return Err(LaneJudgeError::ReplayNotFound(hash.to_string()));
        }
        load_replay_from_path(&path)
    }
}

/// Load replay data from a specific path.
pub fn load_replay_from_path(path: &Path) -> Result<ReplayData> {
    let file = File::open(path)?;
    let binary_data = decode_all(file)?;

    let (data, _len): (ReplayData, usize) =
        bincode::serde::decode_from_slice(&binary_data, bincode::config::standard())?;
    Ok(data)
}
