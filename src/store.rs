//! Best-score persistence.
//!
//! One tiny JSON file in the platform data directory. Reads fall back to 0
//! and writes never propagate errors: on save failure the in-memory best
//! stays authoritative for the session, it just may not survive a restart.

use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
struct BestScoreFile {
    best: u32,
}

pub struct ScoreStore {
    path: Option<PathBuf>,
}

impl ScoreStore {
    /// Store under the platform data directory. When that cannot be
    /// resolved the store still works, it just never touches disk.
    pub fn open() -> Self {
        let path = ProjectDirs::from("", "", "gapwing")
            .map(|dirs| dirs.data_dir().join("best_score.json"));
        if path.is_none() {
            warn!("no data directory available; best score will not persist");
        }
        Self { path }
    }

    /// Store backed by an explicit file. Used by tests.
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn load(&self) -> u32 {
        let Some(path) = &self.path else { return 0 };
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<BestScoreFile>(&text) {
                Ok(file) => {
                    debug!("loaded best score {}", file.best);
                    file.best
                }
                Err(e) => {
                    warn!("unreadable best-score file {}: {e}", path.display());
                    0
                }
            },
            // Missing file is the normal first-run case.
            Err(_) => 0,
        }
    }

    pub fn save(&self, best: u32) {
        let Some(path) = &self.path else { return };
        if let Some(dir) = path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("could not create {}: {e}", dir.display());
                return;
            }
        }
        let json = match serde_json::to_string(&BestScoreFile { best }) {
            Ok(json) => json,
            Err(e) => {
                warn!("could not encode best score: {e}");
                return;
            }
        };
        match fs::write(path, json) {
            Ok(()) => debug!("saved best score {best}"),
            Err(e) => warn!("could not save best score: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> (ScoreStore, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "gapwing-{name}-{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        (ScoreStore::at(path.clone()), path)
    }

    #[test]
    fn missing_file_loads_zero() {
        let (store, path) = temp_store("missing");
        assert_eq!(store.load(), 0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn save_then_load_round_trips() {
        let (store, path) = temp_store("roundtrip");
        store.save(12);
        assert_eq!(store.load(), 12);
        store.save(31);
        assert_eq!(store.load(), 31);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_file_loads_zero() {
        let (store, path) = temp_store("corrupt");
        fs::write(&path, "not json at all").unwrap();
        assert_eq!(store.load(), 0);
        let _ = fs::remove_file(path);
    }
}
