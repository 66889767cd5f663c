use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::modules::error::StoreError;
use crate::modules::files;
use crate::modules::memory::MemoryStore;
use crate::modules::structure::{ConstructionSite, Structure};
use crate::modules::vm::{Facility, Objective, ResourceNode, World, Worker};

/// Every entity in the world at the end of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub nodes: Vec<ResourceNode>,
    #[serde(default)]
    pub facilities: Vec<Facility>,
    #[serde(default)]
    pub sites: Vec<ConstructionSite>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub structures: Vec<Structure>,
}

impl WorldSnapshot {
    pub fn stamped(mut self) -> Self {
        self.saved_at = Some(Utc::now().to_rfc3339());
        self
    }
}

pub fn snapshot_file_path(dir: &Path) -> PathBuf {
    dir.join("world_snapshot.json")
}

pub fn snapshots_dir(dir: &Path) -> PathBuf {
    dir.join("world_snapshots")
}

pub fn save_world_snapshot(dir: &Path, snapshot: &WorldSnapshot) -> Result<PathBuf, StoreError> {
    let path = snapshot_file_path(dir);
    files::save(&path, snapshot)?;
    Ok(path)
}

/// Writes `world_snapshots/tick_NNNNNN.json` alongside the latest snapshot.
pub fn save_world_snapshot_tick(dir: &Path, snapshot: &WorldSnapshot) -> Result<PathBuf, StoreError> {
    let path = snapshots_dir(dir).join(format!("tick_{:06}.json", snapshot.tick));
    files::save(&path, snapshot)?;
    Ok(path)
}

/// Persists the end of a tick. Memory is only written once the latest snapshot
/// is on disk, so the two never describe different ticks. A failed per-tick
/// history file is logged and skipped.
pub fn save_progress(dir: &Path, world: &World, memory: &MemoryStore) -> Result<PathBuf, StoreError> {
    let snapshot = world.snapshot().stamped();
    let path = save_world_snapshot(dir, &snapshot)?;
    if let Err(err) = save_world_snapshot_tick(dir, &snapshot) {
        warn!(error = %err, tick = snapshot.tick, "failed to write tick snapshot");
    }
    memory.save(dir)?;
    Ok(path)
}

/// Loads the latest snapshot, falling back to the newest per-tick file.
pub fn load_world_snapshot(dir: &Path) -> Result<Option<WorldSnapshot>, StoreError> {
    match files::load(&snapshot_file_path(dir))? {
        Some(snapshot) => Ok(Some(snapshot)),
        None => load_latest_snapshot_from_dir(dir),
    }
}

pub fn load_latest_snapshot_from_dir(dir: &Path) -> Result<Option<WorldSnapshot>, StoreError> {
    let mut latest: Option<PathBuf> = None;
    if let Ok(entries) = fs::read_dir(snapshots_dir(dir)) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                if latest.as_ref().is_none_or(|current| path > *current) {
                    latest = Some(path);
                }
            }
        }
    }

    match latest {
        Some(path) => files::load(&path),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::geometry::Position;
    use crate::modules::memory::{Role, memory_path};

    fn world_at(tick: u64) -> WorldSnapshot {
        let mut world = World::new();
        world.add_node(Position::new(2, 2), 100, 1);
        world.set_tick(tick);
        world.snapshot()
    }

    #[test]
    fn missing_snapshot_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_world_snapshot(dir.path()).unwrap(), None);
    }

    #[test]
    fn saved_snapshot_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = world_at(7).stamped();

        save_world_snapshot(dir.path(), &snapshot).unwrap();
        let loaded = load_world_snapshot(dir.path()).unwrap().unwrap();

        assert_eq!(loaded, snapshot);
        assert!(loaded.saved_at.is_some());
    }

    #[test]
    fn falls_back_to_newest_tick_file() {
        let dir = tempfile::tempdir().unwrap();
        save_world_snapshot_tick(dir.path(), &world_at(3)).unwrap();
        save_world_snapshot_tick(dir.path(), &world_at(12)).unwrap();
        save_world_snapshot_tick(dir.path(), &world_at(9)).unwrap();

        let loaded = load_world_snapshot(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.tick, 12);
        assert!(snapshots_dir(dir.path()).join("tick_000012.json").exists());
    }

    #[test]
    fn progress_saves_snapshot_then_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = World::new();
        world.set_tick(3);
        let mut memory = MemoryStore::default();
        memory.register("h", Role::Harvester);

        let path = save_progress(dir.path(), &world, &memory).unwrap();

        assert_eq!(path, snapshot_file_path(dir.path()));
        assert_eq!(load_world_snapshot(dir.path()).unwrap().unwrap().tick, 3);
        assert!(snapshots_dir(dir.path()).join("tick_000003.json").is_file());
        assert_eq!(MemoryStore::load(dir.path()).unwrap(), memory);
    }

    #[test]
    fn failed_snapshot_leaves_memory_unwritten() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the snapshot file should go makes the write fail.
        fs::create_dir_all(snapshot_file_path(dir.path())).unwrap();
        let mut memory = MemoryStore::default();
        memory.register("h", Role::Harvester);

        let result = save_progress(dir.path(), &World::new(), &memory);

        assert!(result.is_err());
        assert!(!memory_path(dir.path()).exists());
    }
}
