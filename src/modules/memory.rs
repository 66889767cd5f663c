//! Persisted per-worker memory: the role and the state-machine state.
//!
//! On disk both fields are plain strings so that hand edits and older files
//! still load. They are validated into [`WorkerMemory`] before the engine sees
//! them; anything unrecognized falls back to the initial state.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::modules::error::StoreError;
use crate::modules::files;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Gathers, delivers and improves.
    Harvester,
    /// A harvester that spends full loads on construction first.
    Builder,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Harvester, Role::Builder];

    pub const fn label(self) -> &'static str {
        match self {
            Role::Harvester => "harvester",
            Role::Builder => "builder",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Harvester
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "harvester" => Ok(Role::Harvester),
            "builder" => Ok(Role::Builder),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Spawning,
    Gathering,
    Delivering,
    Improving,
    Constructing,
}

impl WorkerState {
    pub const fn label(self) -> &'static str {
        match self {
            WorkerState::Spawning => "spawning",
            WorkerState::Gathering => "gathering",
            WorkerState::Delivering => "delivering",
            WorkerState::Improving => "improving",
            WorkerState::Constructing => "constructing",
        }
    }

    /// Whether the state belongs to the state machine of `role`.
    pub const fn valid_for(self, role: Role) -> bool {
        match self {
            WorkerState::Constructing => matches!(role, Role::Builder),
            _ => true,
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WorkerState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spawning" => Ok(WorkerState::Spawning),
            "gathering" => Ok(WorkerState::Gathering),
            "delivering" => Ok(WorkerState::Delivering),
            "improving" => Ok(WorkerState::Improving),
            "constructing" => Ok(WorkerState::Constructing),
            _ => Err(()),
        }
    }
}

/// Validated memory handed to a state machine. `state: None` means uninitialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerMemory {
    pub role: Role,
    pub state: Option<WorkerState>,
}

impl WorkerMemory {
    pub const fn new(role: Role) -> Self {
        Self { role, state: None }
    }

    pub const fn with_state(role: Role, state: WorkerState) -> Self {
        Self {
            role,
            state: Some(state),
        }
    }

    /// The state the machines act on; an uninitialized state reads as spawning.
    pub fn current_state(&self) -> WorkerState {
        self.state.unwrap_or(WorkerState::Spawning)
    }
}

/// Loosely typed memory as stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl WorkerRecord {
    pub fn from_memory(memory: &WorkerMemory) -> Self {
        Self {
            role: Some(memory.role.label().to_string()),
            state: memory.state.map(|s| s.label().to_string()),
        }
    }

    /// Validates the record. `fallback_role` applies when no role is recorded or
    /// the recorded one is unknown; a state that is unknown or foreign to the
    /// role resets to spawning.
    pub fn validate(&self, name: &str, fallback_role: Role) -> WorkerMemory {
        let role = match self.role.as_deref() {
            None => fallback_role,
            Some(raw) => raw.parse::<Role>().unwrap_or_else(|_| {
                warn!(worker = name, role = raw, "unknown role in memory; using {}", fallback_role);
                fallback_role
            }),
        };

        let state = self.state.as_deref().map(|raw| {
            match raw.parse::<WorkerState>() {
                Ok(state) if state.valid_for(role) => state,
                _ => {
                    warn!(worker = name, state = raw, %role, "invalid state in memory; resetting to spawning");
                    WorkerState::Spawning
                }
            }
        });

        WorkerMemory { role, state }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    pub workers: BTreeMap<String, WorkerRecord>,
}

pub fn memory_path(dir: &Path) -> PathBuf {
    dir.join("memory.json")
}

impl MemoryStore {
    pub fn load(dir: &Path) -> Result<Self, StoreError> {
        files::load_or_default(&memory_path(dir))
    }

    pub fn save(&self, dir: &Path) -> Result<(), StoreError> {
        files::save(&memory_path(dir), self)
    }

    /// Validated memory for `name`, creating an uninitialized record when absent.
    pub fn memory_for(&mut self, name: &str, role: Role) -> WorkerMemory {
        let record = self
            .workers
            .entry(name.to_string())
            .or_insert_with(|| WorkerRecord::from_memory(&WorkerMemory::new(role)));
        record.validate(name, role)
    }

    pub fn store(&mut self, name: &str, memory: &WorkerMemory) {
        self.workers
            .insert(name.to_string(), WorkerRecord::from_memory(memory));
    }

    /// Records a freshly spawned worker with its role and no state yet.
    pub fn register(&mut self, name: &str, role: Role) {
        self.store(name, &WorkerMemory::new(role));
    }

    pub fn forget(&mut self, name: &str) -> bool {
        self.workers.remove(name).is_some()
    }

    /// Drops records of workers that no longer exist; returns the reclaimed names.
    pub fn reclaim<F>(&mut self, mut is_alive: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let dead: Vec<String> = self
            .workers
            .keys()
            .filter(|name| !is_alive(name))
            .cloned()
            .collect();
        for name in &dead {
            self.workers.remove(name);
            info!(worker = %name, "reclaimed memory of missing worker");
        }
        dead
    }
}
