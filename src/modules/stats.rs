use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::error::StoreError;
use crate::modules::files;
use crate::modules::interface::WorkerId;
use crate::modules::memory::Role;
use crate::modules::store::Energy;
use crate::modules::vm::{GATHER_PER_WORK, Intent, TickResult, World};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    pub gather_count: u64,
    pub transfer_count: u64,
    pub improve_count: u64,
    pub build_count: u64,
    pub move_count: u64,
    pub idle_count: u64,
}

impl ActionStats {
    pub fn record(&mut self, intent: &Intent) {
        let counter = match intent {
            Intent::Gather { .. } => &mut self.gather_count,
            Intent::Transfer { .. } => &mut self.transfer_count,
            Intent::Improve { .. } => &mut self.improve_count,
            Intent::Build { .. } => &mut self.build_count,
            Intent::Move { .. } => &mut self.move_count,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn record_idle(&mut self) {
        self.idle_count = self.idle_count.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        self.gather_count
            + self.transfer_count
            + self.improve_count
            + self.build_count
            + self.move_count
            + self.idle_count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStatsStore {
    pub per_worker: BTreeMap<WorkerId, ActionStats>,
}

impl ActionStatsStore {
    pub fn totals(&self) -> ActionStats {
        self.per_worker
            .values()
            .fold(ActionStats::default(), |mut acc, stats| {
                acc.gather_count += stats.gather_count;
                acc.transfer_count += stats.transfer_count;
                acc.improve_count += stats.improve_count;
                acc.build_count += stats.build_count;
                acc.move_count += stats.move_count;
                acc.idle_count += stats.idle_count;
                acc
            })
    }
}

pub fn stats_path(dir: &Path) -> PathBuf {
    dir.join("action_stats.json")
}

pub fn reset_action_stats(dir: &Path) -> Result<(), StoreError> {
    save_action_stats(dir, &ActionStatsStore::default())
}

pub fn load_action_stats(dir: &Path) -> Result<ActionStatsStore, StoreError> {
    files::load_or_default(&stats_path(dir))
}

pub fn save_action_stats(dir: &Path, store: &ActionStatsStore) -> Result<(), StoreError> {
    files::save(&stats_path(dir), store)
}

/// Counts applied intents per worker. Workers in `deciding` with nothing applied count as idle.
pub fn record_tick(
    store: &mut ActionStatsStore,
    deciding: &[WorkerId],
    queued: &[Intent],
    result: &TickResult,
) {
    let mut acted = BTreeSet::new();
    for intent in queued {
        if result.rejections.iter().any(|r| r.intent == *intent) {
            continue;
        }
        acted.insert(intent.worker());
        store.per_worker.entry(intent.worker()).or_default().record(intent);
    }

    for worker in deciding.iter().filter(|id| !acted.contains(*id)) {
        store.per_worker.entry(*worker).or_default().record_idle();
    }
}

/// Energy flow estimates for the zone economy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyStats {
    /// What the generic workers could gather per tick if they all gathered.
    pub harvest_per_tick: Energy,
    /// What the resource nodes regenerate per tick, bounded by their headroom.
    pub recovery_per_tick: Energy,
}

impl EconomyStats {
    pub fn measure(world: &World) -> Self {
        let harvest_per_tick = world
            .workers()
            .filter(|w| w.role == Role::Harvester)
            .map(|w| w.work_parts.saturating_mul(GATHER_PER_WORK))
            .sum();
        let recovery_per_tick = world
            .nodes()
            .iter()
            .map(|n| n.regen_per_tick.min(n.capacity.saturating_sub(n.current)))
            .sum();
        Self {
            harvest_per_tick,
            recovery_per_tick,
        }
    }
}
