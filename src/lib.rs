pub mod modules;

pub use modules::config::{Annotation, Annotations, BodySpec, DEFAULT_MAX_WORKER_AGE, Settings};
pub use modules::error::StoreError;
pub use modules::files::{DEFAULT_DATA_DIR, default_data_dir};
pub use modules::geometry::{Position, ZONE_SIZE, Zone};
pub use modules::interface::{
    ActionError, Activity, EntityId, Environment, Target, TargetKind, WorkerActions, WorkerId,
    WorkerView, WorldQuery,
};
pub use modules::memory::{MemoryStore, Role, WorkerMemory, WorkerRecord, WorkerState};
pub use modules::roles::{Builder, Context, Harvester, run_worker};
pub use modules::state::{self, RuntimeState, Status};
pub use modules::stats::{
    ActionStats, ActionStatsStore, EconomyStats, load_action_stats, record_tick,
    reset_action_stats, save_action_stats,
};
pub use modules::store::{Energy, ResourceStore};
pub use modules::structure::{ConstructionSite, Structure, StructureKind};
pub use modules::tick::{SpawnedWorker, TickReport, WorkerFault, run_tick, run_tick_with};
pub use modules::view::{
    WorldSnapshot, load_latest_snapshot_from_dir, load_world_snapshot, save_progress,
    save_world_snapshot, save_world_snapshot_tick, snapshot_file_path, snapshots_dir,
};
pub use modules::vm::{
    ActionRejection, Event, Facility, FacilityKind, Intent, Objective, ResourceNode, SpawnError,
    TickResult, World, Worker,
};
pub use modules::world::{SeedSpec, Spread, seed_world};
