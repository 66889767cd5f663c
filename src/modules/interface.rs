//! The seam between the decision engine and whatever world it runs in.
//!
//! The engine only ever reads the world through [`WorldQuery`] and changes it
//! through [`WorkerActions`]. The simulated world in `vm` implements both, and
//! tests implement them with scripted fixtures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::geometry::{Position, Zone};
use crate::modules::store::ResourceStore;

pub type WorkerId = u64;
pub type EntityId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    ResourceNode,
    Facility,
    ConstructionSite,
    Objective,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TargetKind::ResourceNode => "resource node",
            TargetKind::Facility => "facility",
            TargetKind::ConstructionSite => "construction site",
            TargetKind::Objective => "objective",
        };
        f.write_str(label)
    }
}

/// Something a worker can move to and act on. Only valid for the tick it was queried in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub id: EntityId,
    pub kind: TargetKind,
    pub position: Position,
}

/// What a query is scoped to: the zone the worker stands in, and the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Environment {
    pub zone: Zone,
    pub tick: u64,
}

/// The engine's read-only view of the worker being decided for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerView {
    pub id: WorkerId,
    pub position: Position,
    pub store: ResourceStore,
}

/// The four terminal actions a worker can take on a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Gather,
    Deliver,
    Improve,
    Build,
}

impl Activity {
    pub const fn label(self) -> &'static str {
        match self {
            Activity::Gather => "gather",
            Activity::Deliver => "deliver",
            Activity::Improve => "improve",
            Activity::Build => "build",
        }
    }

    /// Interaction range for the activity, in tiles.
    pub const fn range(self) -> u32 {
        match self {
            Activity::Gather | Activity::Deliver => 1,
            Activity::Improve | Activity::Build => 3,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("worker {0} not found")]
    WorkerNotFound(WorkerId),
    #[error("worker {worker} already acted this tick")]
    AlreadyActed { worker: WorkerId },
    #[error("{kind} {id} not found")]
    TargetNotFound { kind: TargetKind, id: EntityId },
    #[error("cannot {activity} a {kind}")]
    WrongTarget { activity: Activity, kind: TargetKind },
    #[error("worker {worker} is {distance} tiles from {kind} {id} (needs {range})")]
    NotInRange {
        worker: WorkerId,
        kind: TargetKind,
        id: EntityId,
        distance: u32,
        range: u32,
    },
    #[error("worker {worker} store is full")]
    StoreFull { worker: WorkerId },
    #[error("worker {worker} store is empty")]
    StoreEmpty { worker: WorkerId },
    #[error("facility {id} has no free capacity")]
    TargetFull { id: EntityId },
    #[error("resource node {id} is depleted")]
    NodeDepleted { id: EntityId },
}

impl ActionError {
    pub const fn is_not_in_range(&self) -> bool {
        matches!(self, ActionError::NotInRange { .. })
    }
}

/// Read side of the world.
pub trait WorldQuery {
    /// Closest resource node in the environment that still has yield.
    fn nearest_resource_node(&self, env: &Environment, from: Position) -> Option<Target>;

    /// Facilities that can accept a delivery, nearest first.
    fn delivery_targets(&self, env: &Environment, from: Position) -> Vec<Target>;

    /// Unfinished construction sites, nearest first.
    fn construction_tasks(&self, env: &Environment, from: Position) -> Vec<Target>;

    fn improvement_objective(&self, env: &Environment) -> Option<Target>;
}

/// Write side of the world. Each call either queues the action or says why it cannot.
pub trait WorkerActions {
    fn gather(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError>;

    fn transfer(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError>;

    fn improve(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError>;

    fn build(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError>;

    /// Step toward `target`. `route_colour` is a debug annotation with no effect on movement.
    fn move_toward(&mut self, worker: WorkerId, target: &Target, route_colour: Option<&str>);

    /// Debug hook for announcing a state change.
    fn say(&mut self, _worker: WorkerId, _text: &str) {}
}
