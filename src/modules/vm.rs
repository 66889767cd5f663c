use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::modules::config::BodySpec;
use crate::modules::geometry::Position;
use crate::modules::interface::{
    ActionError, Activity, EntityId, Environment, Target, TargetKind, WorkerActions, WorkerId,
    WorkerView, WorldQuery,
};
use crate::modules::memory::Role;
use crate::modules::store::{Energy, ResourceStore};
use crate::modules::structure::{ConstructionSite, Structure, StructureKind};
use crate::modules::targets::{nearest, sort_nearest_first};
use crate::modules::view::WorldSnapshot;

/// Energy gathered per work part per gather action.
pub const GATHER_PER_WORK: Energy = 2;
/// Build progress per work part per build action.
pub const BUILD_PER_WORK: Energy = 5;
/// Objective progress per work part per improve action.
pub const IMPROVE_PER_WORK: Energy = 1;
pub const SPAWN_CAPACITY: Energy = 300;
pub const EXTENSION_CAPACITY: Energy = 50;
/// Energy a spawn regains on its own each tick while below capacity.
pub const SPAWN_REGEN_PER_TICK: Energy = 1;
/// Objective progress needed per level unless configured otherwise.
pub const DEFAULT_PROGRESS_PER_LEVEL: Energy = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub role: Role,
    pub position: Position,
    pub store: ResourceStore,
    pub work_parts: u32,
    pub age: u64,
    pub max_age: u64,
}

impl Worker {
    pub fn view(&self) -> WorkerView {
        WorkerView {
            id: self.id,
            position: self.position,
            store: self.store,
        }
    }

    /// The environment this worker perceives during `tick`.
    pub fn environment(&self, tick: u64) -> Environment {
        Environment {
            zone: self.position.zone(),
            tick,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: EntityId,
    pub position: Position,
    pub capacity: Energy,
    pub current: Energy,
    pub regen_per_tick: Energy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityKind {
    Spawn,
    Extension,
}

impl FacilityKind {
    pub const fn capacity(self) -> Energy {
        match self {
            FacilityKind::Spawn => SPAWN_CAPACITY,
            FacilityKind::Extension => EXTENSION_CAPACITY,
        }
    }

    pub const fn regen_per_tick(self) -> Energy {
        match self {
            FacilityKind::Spawn => SPAWN_REGEN_PER_TICK,
            FacilityKind::Extension => 0,
        }
    }
}

/// A structure that consumes deliveries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: EntityId,
    pub kind: FacilityKind,
    pub position: Position,
    pub store: ResourceStore,
}

/// The long-running sink for surplus energy, one per zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: EntityId,
    pub position: Position,
    pub level: u32,
    pub progress: Energy,
    pub progress_per_level: Energy,
}

/// A queued world action. Applied in order at the end of the tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Gather { worker: WorkerId, node: EntityId },
    Transfer { worker: WorkerId, facility: EntityId },
    Improve { worker: WorkerId, objective: EntityId },
    Build { worker: WorkerId, site: EntityId },
    Move { worker: WorkerId, to: Position },
}

impl Intent {
    pub const fn worker(&self) -> WorkerId {
        match *self {
            Intent::Gather { worker, .. }
            | Intent::Transfer { worker, .. }
            | Intent::Improve { worker, .. }
            | Intent::Build { worker, .. }
            | Intent::Move { worker, .. } => worker,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Intent::Gather { .. } => "gather",
            Intent::Transfer { .. } => "transfer",
            Intent::Improve { .. } => "improve",
            Intent::Build { .. } => "build",
            Intent::Move { .. } => "move",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    TickStarted {
        tick: u64,
    },
    TickCompleted {
        tick: u64,
    },
    WorkerSaid {
        worker: WorkerId,
        text: String,
    },
    WorkerMoved {
        worker: WorkerId,
        from: Position,
        to: Position,
    },
    Gathered {
        worker: WorkerId,
        node: EntityId,
        amount: Energy,
        remaining: Energy,
    },
    NodeDrained {
        node: EntityId,
        position: Position,
    },
    Delivered {
        worker: WorkerId,
        facility: EntityId,
        amount: Energy,
    },
    Improved {
        worker: WorkerId,
        objective: EntityId,
        amount: Energy,
    },
    ObjectiveLevelled {
        objective: EntityId,
        level: u32,
    },
    Built {
        worker: WorkerId,
        site: EntityId,
        amount: Energy,
        progress: Energy,
    },
    StructureCompleted {
        site: EntityId,
        structure: EntityId,
        kind: StructureKind,
        position: Position,
    },
    WorkerRetired {
        worker: WorkerId,
        name: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRejection {
    pub intent: Intent,
    pub error: ActionError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickResult {
    pub tick: u64,
    pub events: Vec<Event>,
    pub rejections: Vec<ActionRejection>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error("no spawn facility in the world")]
    NoSpawn,
    #[error("spawn needs {required} energy, best spawn holds {available}")]
    InsufficientEnergy { required: Energy, available: Energy },
}

#[derive(Debug)]
pub struct World {
    tick: u64,
    next_worker_id: WorkerId,
    next_entity_id: EntityId,
    workers: BTreeMap<WorkerId, Worker>,
    nodes: Vec<ResourceNode>,
    facilities: Vec<Facility>,
    sites: Vec<ConstructionSite>,
    objectives: Vec<Objective>,
    structures: Vec<Structure>,
    pending: Vec<Intent>,
    announcements: Vec<Event>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            tick: 0,
            next_worker_id: 1,
            next_entity_id: 1,
            workers: BTreeMap::new(),
            nodes: Vec::new(),
            facilities: Vec::new(),
            sites: Vec::new(),
            objectives: Vec::new(),
            structures: Vec::new(),
            pending: Vec::new(),
            announcements: Vec::new(),
        }
    }

    /// Last completed tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers.values()
    }

    pub fn worker(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.get(&id)
    }

    pub fn worker_by_name(&self, name: &str) -> Option<&Worker> {
        self.workers.values().find(|w| w.name == name)
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn sites(&self) -> &[ConstructionSite] {
        &self.sites
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    /// Intents queued for the tick in progress.
    pub fn pending(&self) -> &[Intent] {
        &self.pending
    }

    fn next_entity(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    pub fn add_node(&mut self, position: Position, capacity: Energy, regen_per_tick: Energy) -> EntityId {
        let id = self.next_entity();
        self.nodes.push(ResourceNode {
            id,
            position,
            capacity,
            current: capacity,
            regen_per_tick,
        });
        id
    }

    pub fn add_facility(&mut self, kind: FacilityKind, position: Position) -> EntityId {
        let id = self.next_entity();
        self.facilities.push(Facility {
            id,
            kind,
            position,
            store: ResourceStore::empty(kind.capacity()),
        });
        id
    }

    /// Adds energy to a facility directly, returning how much fit.
    pub fn refill_facility(&mut self, id: EntityId, amount: Energy) -> Result<Energy, ActionError> {
        self.facilities
            .iter_mut()
            .find(|f| f.id == id)
            .map(|f| f.store.deposit(amount))
            .ok_or(ActionError::TargetNotFound {
                kind: TargetKind::Facility,
                id,
            })
    }

    pub fn add_site(&mut self, kind: StructureKind, position: Position) -> EntityId {
        let id = self.next_entity();
        self.sites.push(ConstructionSite::new(id, kind, position));
        id
    }

    pub fn add_objective(&mut self, position: Position, progress_per_level: Energy) -> EntityId {
        let id = self.next_entity();
        self.objectives.push(Objective {
            id,
            position,
            level: 0,
            progress: 0,
            progress_per_level: progress_per_level.max(1),
        });
        id
    }

    pub fn spawn_worker(
        &mut self,
        name: impl Into<String>,
        role: Role,
        position: Position,
        body: &BodySpec,
        max_age: u64,
    ) -> WorkerId {
        let id = self.next_worker_id;
        self.next_worker_id += 1;
        let worker = Worker {
            id,
            name: name.into(),
            role,
            position,
            store: ResourceStore::empty(body.carry_capacity),
            work_parts: body.work_parts,
            age: 0,
            max_age: max_age.max(1),
        };
        debug!(worker = id, name = %worker.name, %role, %position, "worker spawned");
        self.workers.insert(id, worker);
        id
    }

    /// Spawns a worker next to the first spawn facility that can pay for its body.
    pub fn spawn_from_facility(
        &mut self,
        name: impl Into<String>,
        role: Role,
        body: &BodySpec,
        max_age: u64,
    ) -> Result<WorkerId, SpawnError> {
        let cost = body.cost();
        let spawns: Vec<usize> = self
            .facilities
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind == FacilityKind::Spawn)
            .map(|(index, _)| index)
            .collect();
        if spawns.is_empty() {
            return Err(SpawnError::NoSpawn);
        }

        let Some(index) = spawns
            .iter()
            .copied()
            .find(|&index| self.facilities[index].store.used() >= cost)
        else {
            let available = spawns
                .iter()
                .map(|&index| self.facilities[index].store.used())
                .max()
                .unwrap_or(0);
            return Err(SpawnError::InsufficientEnergy {
                required: cost,
                available,
            });
        };

        let spawn = &mut self.facilities[index];
        spawn.store.withdraw(cost);
        let position = spawn.position.offset(0, 1);
        Ok(self.spawn_worker(name, role, position, body, max_age))
    }

    pub fn kill_worker(&mut self, id: WorkerId) -> Result<Worker, ActionError> {
        self.pending.retain(|intent| intent.worker() != id);
        self.workers.remove(&id).ok_or(ActionError::WorkerNotFound(id))
    }

    /// Resolves the tick: regenerates nodes and spawns, applies queued intents in order,
    /// finishes completed sites and retires workers past their lifespan.
    pub fn step(&mut self) -> TickResult {
        let tick = self.tick + 1;
        let mut events = vec![Event::TickStarted { tick }];
        events.append(&mut self.announcements);
        let mut rejections = Vec::new();

        self.regenerate();

        for intent in std::mem::take(&mut self.pending) {
            match self.apply(intent) {
                Ok(mut applied) => events.append(&mut applied),
                Err(error) => {
                    debug!(worker = intent.worker(), action = intent.label(), %error, "intent rejected");
                    rejections.push(ActionRejection { intent, error });
                }
            }
        }

        events.append(&mut self.complete_sites(tick));
        events.append(&mut self.age_workers());
        events.push(Event::TickCompleted { tick });

        self.tick = tick;
        TickResult {
            tick,
            events,
            rejections,
        }
    }

    fn regenerate(&mut self) {
        for node in &mut self.nodes {
            node.current = node
                .current
                .saturating_add(node.regen_per_tick)
                .min(node.capacity);
        }
        for facility in &mut self.facilities {
            facility.store.deposit(facility.kind.regen_per_tick());
        }
    }

    fn queue(&mut self, intent: Intent) -> Result<(), ActionError> {
        let worker = intent.worker();
        if self.pending.iter().any(|queued| queued.worker() == worker) {
            return Err(ActionError::AlreadyActed { worker });
        }
        self.validate(&intent)?;
        self.pending.push(intent);
        Ok(())
    }

    /// Checks an intent against the current world. Runs when queued and again when applied.
    fn validate(&self, intent: &Intent) -> Result<(), ActionError> {
        let worker = self
            .workers
            .get(&intent.worker())
            .ok_or(ActionError::WorkerNotFound(intent.worker()))?;

        match *intent {
            Intent::Gather { node, .. } => {
                let source = self.node(node)?;
                if source.current == 0 {
                    return Err(ActionError::NodeDepleted { id: node });
                }
                if !worker.store.has_free_capacity() {
                    return Err(ActionError::StoreFull { worker: worker.id });
                }
                check_range(worker, TargetKind::ResourceNode, node, source.position, Activity::Gather)
            }
            Intent::Transfer { facility, .. } => {
                let target = self.facility(facility)?;
                if !worker.store.has_resources() {
                    return Err(ActionError::StoreEmpty { worker: worker.id });
                }
                if !target.store.has_free_capacity() {
                    return Err(ActionError::TargetFull { id: facility });
                }
                check_range(worker, TargetKind::Facility, facility, target.position, Activity::Deliver)
            }
            Intent::Improve { objective, .. } => {
                let target = self.objective(objective)?;
                if !worker.store.has_resources() {
                    return Err(ActionError::StoreEmpty { worker: worker.id });
                }
                check_range(worker, TargetKind::Objective, objective, target.position, Activity::Improve)
            }
            Intent::Build { site, .. } => {
                let target = self.site(site)?;
                if !worker.store.has_resources() {
                    return Err(ActionError::StoreEmpty { worker: worker.id });
                }
                check_range(worker, TargetKind::ConstructionSite, site, target.position, Activity::Build)
            }
            Intent::Move { .. } => Ok(()),
        }
    }

    fn apply(&mut self, intent: Intent) -> Result<Vec<Event>, ActionError> {
        self.validate(&intent)?;
        let worker_id = intent.worker();
        let worker = self
            .workers
            .get_mut(&worker_id)
            .ok_or(ActionError::WorkerNotFound(worker_id))?;
        let mut events = Vec::new();

        match intent {
            Intent::Gather { node, .. } => {
                let source = self
                    .nodes
                    .iter_mut()
                    .find(|n| n.id == node)
                    .ok_or(ActionError::TargetNotFound {
                        kind: TargetKind::ResourceNode,
                        id: node,
                    })?;
                let yield_cap = GATHER_PER_WORK.saturating_mul(worker.work_parts);
                let amount = worker.store.deposit(yield_cap.min(source.current));
                source.current -= amount;
                events.push(Event::Gathered {
                    worker: worker_id,
                    node,
                    amount,
                    remaining: source.current,
                });
                if source.current == 0 {
                    events.push(Event::NodeDrained {
                        node,
                        position: source.position,
                    });
                }
            }
            Intent::Transfer { facility, .. } => {
                let target = self
                    .facilities
                    .iter_mut()
                    .find(|f| f.id == facility)
                    .ok_or(ActionError::TargetNotFound {
                        kind: TargetKind::Facility,
                        id: facility,
                    })?;
                let amount = target.store.deposit(worker.store.used());
                worker.store.withdraw(amount);
                events.push(Event::Delivered {
                    worker: worker_id,
                    facility,
                    amount,
                });
            }
            Intent::Improve { objective, .. } => {
                let target = self
                    .objectives
                    .iter_mut()
                    .find(|o| o.id == objective)
                    .ok_or(ActionError::TargetNotFound {
                        kind: TargetKind::Objective,
                        id: objective,
                    })?;
                let amount = worker
                    .store
                    .withdraw(IMPROVE_PER_WORK.saturating_mul(worker.work_parts));
                target.progress += amount;
                events.push(Event::Improved {
                    worker: worker_id,
                    objective,
                    amount,
                });
                while target.progress >= target.progress_per_level {
                    target.progress -= target.progress_per_level;
                    target.level += 1;
                    events.push(Event::ObjectiveLevelled {
                        objective,
                        level: target.level,
                    });
                }
            }
            Intent::Build { site, .. } => {
                let target = self
                    .sites
                    .iter_mut()
                    .find(|s| s.id == site)
                    .ok_or(ActionError::TargetNotFound {
                        kind: TargetKind::ConstructionSite,
                        id: site,
                    })?;
                let power = BUILD_PER_WORK.saturating_mul(worker.work_parts);
                let amount = worker.store.withdraw(power.min(target.remaining()));
                target.progress += amount;
                events.push(Event::Built {
                    worker: worker_id,
                    site,
                    amount,
                    progress: target.progress,
                });
            }
            Intent::Move { to, .. } => {
                let from = worker.position;
                worker.position = to;
                events.push(Event::WorkerMoved {
                    worker: worker_id,
                    from,
                    to,
                });
            }
        }

        Ok(events)
    }

    fn complete_sites(&mut self, tick: u64) -> Vec<Event> {
        let (done, open): (Vec<_>, Vec<_>) = std::mem::take(&mut self.sites)
            .into_iter()
            .partition(ConstructionSite::is_complete);
        self.sites = open;

        let mut events = Vec::new();
        for site in done {
            let structure = self.next_entity();
            self.structures.push(Structure {
                id: structure,
                kind: site.kind,
                position: site.position,
                completed_at: tick,
            });
            if site.kind == StructureKind::Extension {
                self.facilities.push(Facility {
                    id: structure,
                    kind: FacilityKind::Extension,
                    position: site.position,
                    store: ResourceStore::empty(FacilityKind::Extension.capacity()),
                });
            }
            events.push(Event::StructureCompleted {
                site: site.id,
                structure,
                kind: site.kind,
                position: site.position,
            });
        }
        events
    }

    fn age_workers(&mut self) -> Vec<Event> {
        let mut retired = Vec::new();
        for worker in self.workers.values_mut() {
            worker.age += 1;
            if worker.age >= worker.max_age {
                retired.push(worker.id);
            }
        }

        retired
            .into_iter()
            .filter_map(|id| self.workers.remove(&id))
            .map(|worker| Event::WorkerRetired {
                worker: worker.id,
                name: worker.name,
            })
            .collect()
    }

    fn node(&self, id: EntityId) -> Result<&ResourceNode, ActionError> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .ok_or(ActionError::TargetNotFound {
                kind: TargetKind::ResourceNode,
                id,
            })
    }

    fn facility(&self, id: EntityId) -> Result<&Facility, ActionError> {
        self.facilities
            .iter()
            .find(|f| f.id == id)
            .ok_or(ActionError::TargetNotFound {
                kind: TargetKind::Facility,
                id,
            })
    }

    fn objective(&self, id: EntityId) -> Result<&Objective, ActionError> {
        self.objectives
            .iter()
            .find(|o| o.id == id)
            .ok_or(ActionError::TargetNotFound {
                kind: TargetKind::Objective,
                id,
            })
    }

    fn site(&self, id: EntityId) -> Result<&ConstructionSite, ActionError> {
        self.sites
            .iter()
            .find(|s| s.id == id)
            .ok_or(ActionError::TargetNotFound {
                kind: TargetKind::ConstructionSite,
                id,
            })
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            saved_at: None,
            workers: self.workers.values().cloned().collect(),
            nodes: self.nodes.clone(),
            facilities: self.facilities.clone(),
            sites: self.sites.clone(),
            objectives: self.objectives.clone(),
            structures: self.structures.clone(),
        }
    }

    /// Rebuilds a world from a snapshot; id counters continue past the highest stored id.
    pub fn from_snapshot(snapshot: WorldSnapshot) -> Self {
        let max_entity = snapshot
            .nodes
            .iter()
            .map(|n| n.id)
            .chain(snapshot.facilities.iter().map(|f| f.id))
            .chain(snapshot.sites.iter().map(|s| s.id))
            .chain(snapshot.objectives.iter().map(|o| o.id))
            .chain(snapshot.structures.iter().map(|s| s.id))
            .max()
            .unwrap_or(0);
        let max_worker = snapshot.workers.iter().map(|w| w.id).max().unwrap_or(0);

        Self {
            tick: snapshot.tick,
            next_worker_id: max_worker + 1,
            next_entity_id: max_entity + 1,
            workers: snapshot.workers.into_iter().map(|w| (w.id, w)).collect(),
            nodes: snapshot.nodes,
            facilities: snapshot.facilities,
            sites: snapshot.sites,
            objectives: snapshot
                .objectives
                .into_iter()
                .map(|o| Objective {
                    progress_per_level: o.progress_per_level.max(1),
                    ..o
                })
                .collect(),
            structures: snapshot.structures,
            pending: Vec::new(),
            announcements: Vec::new(),
        }
    }
}

fn check_range(
    worker: &Worker,
    kind: TargetKind,
    id: EntityId,
    position: Position,
    activity: Activity,
) -> Result<(), ActionError> {
    let distance = worker.position.range_to(position);
    let range = activity.range();
    if distance > range {
        return Err(ActionError::NotInRange {
            worker: worker.id,
            kind,
            id,
            distance,
            range,
        });
    }
    Ok(())
}

fn expect_kind(target: &Target, kind: TargetKind, activity: Activity) -> Result<(), ActionError> {
    if target.kind != kind {
        return Err(ActionError::WrongTarget {
            activity,
            kind: target.kind,
        });
    }
    Ok(())
}

impl WorldQuery for World {
    fn nearest_resource_node(&self, env: &Environment, from: Position) -> Option<Target> {
        let candidates: Vec<Target> = self
            .nodes
            .iter()
            .filter(|n| n.current > 0 && n.position.zone() == env.zone)
            .map(|n| Target {
                id: n.id,
                kind: TargetKind::ResourceNode,
                position: n.position,
            })
            .collect();
        nearest(&candidates, from).copied()
    }

    fn delivery_targets(&self, env: &Environment, from: Position) -> Vec<Target> {
        let mut targets: Vec<Target> = self
            .facilities
            .iter()
            .filter(|f| f.store.has_free_capacity() && f.position.zone() == env.zone)
            .map(|f| Target {
                id: f.id,
                kind: TargetKind::Facility,
                position: f.position,
            })
            .collect();
        sort_nearest_first(&mut targets, from);
        targets
    }

    fn construction_tasks(&self, env: &Environment, from: Position) -> Vec<Target> {
        let mut targets: Vec<Target> = self
            .sites
            .iter()
            .filter(|s| !s.is_complete() && s.position.zone() == env.zone)
            .map(|s| Target {
                id: s.id,
                kind: TargetKind::ConstructionSite,
                position: s.position,
            })
            .collect();
        sort_nearest_first(&mut targets, from);
        targets
    }

    fn improvement_objective(&self, env: &Environment) -> Option<Target> {
        self.objectives
            .iter()
            .find(|o| o.position.zone() == env.zone)
            .map(|o| Target {
                id: o.id,
                kind: TargetKind::Objective,
                position: o.position,
            })
    }
}

impl WorkerActions for World {
    fn gather(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError> {
        expect_kind(target, TargetKind::ResourceNode, Activity::Gather)?;
        self.queue(Intent::Gather {
            worker,
            node: target.id,
        })
    }

    fn transfer(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError> {
        expect_kind(target, TargetKind::Facility, Activity::Deliver)?;
        self.queue(Intent::Transfer {
            worker,
            facility: target.id,
        })
    }

    fn improve(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError> {
        expect_kind(target, TargetKind::Objective, Activity::Improve)?;
        self.queue(Intent::Improve {
            worker,
            objective: target.id,
        })
    }

    fn build(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError> {
        expect_kind(target, TargetKind::ConstructionSite, Activity::Build)?;
        self.queue(Intent::Build {
            worker,
            site: target.id,
        })
    }

    fn move_toward(&mut self, worker: WorkerId, target: &Target, route_colour: Option<&str>) {
        let Some(from) = self.workers.get(&worker).map(|w| w.position) else {
            debug!(worker, "cannot move a missing worker");
            return;
        };
        let to = from.step_toward(target.position);
        if to == from {
            return;
        }

        match self.queue(Intent::Move { worker, to }) {
            Ok(()) => trace!(
                worker,
                %from,
                %to,
                route = route_colour.unwrap_or("-"),
                "move queued"
            ),
            Err(error) => debug!(worker, %error, "move not queued"),
        }
    }

    fn say(&mut self, worker: WorkerId, text: &str) {
        self.announcements.push(Event::WorkerSaid {
            worker,
            text: text.to_string(),
        });
    }
}
