//! Scripted world for exercising the state machines without a simulation.

use crate::modules::config::Annotations;
use crate::modules::geometry::{Position, Zone};
use crate::modules::interface::{
    ActionError, Activity, EntityId, Environment, Target, TargetKind, WorkerActions, WorkerId,
    WorkerView, WorldQuery,
};
use crate::modules::roles::Context;
use crate::modules::store::ResourceStore;
use crate::modules::targets::{nearest, sort_nearest_first};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Act(Activity, EntityId),
    Move(EntityId, Option<String>),
    Say(String),
}

/// How every terminal action call is answered.
#[derive(Clone, Debug, Default)]
pub enum Reply {
    #[default]
    Accept,
    OutOfRange,
    Fail(ActionError),
}

#[derive(Debug, Default)]
pub struct ScriptedWorld {
    pub nodes: Vec<Target>,
    pub delivery: Vec<Target>,
    pub tasks: Vec<Target>,
    pub objective: Option<Target>,
    pub reply: Reply,
    pub calls: Vec<Call>,
}

impl ScriptedWorld {
    pub fn with_nodes(mut self, nodes: Vec<Target>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_delivery(mut self, delivery: Vec<Target>) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn with_tasks(mut self, tasks: Vec<Target>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_objective(mut self, objective: Target) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn replying(mut self, reply: Reply) -> Self {
        self.reply = reply;
        self
    }

    /// Terminal actions attempted, in order.
    pub fn actions(&self) -> Vec<(Activity, EntityId)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Act(activity, id) => Some((*activity, *id)),
                _ => None,
            })
            .collect()
    }

    pub fn moves(&self) -> Vec<EntityId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Move(id, _) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn act(&mut self, activity: Activity, worker: WorkerId, target: &Target) -> Result<(), ActionError> {
        self.calls.push(Call::Act(activity, target.id));
        match &self.reply {
            Reply::Accept => Ok(()),
            Reply::OutOfRange => Err(ActionError::NotInRange {
                worker,
                kind: target.kind,
                id: target.id,
                distance: activity.range() + 1,
                range: activity.range(),
            }),
            Reply::Fail(err) => Err(err.clone()),
        }
    }
}

impl WorldQuery for ScriptedWorld {
    fn nearest_resource_node(&self, _env: &Environment, from: Position) -> Option<Target> {
        nearest(&self.nodes, from).copied()
    }

    fn delivery_targets(&self, _env: &Environment, from: Position) -> Vec<Target> {
        let mut targets = self.delivery.clone();
        sort_nearest_first(&mut targets, from);
        targets
    }

    fn construction_tasks(&self, _env: &Environment, from: Position) -> Vec<Target> {
        let mut targets = self.tasks.clone();
        sort_nearest_first(&mut targets, from);
        targets
    }

    fn improvement_objective(&self, _env: &Environment) -> Option<Target> {
        self.objective
    }
}

impl WorkerActions for ScriptedWorld {
    fn gather(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError> {
        self.act(Activity::Gather, worker, target)
    }

    fn transfer(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError> {
        self.act(Activity::Deliver, worker, target)
    }

    fn improve(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError> {
        self.act(Activity::Improve, worker, target)
    }

    fn build(&mut self, worker: WorkerId, target: &Target) -> Result<(), ActionError> {
        self.act(Activity::Build, worker, target)
    }

    fn move_toward(&mut self, _worker: WorkerId, target: &Target, route_colour: Option<&str>) {
        self.calls
            .push(Call::Move(target.id, route_colour.map(str::to_string)));
    }

    fn say(&mut self, _worker: WorkerId, text: &str) {
        self.calls.push(Call::Say(text.to_string()));
    }
}

pub fn context<'a>(
    world: &'a mut ScriptedWorld,
    annotations: &'a Annotations,
) -> Context<'a, ScriptedWorld> {
    let env = Environment {
        zone: Zone { x: 0, y: 0 },
        tick: 1,
    };
    Context::new(world, env, annotations)
}

/// Worker 1 at the origin with the given fill level.
pub fn worker(used: u32, capacity: u32) -> WorkerView {
    WorkerView {
        id: 1,
        position: Position::origin(),
        store: ResourceStore::with_used(capacity, used),
    }
}

fn target(kind: TargetKind, id: EntityId, x: i32, y: i32) -> Target {
    Target {
        id,
        kind,
        position: Position::new(x, y),
    }
}

pub fn node(id: EntityId, x: i32, y: i32) -> Target {
    target(TargetKind::ResourceNode, id, x, y)
}

pub fn facility(id: EntityId, x: i32, y: i32) -> Target {
    target(TargetKind::Facility, id, x, y)
}

pub fn site(id: EntityId, x: i32, y: i32) -> Target {
    target(TargetKind::ConstructionSite, id, x, y)
}

pub fn objective(id: EntityId, x: i32, y: i32) -> Target {
    target(TargetKind::Objective, id, x, y)
}
