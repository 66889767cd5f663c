//! Per-worker decision engine.
//!
//! Each role is a small finite state machine run once per tick per worker. It
//! reads the worker's persisted [`WorkerMemory`], queries the world fresh, queues
//! at most one action and possibly moves to another state. Nothing is
//! remembered between calls except what is written back into the memory.

use tracing::{debug, trace};

use crate::modules::config::Annotations;
use crate::modules::interface::{
    Activity, Environment, Target, WorkerActions, WorkerView, WorldQuery,
};
use crate::modules::memory::{Role, WorkerMemory, WorkerState};

pub mod builder;
pub mod harvester;

#[cfg(test)]
pub(crate) mod testkit;

pub use builder::Builder;
pub use harvester::Harvester;

/// Everything a state machine may touch besides the worker's own memory.
pub struct Context<'a, W: ?Sized> {
    pub world: &'a mut W,
    pub env: Environment,
    pub annotations: &'a Annotations,
}

impl<'a, W: ?Sized> Context<'a, W> {
    pub fn new(world: &'a mut W, env: Environment, annotations: &'a Annotations) -> Self {
        Self {
            world,
            env,
            annotations,
        }
    }
}

/// Runs the state machine that governs `memory.role`.
pub fn run_worker<W>(ctx: &mut Context<'_, W>, worker: &WorkerView, memory: &mut WorkerMemory)
where
    W: WorldQuery + WorkerActions + ?Sized,
{
    match memory.role {
        Role::Harvester => Harvester.run(ctx, worker, memory),
        Role::Builder => Builder::default().run(ctx, worker, memory),
    }
}

/// The activity a state performs, if any.
pub(crate) const fn activity_of(state: WorkerState) -> Option<Activity> {
    match state {
        WorkerState::Spawning => None,
        WorkerState::Gathering => Some(Activity::Gather),
        WorkerState::Delivering => Some(Activity::Deliver),
        WorkerState::Improving => Some(Activity::Improve),
        WorkerState::Constructing => Some(Activity::Build),
    }
}

/// Moves the worker into `next`. Takes effect on the worker's next call.
pub(crate) fn transition<W>(
    ctx: &mut Context<'_, W>,
    worker: &WorkerView,
    memory: &mut WorkerMemory,
    next: WorkerState,
) where
    W: WorkerActions + ?Sized,
{
    let previous = memory.current_state();
    memory.state = Some(next);
    debug!(
        worker = worker.id,
        tick = ctx.env.tick,
        role = %memory.role,
        from = %previous,
        to = %next,
        "state transition"
    );

    let annotations = ctx.annotations;
    if let Some(label) = activity_of(next).and_then(|a| annotations.label(a)) {
        ctx.world.say(worker.id, label);
    }
}

/// Attempts `activity` on `target`, walking toward it when out of range.
///
/// Any other failure leaves the worker idle for the tick.
pub(crate) fn act_or_move<W>(
    ctx: &mut Context<'_, W>,
    worker: &WorkerView,
    target: &Target,
    activity: Activity,
) where
    W: WorkerActions + ?Sized,
{
    let outcome = match activity {
        Activity::Gather => ctx.world.gather(worker.id, target),
        Activity::Deliver => ctx.world.transfer(worker.id, target),
        Activity::Improve => ctx.world.improve(worker.id, target),
        Activity::Build => ctx.world.build(worker.id, target),
    };

    match outcome {
        Ok(()) => trace!(
            worker = worker.id,
            %activity,
            target = target.id,
            "action queued"
        ),
        Err(err) if err.is_not_in_range() => {
            let annotations = ctx.annotations;
            ctx.world
                .move_toward(worker.id, target, annotations.route_colour(activity));
        }
        Err(err) => debug!(
            worker = worker.id,
            %activity,
            target = target.id,
            error = %err,
            "action failed; idle this tick"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::testkit::{Call, Reply, ScriptedWorld, context, node, worker};
    use super::*;
    use crate::modules::geometry::Position;
    use crate::modules::interface::ActionError;

    #[test]
    fn in_range_action_does_not_move() {
        let mut world = ScriptedWorld::default();
        let annotations = Annotations::default();
        let mut ctx = context(&mut world, &annotations);
        let target = node(1, 1, 0);

        act_or_move(&mut ctx, &worker(0, 10), &target, Activity::Gather);

        assert_eq!(world.calls, vec![Call::Act(Activity::Gather, 1)]);
    }

    #[test]
    fn out_of_range_action_moves_with_route_colour() {
        let mut world = ScriptedWorld::default().replying(Reply::OutOfRange);
        let annotations = Annotations::default();
        let mut ctx = context(&mut world, &annotations);
        let target = node(3, 9, 9);

        act_or_move(&mut ctx, &worker(0, 10), &target, Activity::Gather);

        assert_eq!(
            world.calls,
            vec![
                Call::Act(Activity::Gather, 3),
                Call::Move(3, Some("#aaff00".to_string())),
            ]
        );
    }

    #[test]
    fn other_failures_are_ignored() {
        let mut world = ScriptedWorld::default()
            .replying(Reply::Fail(ActionError::NodeDepleted { id: 5 }));
        let annotations = Annotations::default();
        let mut ctx = context(&mut world, &annotations);

        act_or_move(&mut ctx, &worker(0, 10), &node(5, 1, 1), Activity::Gather);

        assert_eq!(world.calls, vec![Call::Act(Activity::Gather, 5)]);
    }

    #[test]
    fn disabled_annotations_move_and_transition_silently() {
        let mut world = ScriptedWorld::default().replying(Reply::OutOfRange);
        let annotations = Annotations::disabled();
        let mut ctx = context(&mut world, &annotations);
        let view = worker(0, 10);
        let mut memory = WorkerMemory::new(Role::Harvester);

        act_or_move(&mut ctx, &view, &node(2, 5, 5), Activity::Gather);
        transition(&mut ctx, &view, &mut memory, WorkerState::Delivering);

        assert_eq!(
            world.calls,
            vec![Call::Act(Activity::Gather, 2), Call::Move(2, None)]
        );
        assert_eq!(memory.state, Some(WorkerState::Delivering));
    }

    #[test]
    fn transition_announces_new_activity() {
        let mut world = ScriptedWorld::default();
        let annotations = Annotations::default();
        let mut ctx = context(&mut world, &annotations);
        let mut memory = WorkerMemory::new(Role::Builder);

        transition(&mut ctx, &worker(0, 10), &mut memory, WorkerState::Constructing);

        assert_eq!(memory.state, Some(WorkerState::Constructing));
        assert_eq!(world.calls, vec![Call::Say("🔨 build".to_string())]);
    }

    #[test]
    fn run_worker_dispatches_by_role() {
        let mut world = ScriptedWorld::default().with_nodes(vec![node(1, 1, 1)]);
        let annotations = Annotations::disabled();
        let view = WorkerView {
            id: 4,
            position: Position::origin(),
            store: crate::modules::store::ResourceStore::empty(50),
        };

        let mut harvester = WorkerMemory::new(Role::Harvester);
        run_worker(&mut context(&mut world, &annotations), &view, &mut harvester);
        assert_eq!(harvester.state, Some(WorkerState::Gathering));
        assert!(world.actions().is_empty(), "harvester spawning only transitions");

        let mut builder = WorkerMemory::new(Role::Builder);
        run_worker(&mut context(&mut world, &annotations), &view, &mut builder);
        assert_eq!(builder.state, Some(WorkerState::Gathering));
        assert_eq!(world.actions(), vec![(Activity::Gather, 1)]);
    }
}
