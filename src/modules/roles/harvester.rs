use crate::modules::interface::{Activity, WorkerActions, WorkerView, WorldQuery};
use crate::modules::memory::{WorkerMemory, WorkerState};
use crate::modules::roles::{Context, act_or_move, transition};
use crate::modules::targets::nearest;

/// The generic resource worker.
///
/// Priority is gather > deliver > improve: a worker keeps gathering while it
/// has room, hands its load to a facility when one accepts deliveries, and
/// only improves the objective when it is full and nothing wants the energy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Harvester;

impl Harvester {
    pub fn run<W>(&self, ctx: &mut Context<'_, W>, worker: &WorkerView, memory: &mut WorkerMemory)
    where
        W: WorldQuery + WorkerActions + ?Sized,
    {
        let state = *memory.state.get_or_insert(WorkerState::Spawning);

        match state {
            WorkerState::Spawning => {
                // Straight to work.
                self.to_gathering(ctx, worker, memory);
            }

            WorkerState::Gathering => {
                if self.should_gather(worker) {
                    self.gather(ctx, worker);
                } else if self.should_deliver(ctx, worker) {
                    transition(ctx, worker, memory, WorkerState::Delivering);
                } else {
                    transition(ctx, worker, memory, WorkerState::Improving);
                }
            }

            WorkerState::Delivering => {
                let targets = ctx.world.delivery_targets(&ctx.env, worker.position);
                if let Some(target) = nearest(&targets, worker.position) {
                    act_or_move(ctx, worker, target, Activity::Deliver);
                } else if self.should_gather(worker) {
                    self.to_gathering(ctx, worker, memory);
                } else {
                    transition(ctx, worker, memory, WorkerState::Improving);
                }
            }

            WorkerState::Improving => {
                // Improving is the last resort, so every other option is checked first.
                if self.should_deliver(ctx, worker) {
                    transition(ctx, worker, memory, WorkerState::Delivering);
                } else if self.should_gather(worker) {
                    self.to_gathering(ctx, worker, memory);
                } else {
                    self.improve(ctx, worker);
                }
            }

            // Belongs to the builder; left untouched until the builder stage handles it.
            WorkerState::Constructing => {}
        }
    }

    /// Shared with the builder, which re-enters the gather loop from its own states.
    pub fn to_gathering<W>(
        &self,
        ctx: &mut Context<'_, W>,
        worker: &WorkerView,
        memory: &mut WorkerMemory,
    ) where
        W: WorkerActions + ?Sized,
    {
        transition(ctx, worker, memory, WorkerState::Gathering);
    }

    pub fn should_gather(&self, worker: &WorkerView) -> bool {
        worker.store.has_free_capacity()
    }

    /// True whenever some facility accepts deliveries, regardless of the worker's load.
    pub fn should_deliver<W>(&self, ctx: &Context<'_, W>, worker: &WorkerView) -> bool
    where
        W: WorldQuery + ?Sized,
    {
        !ctx.world
            .delivery_targets(&ctx.env, worker.position)
            .is_empty()
    }

    fn gather<W>(&self, ctx: &mut Context<'_, W>, worker: &WorkerView)
    where
        W: WorldQuery + WorkerActions + ?Sized,
    {
        if let Some(node) = ctx.world.nearest_resource_node(&ctx.env, worker.position) {
            act_or_move(ctx, worker, &node, Activity::Gather);
        }
    }

    fn improve<W>(&self, ctx: &mut Context<'_, W>, worker: &WorkerView)
    where
        W: WorldQuery + WorkerActions + ?Sized,
    {
        if let Some(objective) = ctx.world.improvement_objective(&ctx.env) {
            act_or_move(ctx, worker, &objective, Activity::Improve);
        }
    }
}
