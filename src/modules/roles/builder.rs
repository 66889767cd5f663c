use crate::modules::interface::{Activity, WorkerActions, WorkerView, WorldQuery};
use crate::modules::memory::{WorkerMemory, WorkerState};
use crate::modules::roles::harvester::Harvester;
use crate::modules::roles::{Context, act_or_move, transition};
use crate::modules::targets::nearest;

/// A harvester that spends full loads on construction sites.
///
/// Runs in two stages. The builder stage looks at the state first and either
/// intercepts the tick (only while constructing) or lets the harvester run
/// afterwards for whatever state the worker is then in.
#[derive(Clone, Copy, Debug, Default)]
pub struct Builder {
    harvester: Harvester,
}

impl Builder {
    pub fn run<W>(&self, ctx: &mut Context<'_, W>, worker: &WorkerView, memory: &mut WorkerMemory)
    where
        W: WorldQuery + WorkerActions + ?Sized,
    {
        if !self.intercept(ctx, worker, memory) {
            self.harvester.run(ctx, worker, memory);
        }
    }

    /// Builder stage. Returns `true` when it handled the tick on its own.
    pub fn intercept<W>(
        &self,
        ctx: &mut Context<'_, W>,
        worker: &WorkerView,
        memory: &mut WorkerMemory,
    ) -> bool
    where
        W: WorldQuery + WorkerActions + ?Sized,
    {
        match memory.current_state() {
            WorkerState::Spawning => {
                // Gather first so there is something to build with.
                self.harvester.to_gathering(ctx, worker, memory);
                false
            }

            WorkerState::Constructing => {
                let tasks = ctx.world.construction_tasks(&ctx.env, worker.position);
                match nearest(&tasks, worker.position) {
                    Some(task) if worker.store.has_resources() => {
                        act_or_move(ctx, worker, task, Activity::Build);
                        true
                    }
                    _ => {
                        self.harvester.to_gathering(ctx, worker, memory);
                        false
                    }
                }
            }

            _ => {
                // Construction starts only on a full load, and only next tick.
                if self.should_start_constructing(worker) {
                    transition(ctx, worker, memory, WorkerState::Constructing);
                }
                false
            }
        }
    }

    pub fn should_start_constructing(&self, worker: &WorkerView) -> bool {
        worker.store.has_no_free_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::config::Annotations;
    use crate::modules::memory::Role;
    use crate::modules::roles::testkit::{
        Call, Reply, ScriptedWorld, context, facility, node, objective, site, worker,
    };

    fn run(world: &mut ScriptedWorld, view: &WorkerView, memory: &mut WorkerMemory) {
        let annotations = Annotations::disabled();
        Builder::default().run(&mut context(world, &annotations), view, memory);
    }

    fn in_state(state: WorkerState) -> WorkerMemory {
        WorkerMemory::with_state(Role::Builder, state)
    }

    fn site_world() -> ScriptedWorld {
        ScriptedWorld::default()
            .with_nodes(vec![node(1, 1, 0)])
            .with_tasks(vec![site(5, 6, 0), site(6, 2, 2), site(7, -2, 1)])
            .with_objective(objective(4, 5, 5))
    }

    #[test]
    fn spawning_gathers_in_the_same_tick() {
        let mut world = site_world();
        let mut memory = in_state(WorkerState::Spawning);

        run(&mut world, &worker(0, 50), &mut memory);

        assert_eq!(memory.state, Some(WorkerState::Gathering));
        assert_eq!(world.actions(), vec![(Activity::Gather, 1)]);
    }

    #[test]
    fn uninitialized_state_matches_explicit_spawning() {
        let mut implicit_world = site_world();
        let mut implicit = WorkerMemory::new(Role::Builder);
        run(&mut implicit_world, &worker(0, 50), &mut implicit);

        let mut explicit_world = site_world();
        let mut explicit = in_state(WorkerState::Spawning);
        run(&mut explicit_world, &worker(0, 50), &mut explicit);

        assert_eq!(implicit, explicit);
        assert_eq!(implicit_world.calls, explicit_world.calls);
    }

    #[test]
    fn full_spawning_builder_still_goes_through_gathering() {
        let mut world = site_world();
        let mut memory = in_state(WorkerState::Spawning);

        run(&mut world, &worker(50, 50), &mut memory);

        // Full with no delivery target: the harvester sends it to improving.
        assert_eq!(memory.state, Some(WorkerState::Improving));
        assert!(world.actions().is_empty());
    }

    #[test]
    fn resourced_constructor_builds_nearest_site_and_intercepts() {
        let mut world = site_world().with_delivery(vec![facility(9, 1, 1)]);
        let mut memory = in_state(WorkerState::Constructing);

        run(&mut world, &worker(20, 50), &mut memory);

        assert_eq!(memory.state, Some(WorkerState::Constructing));
        assert_eq!(world.actions(), vec![(Activity::Build, 6)]);
    }

    #[test]
    fn constructing_out_of_range_moves_without_falling_through() {
        let mut world = site_world().replying(Reply::OutOfRange);
        let mut memory = in_state(WorkerState::Constructing);

        run(&mut world, &worker(50, 50), &mut memory);

        assert_eq!(world.actions(), vec![(Activity::Build, 6)]);
        assert_eq!(world.moves(), vec![6]);
    }

    #[test]
    fn empty_constructor_returns_to_gathering_and_gathers() {
        let mut world = site_world();
        let mut memory = in_state(WorkerState::Constructing);

        run(&mut world, &worker(0, 50), &mut memory);

        assert_eq!(memory.state, Some(WorkerState::Gathering));
        assert_eq!(world.actions(), vec![(Activity::Gather, 1)]);
    }

    #[test]
    fn constructor_without_sites_falls_back_to_harvesting() {
        let mut world = ScriptedWorld::default()
            .with_nodes(vec![node(1, 1, 0)])
            .with_delivery(vec![facility(9, 2, 0)]);
        let mut memory = in_state(WorkerState::Constructing);

        run(&mut world, &worker(50, 50), &mut memory);

        // Gathering is entered, then the full store hands over to delivering.
        assert_eq!(memory.state, Some(WorkerState::Delivering));
        assert!(world.actions().is_empty());
    }

    #[test]
    fn partially_filled_constructor_keeps_building() {
        let mut world = site_world();
        let mut memory = in_state(WorkerState::Constructing);

        run(&mut world, &worker(1, 50), &mut memory);

        assert_eq!(memory.state, Some(WorkerState::Constructing));
        assert_eq!(world.actions(), vec![(Activity::Build, 6)]);
    }

    #[test]
    fn full_builder_switches_to_constructing_and_waits_a_tick() {
        for state in [
            WorkerState::Gathering,
            WorkerState::Delivering,
            WorkerState::Improving,
        ] {
            let mut world = site_world().with_delivery(vec![facility(9, 1, 1)]);
            let mut memory = in_state(state);

            run(&mut world, &worker(50, 50), &mut memory);

            assert_eq!(memory.state, Some(WorkerState::Constructing), "from {}", state);
            assert!(world.actions().is_empty(), "from {}", state);
            assert!(world.moves().is_empty(), "from {}", state);
        }
    }

    #[test]
    fn full_builder_without_delivery_targets_builds_once_constructing() {
        let mut world = site_world();
        let mut memory = in_state(WorkerState::Gathering);
        let full = worker(50, 50);

        run(&mut world, &full, &mut memory);
        assert_eq!(memory.state, Some(WorkerState::Constructing));
        assert!(world.actions().is_empty());

        run(&mut world, &full, &mut memory);
        assert_eq!(memory.state, Some(WorkerState::Constructing));
        assert_eq!(world.actions(), vec![(Activity::Build, 6)]);
    }

    #[test]
    fn builder_with_room_behaves_like_a_harvester() {
        let mut world = site_world().with_delivery(vec![facility(9, 1, 1)]);
        let mut memory = in_state(WorkerState::Gathering);

        run(&mut world, &worker(10, 50), &mut memory);

        assert_eq!(memory.state, Some(WorkerState::Gathering));
        assert_eq!(world.actions(), vec![(Activity::Gather, 1)]);
    }

    #[test]
    fn constructing_is_only_entered_when_full() {
        for used in [0, 1, 25, 49, 50] {
            for state in [
                WorkerState::Gathering,
                WorkerState::Delivering,
                WorkerState::Improving,
            ] {
                let mut world = site_world();
                let mut memory = in_state(state);
                run(&mut world, &worker(used, 50), &mut memory);
                if memory.state == Some(WorkerState::Constructing) {
                    assert_eq!(used, 50, "entered constructing from {} with {}", state, used);
                }
            }
        }
    }

    #[test]
    fn full_builder_without_sites_cycles_without_acting() {
        // Documents the one-tick delay: with no sites a full builder bounces
        // between constructing and the harvester states.
        let mut world = ScriptedWorld::default().with_objective(objective(4, 1, 1));
        let mut memory = in_state(WorkerState::Improving);
        let full = worker(50, 50);

        run(&mut world, &full, &mut memory);
        assert_eq!(memory.state, Some(WorkerState::Constructing));

        run(&mut world, &full, &mut memory);
        assert_eq!(memory.state, Some(WorkerState::Improving));

        assert!(world.actions().is_empty());
    }

    #[test]
    fn intercept_reports_only_the_building_branch() {
        let annotations = Annotations::disabled();
        let builder = Builder::default();

        let mut world = site_world();
        let mut memory = in_state(WorkerState::Constructing);
        assert!(builder.intercept(&mut context(&mut world, &annotations), &worker(5, 50), &mut memory));

        let mut memory = in_state(WorkerState::Gathering);
        assert!(!builder.intercept(&mut context(&mut world, &annotations), &worker(50, 50), &mut memory));

        let mut memory = in_state(WorkerState::Spawning);
        assert!(!builder.intercept(&mut context(&mut world, &annotations), &worker(0, 50), &mut memory));
    }

    #[test]
    fn entering_constructing_announces_build() {
        let annotations = Annotations::default();
        let mut world = site_world();
        let mut memory = in_state(WorkerState::Gathering);

        Builder::default().run(&mut context(&mut world, &annotations), &worker(50, 50), &mut memory);

        assert_eq!(world.calls, vec![Call::Say("🔨 build".to_string())]);
    }
}
