//! One pass of the colony loop: decide for every worker, resolve the world,
//! keep the population topped up and drop memory of workers that are gone.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::modules::config::Settings;
use crate::modules::interface::{WorkerId, WorkerView};
use crate::modules::memory::{MemoryStore, Role, WorkerMemory};
use crate::modules::roles::{Context, run_worker};
use crate::modules::stats::EconomyStats;
use crate::modules::vm::{Intent, TickResult, World};

/// A worker whose decision panicked. Other workers still ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFault {
    pub worker: WorkerId,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedWorker {
    pub id: WorkerId,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub result: TickResult,
    /// Workers that were asked to decide, in decision order.
    pub deciding: Vec<WorkerId>,
    /// Intents queued during the decision phase.
    pub intents: Vec<Intent>,
    pub faults: Vec<WorkerFault>,
    pub spawned: Vec<SpawnedWorker>,
    pub reclaimed: Vec<String>,
    pub economy: EconomyStats,
}

pub fn run_tick(world: &mut World, memory: &mut MemoryStore, settings: &Settings) -> TickReport {
    run_tick_with(world, memory, settings, |ctx, view, memory| run_worker(ctx, view, memory))
}

/// Runs a tick with `decide` in place of the role dispatch. A panic inside
/// `decide` is contained to that worker: its memory is left untouched and the
/// intents it queued before panicking still apply.
pub fn run_tick_with<F>(
    world: &mut World,
    memory: &mut MemoryStore,
    settings: &Settings,
    mut decide: F,
) -> TickReport
where
    F: FnMut(&mut Context<'_, World>, &WorkerView, &mut WorkerMemory),
{
    let tick = world.tick() + 1;
    let roster: Vec<_> = world
        .workers()
        .map(|w| (w.name.clone(), w.role, w.view(), w.environment(tick)))
        .collect();

    let mut faults = Vec::new();
    for (name, role, view, env) in &roster {
        let mut worker_memory = memory.memory_for(name, *role);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = Context::new(&mut *world, *env, &settings.annotations);
            decide(&mut ctx, view, &mut worker_memory);
        }));

        match outcome {
            Ok(()) => memory.store(name, &worker_memory),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(worker = view.id, name = %name, %message, "worker decision panicked");
                faults.push(WorkerFault {
                    worker: view.id,
                    name: name.clone(),
                    message,
                });
            }
        }
    }

    let deciding = roster.iter().map(|(_, _, view, _)| view.id).collect();
    let intents = world.pending().to_vec();
    let result = world.step();
    let spawned = top_up_population(world, memory, settings, tick);
    let reclaimed = memory.reclaim(|name| world.worker_by_name(name).is_some());
    let economy = EconomyStats::measure(world);

    debug!(
        tick,
        events = result.events.len(),
        rejections = result.rejections.len(),
        "tick resolved"
    );

    TickReport {
        tick,
        result,
        deciding,
        intents,
        faults,
        spawned,
        reclaimed,
        economy,
    }
}

/// Spawns at most one worker per role below its target count.
fn top_up_population(
    world: &mut World,
    memory: &mut MemoryStore,
    settings: &Settings,
    tick: u64,
) -> Vec<SpawnedWorker> {
    let mut spawned = Vec::new();
    for role in Role::ALL {
        let target = settings.population_target(role);
        let live = world.workers().filter(|w| w.role == role).count();
        if live >= target as usize {
            continue;
        }

        let name = unique_name(world, memory, &format!("{:?}_{}", role, tick));
        match world.spawn_from_facility(&name, role, &settings.body, settings.max_worker_age) {
            Ok(id) => {
                memory.register(&name, role);
                info!(worker = id, name = %name, %role, live, target, "spawned worker");
                spawned.push(SpawnedWorker { id, name, role });
            }
            Err(err) => debug!(%role, live, target, error = %err, "cannot spawn yet"),
        }
    }
    spawned
}

/// `base`, or `base_2`, `base_3`, ... when a live worker or a memory record
/// already holds the name.
fn unique_name(world: &World, memory: &MemoryStore, base: &str) -> String {
    let taken = |name: &str| world.worker_by_name(name).is_some() || memory.workers.contains_key(name);
    let mut name = base.to_string();
    let mut suffix = 2;
    while taken(&name) {
        name = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    name
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker decision panicked".to_string()
    }
}
