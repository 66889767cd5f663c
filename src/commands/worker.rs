use std::path::Path;

use clap::{ArgAction, Subcommand};
use hivecraft::{FacilityKind, MemoryStore, Position, Role, Settings};

use super::{PositionArg, load_world, persist_world_view};

#[derive(Subcommand)]
pub enum WorkerCommand {
    /// Spawn a worker directly, without paying the body cost
    Spawn {
        #[arg(long, value_enum, default_value_t = Role::Harvester)]
        role: Role,
        /// Worker name (defaults to <Role>_<tick>_<n>)
        #[arg(long)]
        name: Option<String>,
        /// Position as x,y (defaults to next to the first spawn)
        #[arg(long)]
        at: Option<PositionArg>,
    },
    /// List live workers with their memory
    List,
    /// Drop a worker's memory so it restarts from spawning
    Forget {
        name: String,
        /// Also remove the worker from the world
        #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
        kill: bool,
    },
}

pub(super) fn run_worker_command(dir: &Path, cmd: WorkerCommand) -> Result<(), String> {
    match cmd {
        WorkerCommand::Spawn { role, name, at } => {
            let settings = Settings::load(dir).map_err(|e| e.to_string())?;
            let mut world = load_world(dir)?;
            let mut memory = MemoryStore::load(dir).map_err(|e| e.to_string())?;

            let name = name.unwrap_or_else(|| {
                format!("{:?}_{}_{}", role, world.tick(), world.workers().count() + 1)
            });
            if world.worker_by_name(&name).is_some() {
                return Err(format!("worker {} already exists", name));
            }

            let position = at.map(|p| p.0).unwrap_or_else(|| {
                world
                    .facilities()
                    .iter()
                    .find(|f| f.kind == FacilityKind::Spawn)
                    .map(|f| f.position.offset(0, 1))
                    .unwrap_or_else(Position::origin)
            });
            let id = world.spawn_worker(&name, role, position, &settings.body, settings.max_worker_age);
            memory.register(&name, role);

            memory.save(dir).map_err(|e| e.to_string())?;
            persist_world_view(dir, &world);
            println!("Spawned {} #{} ({}) at {}", role, id, name, position);
            Ok(())
        }
        WorkerCommand::List => {
            let world = load_world(dir)?;
            let memory = MemoryStore::load(dir).map_err(|e| e.to_string())?;

            if world.workers().count() == 0 {
                println!("No workers.");
                return Ok(());
            }

            for worker in world.workers() {
                let state = memory
                    .workers
                    .get(&worker.name)
                    .and_then(|r| r.state.clone())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "#{} {} | {} | state={} | at {} | energy {}/{} | age {}/{}",
                    worker.id,
                    worker.name,
                    worker.role,
                    state,
                    worker.position,
                    worker.store.used(),
                    worker.store.capacity(),
                    worker.age,
                    worker.max_age
                );
            }
            Ok(())
        }
        WorkerCommand::Forget { name, kill } => {
            let mut memory = MemoryStore::load(dir).map_err(|e| e.to_string())?;
            let forgot = memory.forget(&name);

            let mut killed = false;
            if kill {
                let mut world = load_world(dir)?;
                if let Some(id) = world.worker_by_name(&name).map(|w| w.id) {
                    world.kill_worker(id).map_err(|e| e.to_string())?;
                    persist_world_view(dir, &world);
                    killed = true;
                }
            }

            if !forgot && !killed {
                return Err(format!("no worker named {}", name));
            }
            memory.save(dir).map_err(|e| e.to_string())?;
            println!(
                "Forgot {}{}",
                name,
                if killed { " and removed it from the world" } else { "" }
            );
            Ok(())
        }
    }
}
