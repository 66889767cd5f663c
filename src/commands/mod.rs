use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use hivecraft::{
    Event, MemoryStore, Position, Role, SeedSpec, Settings, TickReport, World,
    default_data_dir, load_action_stats, load_world_snapshot, record_tick, reset_action_stats,
    run_tick, save_action_stats, save_progress, save_world_snapshot, save_world_snapshot_tick,
    seed_world,
    state::{self, Status},
};
use tracing::warn;

mod worker;
mod world;

use worker::{WorkerCommand, run_worker_command};
use world::{WorldCommand, run_world};

#[derive(Parser)]
#[command(
    name = "hivecraft",
    version,
    about = "Colony of autonomous harvester and builder workers, simulated tick by tick",
    long_about = None
)]
pub struct Cli {
    /// Data directory for memory, snapshots and settings
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the data directory with default settings and a seeded world
    Init,
    /// Resume the colony and run a number of ticks
    Run {
        /// Number of ticks to run
        #[arg(short = 't', long, default_value_t = 1)]
        ticks: u64,
        /// Delay between ticks in milliseconds
        #[arg(short = 'd', long, default_value_t = 0)]
        delay_ms: u64,
        /// Print every event, not just the notable ones
        #[arg(short = 'v', long, action = ArgAction::SetTrue, default_value_t = false)]
        verbose: bool,
    },
    /// Show runtime status, population and action summary
    Status,
    /// World operations (seeding, inspection)
    World {
        #[command(subcommand)]
        command: WorldCommand,
    },
    /// Worker operations (spawn, list, forget)
    Worker {
        #[command(subcommand)]
        command: WorkerCommand,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct PositionArg(pub Position);

impl FromStr for PositionArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.trim().split(',').collect();
        if parts.len() != 2 {
            return Err("Position must be formatted as x,y".into());
        }

        let x = parts[0]
            .trim()
            .parse::<i32>()
            .map_err(|_| "x must be an integer")?;
        let y = parts[1]
            .trim()
            .parse::<i32>()
            .map_err(|_| "y must be an integer")?;

        Ok(PositionArg(Position::new(x, y)))
    }
}

pub fn run() {
    let cli = Cli::parse();
    let dir = cli.data_dir.unwrap_or_else(default_data_dir);
    if let Err(err) = dispatch(&dir, cli.command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn dispatch(dir: &Path, command: Command) -> Result<(), String> {
    match command {
        Command::Init => run_init(dir),
        Command::Run {
            ticks,
            delay_ms,
            verbose,
        } => run_loop(dir, ticks, Duration::from_millis(delay_ms), verbose),
        Command::Status => run_status(dir),
        Command::World { command } => run_world(dir, command),
        Command::Worker { command } => run_worker_command(dir, command),
    }
}

fn run_init(dir: &Path) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("create {}: {}", dir.display(), e))?;

    let settings = Settings::load(dir).map_err(|e| e.to_string())?;
    settings.save(dir).map_err(|e| e.to_string())?;
    state::init_state(dir).map_err(|e| e.to_string())?;
    reset_action_stats(dir).map_err(|e| e.to_string())?;

    match load_world_snapshot(dir).map_err(|e| e.to_string())? {
        Some(snapshot) => println!("Keeping existing world at tick {}", snapshot.tick),
        None => {
            let world = seed_world(&SeedSpec::default());
            MemoryStore::default()
                .save(dir)
                .map_err(|e| e.to_string())?;
            persist_world_view(dir, &world);
            println!(
                "Seeded world: {} node(s), {} site(s), {} objective(s)",
                world.nodes().len(),
                world.sites().len(),
                world.objectives().len()
            );
        }
    }

    println!(
        "Initialized state at {}",
        state::state_file_path(dir).display()
    );
    Ok(())
}

fn run_status(dir: &Path) -> Result<(), String> {
    match state::load_state(dir).map_err(|e| e.to_string())? {
        None => {
            println!("Status: not initialized. Run `hivecraft init`.");
            return Ok(());
        }
        Some(state) => {
            println!(
                "Status: {:?} | last_tick={} | message={}",
                state.status,
                state.last_tick,
                state.message.unwrap_or_else(|| "-".into())
            );
        }
    }

    if let Some(snapshot) = load_world_snapshot(dir).map_err(|e| e.to_string())? {
        let world = World::from_snapshot(snapshot);
        let settings = Settings::load(dir).map_err(|e| e.to_string())?;
        let memory = MemoryStore::load(dir).map_err(|e| e.to_string())?;

        for role in Role::ALL {
            let live = world.workers().filter(|w| w.role == role).count();
            println!(
                "{}s: {}/{}",
                role,
                live,
                settings.population_target(role)
            );
        }

        let mut states: BTreeMap<String, usize> = BTreeMap::new();
        for record in memory.workers.values() {
            let state = record.state.clone().unwrap_or_else(|| "-".into());
            *states.entry(state).or_default() += 1;
        }
        if !states.is_empty() {
            let summary: Vec<String> = states
                .iter()
                .map(|(state, count)| format!("{}={}", state, count))
                .collect();
            println!("States: {}", summary.join(" "));
        }
    }

    print_action_summary(dir)
}

fn run_loop(dir: &Path, ticks: u64, delay: Duration, verbose: bool) -> Result<(), String> {
    if state::load_state(dir).map_err(|e| e.to_string())?.is_none() {
        let initialized = state::init_state(dir).map_err(|e| e.to_string())?;
        println!(
            "State not found; initialized new state at {} (status={:?})",
            state::state_file_path(dir).display(),
            initialized.status
        );
    }

    let settings = Settings::load(dir).map_err(|e| e.to_string())?;
    let mut world = load_world(dir)?;
    let mut memory = MemoryStore::load(dir).map_err(|e| e.to_string())?;
    if world.tick() > 0 {
        println!("Resuming from tick {}", world.tick());
    }

    state::set_status(
        dir,
        Status::Running,
        world.tick(),
        Some("colony loop running".into()),
    )
    .map_err(|e| e.to_string())?;

    for remaining in (0..ticks).rev() {
        let report = run_tick(&mut world, &mut memory, &settings);
        print_tick(&world, &report, verbose);

        persist_action_stats(dir, &report);
        save_progress(dir, &world, &memory).map_err(|e| e.to_string())?;
        state::set_status(
            dir,
            Status::Running,
            world.tick(),
            Some("colony loop running".into()),
        )
        .map_err(|e| e.to_string())?;

        if remaining > 0 && delay > Duration::ZERO {
            std::thread::sleep(delay);
        }
    }

    state::set_status(
        dir,
        Status::Stopped,
        world.tick(),
        Some(format!("completed {} tick(s)", ticks)),
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

pub(crate) fn load_world(dir: &Path) -> Result<World, String> {
    load_world_snapshot(dir)
        .map_err(|e| e.to_string())?
        .map(World::from_snapshot)
        .ok_or_else(|| "no world found; run `hivecraft init` or `hivecraft world seed`".to_string())
}

pub(crate) fn persist_world_view(dir: &Path, world: &World) {
    let snapshot = world.snapshot().stamped();
    if let Err(err) = save_world_snapshot(dir, &snapshot) {
        warn!(error = %err, "failed to write world snapshot");
    }
    if let Err(err) = save_world_snapshot_tick(dir, &snapshot) {
        warn!(error = %err, "failed to write tick snapshot");
    }
}

fn persist_action_stats(dir: &Path, report: &TickReport) {
    let mut store = match load_action_stats(dir) {
        Ok(s) => s,
        Err(err) => {
            warn!(error = %err, "failed to load action stats");
            return;
        }
    };

    record_tick(&mut store, &report.deciding, &report.intents, &report.result);

    if let Err(err) = save_action_stats(dir, &store) {
        warn!(error = %err, "failed to save action stats");
    }
}

fn print_action_summary(dir: &Path) -> Result<(), String> {
    let store = load_action_stats(dir).map_err(|e| e.to_string())?;
    if store.per_worker.is_empty() {
        println!("No action stats recorded.");
        return Ok(());
    }

    println!("Action summary per worker:");
    for (worker, stats) in store.per_worker.iter() {
        println!(
            " - worker {} | gather={} transfer={} improve={} build={} move={} idle={}",
            worker,
            stats.gather_count,
            stats.transfer_count,
            stats.improve_count,
            stats.build_count,
            stats.move_count,
            stats.idle_count
        );
    }
    Ok(())
}

fn print_tick(world: &World, report: &TickReport, verbose: bool) {
    println!(
        "Tick {}: {} worker(s), {} events, {} rejections | harvest/tick={} recovery/tick={}",
        report.tick,
        report.deciding.len(),
        report.result.events.len(),
        report.result.rejections.len(),
        report.economy.harvest_per_tick,
        report.economy.recovery_per_tick
    );

    for event in &report.result.events {
        if verbose || is_notable(event) {
            println!(" - {}", describe_event(world, event));
        }
    }

    if verbose && !report.result.rejections.is_empty() {
        println!("Rejections:");
        for rejection in &report.result.rejections {
            println!(
                " - {} {}: {}",
                worker_label(world, rejection.intent.worker()),
                rejection.intent.label(),
                rejection.error
            );
        }
    }

    for spawned in &report.spawned {
        println!(" + spawned {} #{} ({})", spawned.role, spawned.id, spawned.name);
    }
    for fault in &report.faults {
        println!(" ! {} #{} faulted: {}", fault.name, fault.worker, fault.message);
    }
    for name in &report.reclaimed {
        println!(" - reclaimed memory of {}", name);
    }
}

fn is_notable(event: &Event) -> bool {
    matches!(
        event,
        Event::NodeDrained { .. }
            | Event::ObjectiveLevelled { .. }
            | Event::StructureCompleted { .. }
            | Event::WorkerRetired { .. }
    )
}

fn worker_label(world: &World, worker: hivecraft::WorkerId) -> String {
    world
        .worker(worker)
        .map(|w| format!("{} #{}", w.name, w.id))
        .unwrap_or_else(|| format!("#{}", worker))
}

fn describe_event(world: &World, event: &Event) -> String {
    match event {
        Event::TickStarted { tick } => format!("tick {} started", tick),
        Event::TickCompleted { tick } => format!("tick {} completed", tick),
        Event::WorkerSaid { worker, text } => {
            format!("{} says {}", worker_label(world, *worker), text)
        }
        Event::WorkerMoved { worker, from, to } => format!(
            "{} moved from {} to {}",
            worker_label(world, *worker),
            from,
            to
        ),
        Event::Gathered {
            worker,
            node,
            amount,
            remaining,
        } => format!(
            "{} gathered {} from node {} (remaining={})",
            worker_label(world, *worker),
            amount,
            node,
            remaining
        ),
        Event::NodeDrained { node, position } => {
            format!("node {} drained at {}", node, position)
        }
        Event::Delivered {
            worker,
            facility,
            amount,
        } => format!(
            "{} delivered {} to facility {}",
            worker_label(world, *worker),
            amount,
            facility
        ),
        Event::Improved {
            worker,
            objective,
            amount,
        } => format!(
            "{} improved objective {} by {}",
            worker_label(world, *worker),
            objective,
            amount
        ),
        Event::ObjectiveLevelled { objective, level } => {
            format!("objective {} reached level {}", objective, level)
        }
        Event::Built {
            worker,
            site,
            amount,
            progress,
        } => format!(
            "{} built {} on site {} (progress={})",
            worker_label(world, *worker),
            amount,
            site,
            progress
        ),
        Event::StructureCompleted {
            site,
            structure,
            kind,
            position,
        } => format!(
            "site {} completed as {} {} at {}",
            site, kind, structure, position
        ),
        Event::WorkerRetired { worker, name } => format!("{} #{} retired", name, worker),
    }
}
