use std::path::Path;
use std::str::FromStr;

use clap::{ArgAction, Subcommand};
use hivecraft::{
    MemoryStore, Position, SeedSpec, Spread, World, load_world_snapshot, reset_action_stats,
    seed_world,
    state::{self, Status},
};

use super::persist_world_view;

#[derive(Subcommand)]
pub enum WorldCommand {
    /// Replace the world with a freshly seeded zone (resets worker memory and stats)
    Seed {
        /// Number of resource nodes
        #[arg(long, default_value_t = 2)]
        nodes: u32,
        /// Number of road/container construction sites
        #[arg(long, default_value_t = 2)]
        sites: u32,
        /// Number of extension construction sites
        #[arg(long, default_value_t = 2)]
        extensions: u32,
        /// Energy capacity of each resource node
        #[arg(long, default_value_t = 3000)]
        node_capacity: hivecraft::Energy,
        /// Energy each resource node regenerates per tick
        #[arg(long, default_value_t = 10)]
        node_regen: hivecraft::Energy,
        /// Center and radius for random placement: x,y,r (radius must be >= 0)
        #[arg(long, value_name = "x,y,r")]
        spread: Option<SpreadArg>,
        /// Optional RNG seed for reproducible placement
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the latest world snapshot
    Show {
        /// Print the snapshot JSON to stdout
        #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct SpreadArg(pub Spread);

impl FromStr for SpreadArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.trim().split(',').collect();
        if parts.len() != 3 {
            return Err("Spread must be formatted as x,y,r (radius >= 0)".into());
        }

        let x = parts[0]
            .trim()
            .parse::<i32>()
            .map_err(|_| "x must be an integer")?;
        let y = parts[1]
            .trim()
            .parse::<i32>()
            .map_err(|_| "y must be an integer")?;
        let radius = parts[2]
            .trim()
            .parse::<i32>()
            .map_err(|_| "radius must be an integer")?;
        if radius < 0 {
            return Err("radius must be non-negative".into());
        }

        Ok(SpreadArg(Spread {
            center: Position::new(x, y),
            radius,
        }))
    }
}

pub(super) fn run_world(dir: &Path, cmd: WorldCommand) -> Result<(), String> {
    match cmd {
        WorldCommand::Seed {
            nodes,
            sites,
            extensions,
            node_capacity,
            node_regen,
            spread,
            seed,
        } => {
            let spec = SeedSpec {
                nodes,
                sites,
                extensions,
                node_capacity,
                node_regen,
                spread: spread.map(|s| s.0).unwrap_or_default(),
                seed,
            };
            let world = seed_world(&spec);

            MemoryStore::default()
                .save(dir)
                .map_err(|e| e.to_string())?;
            reset_action_stats(dir).map_err(|e| e.to_string())?;
            persist_world_view(dir, &world);
            state::set_status(dir, Status::Initialized, 0, Some("world seeded".into()))
                .map_err(|e| e.to_string())?;

            println!(
                "Seeded zone {}: {} node(s), {} site(s) incl. {} extension(s)",
                spec.spread.center.zone(),
                world.nodes().len(),
                world.sites().len(),
                extensions
            );
            Ok(())
        }
        WorldCommand::Show { json } => {
            let Some(snapshot) = load_world_snapshot(dir).map_err(|e| e.to_string())? else {
                println!("No world snapshot found. Run `hivecraft init` or `hivecraft world seed`.");
                return Ok(());
            };

            if json {
                let text = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
                println!("{}", text);
                return Ok(());
            }

            print_world(&World::from_snapshot(snapshot));
            Ok(())
        }
    }
}

fn print_world(world: &World) {
    println!("World at tick {}", world.tick());

    println!("Facilities:");
    for facility in world.facilities() {
        println!(
            " - #{} {:?} at {} | energy {}/{}",
            facility.id,
            facility.kind,
            facility.position,
            facility.store.used(),
            facility.store.capacity()
        );
    }

    println!("Resource nodes:");
    for node in world.nodes() {
        println!(
            " - #{} at {} | energy {}/{} (+{}/tick)",
            node.id, node.position, node.current, node.capacity, node.regen_per_tick
        );
    }

    println!("Objectives:");
    for objective in world.objectives() {
        println!(
            " - #{} at {} | level {} ({}/{})",
            objective.id,
            objective.position,
            objective.level,
            objective.progress,
            objective.progress_per_level
        );
    }

    if !world.sites().is_empty() {
        println!("Construction sites:");
        for site in world.sites() {
            println!(
                " - #{} {} at {} | {}/{}",
                site.id, site.kind, site.position, site.progress, site.progress_total
            );
        }
    }

    if !world.structures().is_empty() {
        println!("Structures:");
        for structure in world.structures() {
            println!(
                " - #{} {} at {} (completed tick {})",
                structure.id, structure.kind, structure.position, structure.completed_at
            );
        }
    }

    println!("Workers: {}", world.workers().count());
}
