use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::modules::geometry::{Position, ZONE_SIZE, Zone};
use crate::modules::store::Energy;
use crate::modules::structure::StructureKind;
use crate::modules::vm::{DEFAULT_PROGRESS_PER_LEVEL, FacilityKind, SPAWN_CAPACITY, World};

/// Center and radius for random placement. Placement never leaves the center's zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spread {
    pub center: Position,
    pub radius: i32,
}

impl Default for Spread {
    fn default() -> Self {
        Self {
            center: Position::new(ZONE_SIZE / 2, ZONE_SIZE / 2),
            radius: ZONE_SIZE / 2 - 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SeedSpec {
    pub nodes: u32,
    /// Road and container sites.
    pub sites: u32,
    /// Extension sites; each becomes a delivery facility when finished.
    pub extensions: u32,
    pub node_capacity: Energy,
    pub node_regen: Energy,
    pub spread: Spread,
    pub seed: Option<u64>,
}

impl Default for SeedSpec {
    fn default() -> Self {
        Self {
            nodes: 2,
            sites: 2,
            extensions: 2,
            node_capacity: 3000,
            node_regen: 10,
            spread: Spread::default(),
            seed: None,
        }
    }
}

/// Lays out a fresh zone: a stocked spawn at the spread center, an objective,
/// resource nodes and construction sites scattered around it.
pub fn seed_world(spec: &SeedSpec) -> World {
    let mut rng = match spec.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let zone = spec.spread.center.zone();
    let mut world = World::new();

    let spawn = world.add_facility(FacilityKind::Spawn, clamp_to_zone(spec.spread.center, zone));
    // The spawn starts full so the first workers can be paid for.
    let _ = world.refill_facility(spawn, SPAWN_CAPACITY);

    world.add_objective(random_position(spec.spread, zone, &mut rng), DEFAULT_PROGRESS_PER_LEVEL);

    for _ in 0..spec.nodes {
        let position = random_position(spec.spread, zone, &mut rng);
        world.add_node(position, spec.node_capacity, spec.node_regen);
    }

    for _ in 0..spec.extensions {
        let position = random_position(spec.spread, zone, &mut rng);
        world.add_site(StructureKind::Extension, position);
    }

    for _ in 0..spec.sites {
        let kind = if rng.gen_bool(0.5) {
            StructureKind::Road
        } else {
            StructureKind::Container
        };
        world.add_site(kind, random_position(spec.spread, zone, &mut rng));
    }

    info!(
        %zone,
        nodes = spec.nodes,
        sites = spec.sites,
        extensions = spec.extensions,
        "seeded world"
    );
    world
}

fn random_position(spread: Spread, zone: Zone, rng: &mut StdRng) -> Position {
    let radius = spread.radius.max(0);
    let position = Position::new(
        spread.center.x + rng.gen_range(-radius..=radius),
        spread.center.y + rng.gen_range(-radius..=radius),
    );
    clamp_to_zone(position, zone)
}

fn clamp_to_zone(position: Position, zone: Zone) -> Position {
    let min_x = zone.x * ZONE_SIZE;
    let min_y = zone.y * ZONE_SIZE;
    Position::new(
        position.x.clamp(min_x, min_x + ZONE_SIZE - 1),
        position.y.clamp(min_y, min_y + ZONE_SIZE - 1),
    )
}
