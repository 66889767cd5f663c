use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::error::StoreError;
use crate::modules::files;
use crate::modules::interface::Activity;
use crate::modules::memory::Role;
use crate::modules::store::Energy;

/// Default lifespan of a spawned worker, in ticks.
pub const DEFAULT_MAX_WORKER_AGE: u64 = 1500;

/// Text shown on a state change and colour of the drawn route for one activity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub label: String,
    pub route_colour: String,
}

impl Annotation {
    fn new(label: &str, route_colour: &str) -> Self {
        Self {
            label: label.to_string(),
            route_colour: route_colour.to_string(),
        }
    }
}

/// Debug annotations passed to `say` and `move_toward`. Purely cosmetic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub enabled: bool,
    pub gather: Annotation,
    pub deliver: Annotation,
    pub improve: Annotation,
    pub build: Annotation,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            enabled: true,
            gather: Annotation::new("🔄 harvest", "#aaff00"),
            deliver: Annotation::new("🔄 deposit", "#ffffff"),
            improve: Annotation::new("🚧 upgrade", "#ffaa00"),
            build: Annotation::new("🔨 build", "#aa9900"),
        }
    }
}

impl Annotations {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn for_activity(&self, activity: Activity) -> &Annotation {
        match activity {
            Activity::Gather => &self.gather,
            Activity::Deliver => &self.deliver,
            Activity::Improve => &self.improve,
            Activity::Build => &self.build,
        }
    }

    pub fn label(&self, activity: Activity) -> Option<&str> {
        self.enabled
            .then(|| self.for_activity(activity).label.as_str())
    }

    pub fn route_colour(&self, activity: Activity) -> Option<&str> {
        self.enabled
            .then(|| self.for_activity(activity).route_colour.as_str())
    }
}

/// Body of every spawned worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySpec {
    pub work_parts: u32,
    pub carry_capacity: Energy,
    pub cost_per_part: Energy,
}

impl Default for BodySpec {
    fn default() -> Self {
        // WORK, CARRY, MOVE, MOVE
        Self {
            work_parts: 1,
            carry_capacity: 50,
            cost_per_part: 50,
        }
    }
}

impl BodySpec {
    /// Work parts plus one carry part and two move parts.
    pub const fn part_count(&self) -> u32 {
        self.work_parts + 3
    }

    pub const fn cost(&self) -> Energy {
        self.part_count() * self.cost_per_part
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target number of live workers per role.
    pub population: BTreeMap<Role, u32>,
    pub body: BodySpec,
    pub annotations: Annotations,
    pub max_worker_age: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let mut population = BTreeMap::new();
        population.insert(Role::Harvester, 12);
        population.insert(Role::Builder, 2);
        Self {
            population,
            body: BodySpec::default(),
            annotations: Annotations::default(),
            max_worker_age: DEFAULT_MAX_WORKER_AGE,
        }
    }
}

pub fn settings_path(dir: &Path) -> PathBuf {
    dir.join("settings.json")
}

impl Settings {
    pub fn load(dir: &Path) -> Result<Self, StoreError> {
        files::load_or_default(&settings_path(dir))
    }

    pub fn save(&self, dir: &Path) -> Result<(), StoreError> {
        files::save(&settings_path(dir), self)
    }

    pub fn population_target(&self, role: Role) -> u32 {
        self.population.get(&role).copied().unwrap_or(0)
    }
}
