use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::modules::geometry::Position;
use crate::modules::interface::EntityId;
use crate::modules::store::Energy;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    /// Becomes an extension facility that accepts deliveries.
    Extension,
    Road,
    Container,
}

impl StructureKind {
    /// Build progress needed to finish a site of this kind.
    pub const fn progress_total(self) -> Energy {
        match self {
            StructureKind::Extension => 3000,
            StructureKind::Road => 300,
            StructureKind::Container => 5000,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StructureKind::Extension => "extension",
            StructureKind::Road => "road",
            StructureKind::Container => "container",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StructureKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "extension" => Ok(StructureKind::Extension),
            "road" => Ok(StructureKind::Road),
            "container" => Ok(StructureKind::Container),
            _ => Err(()),
        }
    }
}

/// A finished structure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub id: EntityId,
    pub kind: StructureKind,
    pub position: Position,
    pub completed_at: u64,
}

/// A structure under construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionSite {
    pub id: EntityId,
    pub kind: StructureKind,
    pub position: Position,
    pub progress: Energy,
    pub progress_total: Energy,
}

impl ConstructionSite {
    pub fn new(id: EntityId, kind: StructureKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            progress: 0,
            progress_total: kind.progress_total(),
        }
    }

    pub const fn remaining(&self) -> Energy {
        self.progress_total.saturating_sub(self.progress)
    }

    pub const fn is_complete(&self) -> bool {
        self.progress >= self.progress_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_labels() {
        assert_eq!(" Road ".parse::<StructureKind>(), Ok(StructureKind::Road));
        assert_eq!("extension".parse::<StructureKind>(), Ok(StructureKind::Extension));
        assert!("castle".parse::<StructureKind>().is_err());
    }

    #[test]
    fn site_tracks_remaining_progress() {
        let mut site = ConstructionSite::new(1, StructureKind::Road, Position::origin());
        assert_eq!(site.remaining(), 300);
        site.progress = 295;
        assert_eq!(site.remaining(), 5);
        assert!(!site.is_complete());
        site.progress = 300;
        assert!(site.is_complete());
    }
}
