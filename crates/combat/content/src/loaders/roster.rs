//! Unit roster loader.
//!
//! Loads units from RON files. Potentials are dice strings (`"d20"`,
//! `"2d6"`, `"[11~14]"`, or a bare number) and actions are referenced by
//! their stock name.

use std::path::Path;

use combat_core::{Dice, TeamKind, Unit};
use serde::Deserialize;
use tracing::debug;

use crate::commands::action_type;
use crate::loaders::{LoadResult, read_file};

/// Serialized form of a unit.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    pub team: TeamKind,
    #[serde(default)]
    pub roles: Vec<String>,
    pub hp: i64,
    /// Defaults to `hp`.
    #[serde(default)]
    pub max_hp: Option<i64>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub charge: i64,
    #[serde(default)]
    pub ap: Option<Dice>,
    #[serde(default)]
    pub gp: Option<Dice>,
    #[serde(default)]
    pub cp: Option<Dice>,
    #[serde(default)]
    pub actions: Vec<String>,
}

impl UnitSpec {
    /// Builds an unlinked unit, resolving action names against the stock
    /// catalog.
    pub fn build(&self) -> LoadResult<Unit> {
        let actions = self
            .actions
            .iter()
            .map(|name| {
                action_type(name).map(|ty| ty.instance()).ok_or_else(|| {
                    anyhow::anyhow!("Unknown action '{}' for unit '{}'", name, self.name)
                })
            })
            .collect::<LoadResult<Vec<_>>>()?;

        let mut unit = Unit::new(self.name.clone(), self.team)
            .with_hp(self.hp)
            .with_priority(self.priority)
            .with_charge(self.charge)
            .with_potentials(self.ap, self.gp, self.cp)
            .with_actions(actions);
        unit.roles = self.roles.clone();
        if let Some(max_hp) = self.max_hp {
            unit.max_hp = max_hp;
        }
        Ok(unit)
    }
}

/// Loader for unit rosters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    /// Load a roster from a RON file.
    ///
    /// RON format: Vec<UnitSpec>
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file
    ///
    /// # Returns
    ///
    /// Returns the units in file order, ready for `Scene::link_unit`.
    pub fn load(path: &Path) -> LoadResult<Vec<Unit>> {
        let content = read_file(path)?;
        let specs: Vec<UnitSpec> = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;

        let units = specs
            .iter()
            .map(UnitSpec::build)
            .collect::<LoadResult<Vec<_>>>()?;
        debug!(target: "combat::content", path = %path.display(), units = units.len(), "loaded roster");
        Ok(units)
    }
}
