//! Unit selectors.
//!
//! A [`Target`] is both a predicate ([`Target::belongs`]) and a query over a
//! scene ([`Target::query`]). Queries are evaluated against the scene as it
//! is at call time; nothing is cached.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use super::Scene;
use crate::state::{Team, TeamKind, Unit, UnitId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Target {
    /// Every unit.
    #[default]
    All,
    /// Every member of a team.
    Team(TeamKind),
    /// A single unit.
    Unit(UnitId),
    /// An explicit set, queried in the given order.
    Multi(Vec<UnitId>),
    And(Vec<Target>),
    Or(Vec<Target>),
    Not(Box<Target>),
    /// Each inner query in turn.
    Seq(Vec<Target>),
}

impl Target {
    pub fn belongs(&self, unit: &Unit) -> bool {
        match self {
            Self::All => true,
            Self::Team(kind) => unit.team == *kind,
            Self::Unit(id) => unit.id() == *id,
            Self::Multi(ids) => ids.contains(&unit.id()),
            Self::And(targets) => targets.iter().all(|t| t.belongs(unit)),
            Self::Or(targets) | Self::Seq(targets) => targets.iter().any(|t| t.belongs(unit)),
            Self::Not(target) => !target.belongs(unit),
        }
    }

    /// Ids matched by this target, in query order.
    ///
    /// Explicit sets are returned as given, so they may name units that are
    /// no longer in the scene; [`Scene::query`] filters those out.
    pub fn query(&self, scene: &Scene) -> Vec<UnitId> {
        match self {
            Self::Multi(ids) => ids.clone(),
            Self::Seq(targets) => targets.iter().flat_map(|t| t.query(scene)).collect(),
            _ => scene
                .units()
                .iter()
                .filter(|unit| self.belongs(unit))
                .map(Unit::id)
                .collect(),
        }
    }

    /// Appends `next` to a sequence.
    pub fn then(self, next: Target) -> Self {
        match self {
            Self::Seq(mut targets) => {
                targets.push(next);
                Self::Seq(targets)
            }
            first => Self::Seq(vec![first, next]),
        }
    }
}

impl BitAnd for Target {
    type Output = Target;

    fn bitand(self, rhs: Target) -> Target {
        match self {
            Self::And(mut targets) => {
                targets.push(rhs);
                Self::And(targets)
            }
            lhs => Self::And(vec![lhs, rhs]),
        }
    }
}

impl BitOr for Target {
    type Output = Target;

    fn bitor(self, rhs: Target) -> Target {
        match self {
            Self::Or(mut targets) => {
                targets.push(rhs);
                Self::Or(targets)
            }
            lhs => Self::Or(vec![lhs, rhs]),
        }
    }
}

impl Not for Target {
    type Output = Target;

    fn not(self) -> Target {
        match self {
            Self::Not(inner) => *inner,
            target => Self::Not(Box::new(target)),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, targets: &[Target], sep: &str) -> fmt::Result {
    for (i, target) in targets.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{target}")?;
    }
    Ok(())
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("any"),
            Self::Team(kind) => write!(f, "all {}", Team::of(*kind).plural),
            Self::Unit(id) => write!(f, "{id}"),
            Self::Multi(ids) => {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                f.write_str(&ids.join(", "))
            }
            Self::And(targets) => join(f, targets, " && "),
            Self::Or(targets) => join(f, targets, " || "),
            Self::Not(target) => write!(f, "not {target}"),
            Self::Seq(targets) => join(f, targets, ", then "),
        }
    }
}
