//! Team slots.
//!
//! Every scene has exactly two teams. Units refer to their team by
//! [`TeamKind`]; the [`Team`] record only carries naming used by scripts.

/// Team allegiance of a unit.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TeamKind {
    /// The scripting user's side.
    #[default]
    Ally,
    /// The opposing side.
    Enemy,
}

impl TeamKind {
    /// Returns the opposing team.
    pub const fn opponent(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }
}

/// Named team slot owned by the scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub kind: TeamKind,
    pub singular: &'static str,
    pub plural: &'static str,
}

impl Team {
    pub const ALLY: Self = Self {
        kind: TeamKind::Ally,
        singular: "ally",
        plural: "allies",
    };

    pub const ENEMY: Self = Self {
        kind: TeamKind::Enemy,
        singular: "enemy",
        plural: "enemies",
    };

    pub const fn of(kind: TeamKind) -> Self {
        match kind {
            TeamKind::Ally => Self::ALLY,
            TeamKind::Enemy => Self::ENEMY,
        }
    }
}
