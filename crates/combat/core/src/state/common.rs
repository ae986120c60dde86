use std::fmt;

/// Unique identifier for a unit tracked by a [`Scene`](crate::Scene).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl UnitId {
    /// Reserved identifier for units that were never linked into a scene.
    ///
    /// The scene assigns a real identifier the first time the unit is linked;
    /// relinking a previously unlinked unit keeps its identifier.
    pub const UNLINKED: Self = Self(u32::MAX);

    /// Returns true if a scene has assigned this identifier.
    #[inline]
    pub const fn is_linked(self) -> bool {
        self.0 != Self::UNLINKED.0
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::UNLINKED
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a status stored in the scene's status arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusId(pub u32);

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}
