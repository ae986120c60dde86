/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Base seed every roll of the encounter is derived from.
    pub seed: u64,
    /// Acting budget each unit receives at the start of a global turn.
    pub acts_per_turn: u32,
    /// Faces of the die used by percentage checks.
    pub chance_sides: i64,
    /// Maximum nesting of scopes before the engine gives up.
    ///
    /// Observers can trigger rolls and inflictions that notify further
    /// observers; a misconfigured pair of statuses would otherwise recurse
    /// until the stack overflows.
    pub max_depth: usize,
}

impl EngineConfig {
    // ===== compile-time constants =====
    /// Number of team slots in a scene.
    pub const TEAM_SLOTS: usize = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SEED: u64 = 0;
    pub const DEFAULT_ACTS_PER_TURN: u32 = 1;
    pub const DEFAULT_CHANCE_SIDES: i64 = 100;
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    pub fn new() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            acts_per_turn: Self::DEFAULT_ACTS_PER_TURN,
            chance_sides: Self::DEFAULT_CHANCE_SIDES,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_acts_per_turn(mut self, acts_per_turn: u32) -> Self {
        self.acts_per_turn = acts_per_turn;
        self
    }

    pub fn with_chance_sides(mut self, chance_sides: i64) -> Self {
        self.chance_sides = chance_sides;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
