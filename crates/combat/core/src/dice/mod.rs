//! Dice expressions.
//!
//! A [`Roll`] is `num` dice each landing uniformly in `[min, max]`. [`Dice`]
//! is what scripts hand to the engine: either a literal value or a roll.
//! Rolls are resolved through an [`RngOracle`] with an explicit seed; the
//! engine's roll pipeline (charge, observers) lives in `engine::roll`.

pub mod rng;

use std::fmt;
use std::str::FromStr;

pub use rng::{PcgRng, RngOracle, compute_seed};

/// Errors produced while parsing dice notation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RollParseError {
    #[error("empty dice expression")]
    Empty,

    #[error("invalid number '{0}' in dice expression")]
    InvalidNumber(String),

    #[error("malformed dice expression '{0}'")]
    Malformed(String),

    #[error("dice range [{min}~{max}] is empty")]
    EmptyRange { min: i64, max: i64 },
}

/// Parametrized dice expression: sum of `num` dice in `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roll {
    pub num: u32,
    pub min: i64,
    pub max: i64,
}

impl Roll {
    /// Percentile die.
    pub const D100: Self = Self::d(100);

    pub const fn new(num: u32, min: i64, max: i64) -> Self {
        Self { num, min, max }
    }

    /// One die with faces `1..=sides`.
    pub const fn d(sides: i64) -> Self {
        Self::new(1, 1, sides)
    }

    /// One die landing in `[min, max]`.
    pub const fn range(min: i64, max: i64) -> Self {
        Self::new(1, min, max)
    }

    /// Same faces, `num` dice.
    pub const fn times(self, num: u32) -> Self {
        Self { num, ..self }
    }

    /// Lowest possible total.
    pub const fn floor(&self) -> i64 {
        self.num as i64 * self.min
    }

    /// Highest possible total.
    pub const fn ceiling(&self) -> i64 {
        self.num as i64 * self.max
    }

    /// Individual die results for the given seed.
    pub fn roll_each<'a>(
        &'a self,
        rng: &'a dyn RngOracle,
        seed: u64,
    ) -> impl Iterator<Item = i64> + 'a {
        (0..self.num).map(move |die| rng.range(compute_seed(seed, 0, 0, die), self.min, self.max))
    }

    /// Sum of all dice for the given seed.
    pub fn roll(&self, rng: &dyn RngOracle, seed: u64) -> i64 {
        self.roll_each(rng, seed).sum()
    }
}

impl Default for Roll {
    fn default() -> Self {
        Self::d(20)
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.num, self.min) {
            (1, 1) => write!(f, "d{}", self.max),
            (1, _) => write!(f, "[{}~{}]", self.min, self.max),
            (n, 1) => write!(f, "{}d{}", n, self.max),
            (n, _) => write!(f, "{}d[{}~{}]", n, self.min, self.max),
        }
    }
}

fn parse_int<T: FromStr>(text: &str) -> Result<T, RollParseError> {
    text.trim()
        .parse()
        .map_err(|_| RollParseError::InvalidNumber(text.trim().to_owned()))
}

/// Parses `[min~max]` (brackets included).
fn parse_bounds(text: &str) -> Result<(i64, i64), RollParseError> {
    let inner = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| RollParseError::Malformed(text.to_owned()))?;
    let (min, max) = inner
        .split_once('~')
        .ok_or_else(|| RollParseError::Malformed(text.to_owned()))?;
    let (min, max) = (parse_int(min)?, parse_int(max)?);
    if min > max {
        return Err(RollParseError::EmptyRange { min, max });
    }
    Ok((min, max))
}

impl FromStr for Roll {
    type Err = RollParseError;

    /// Accepts `d20`, `2d6`, `[6~15]` and `3d[2~5]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RollParseError::Empty);
        }
        if s.starts_with('[') {
            let (min, max) = parse_bounds(s)?;
            return Ok(Self::range(min, max));
        }

        let (count, faces) = s
            .split_once('d')
            .ok_or_else(|| RollParseError::Malformed(s.to_owned()))?;
        let num = if count.trim().is_empty() {
            1
        } else {
            parse_int(count)?
        };
        let (min, max) = if faces.trim_start().starts_with('[') {
            parse_bounds(faces.trim())?
        } else {
            let sides: i64 = parse_int(faces)?;
            if sides < 1 {
                return Err(RollParseError::EmptyRange { min: 1, max: sides });
            }
            (1, sides)
        };
        Ok(Self::new(num, min, max))
    }
}

/// Either a literal value or a roll.
///
/// Literal values pass through the engine's roll pipeline untouched, which
/// keeps fixed-value effects free of charge spending and roll observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Dice {
    Fixed(i64),
    Roll(Roll),
}

impl Dice {
    /// Resolves the expression without charge or observers.
    pub fn roll(&self, rng: &dyn RngOracle, seed: u64) -> i64 {
        match self {
            Self::Fixed(value) => *value,
            Self::Roll(roll) => roll.roll(rng, seed),
        }
    }
}

impl From<i64> for Dice {
    fn from(value: i64) -> Self {
        Self::Fixed(value)
    }
}

impl From<Roll> for Dice {
    fn from(roll: Roll) -> Self {
        Self::Roll(roll)
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => write!(f, "{value}"),
            Self::Roll(roll) => roll.fmt(f),
        }
    }
}

impl FromStr for Dice {
    type Err = RollParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(value) => Ok(Self::Fixed(value)),
            Err(_) => s.parse().map(Self::Roll),
        }
    }
}

impl TryFrom<String> for Dice {
    type Error = RollParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dice> for String {
    fn from(dice: Dice) -> Self {
        dice.to_string()
    }
}

/// How much of the rolling unit's charge a roll may spend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Charge {
    /// Charge is left alone.
    #[default]
    None,
    /// Spend everything the unit has.
    All,
    /// Spend at most this much.
    UpTo(i64),
}

impl Charge {
    /// Amount added to the roll given the unit's current charge.
    ///
    /// Negative charge never subtracts from a roll.
    pub fn contribution(self, available: i64) -> i64 {
        let available = available.max(0);
        match self {
            Self::None => 0,
            Self::All => available,
            Self::UpTo(budget) => budget.clamp(0, available),
        }
    }
}

impl From<bool> for Charge {
    fn from(spend: bool) -> Self {
        if spend { Self::All } else { Self::None }
    }
}
