//! Stock combat content and data loaders.
//!
//! This crate houses the standard statuses and actions built on
//! `combat-core`, and loaders for RON/TOML data files:
//! - Potency statuses (attack, defense, heal and recovery modifiers)
//! - Basic actions (attack, defend, concentrate) and a catalog by name
//! - Engine configuration (data-driven via TOML)
//! - Unit rosters (data-driven via RON)

pub mod commands;
pub mod statuses;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use commands::{ATTACK, CONCENTRATE, CATALOG, DEFEND, action_type};
pub use statuses::{ATK_DOWN, ATK_UP, DEF_DOWN, DEF_UP, HEAL_DOWN, HEAL_UP, REC_DOWN, REC_UP};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, RosterLoader, UnitSpec};
