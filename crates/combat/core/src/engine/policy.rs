//! Synchronous abstraction for choosing actions and targets.
//!
//! Engine users plug in [`ActionPolicy`] implementations so encounters can
//! run with interactive prompts, scripted fixtures or AI.

use crate::scene::Scene;
use crate::state::UnitId;

/// Decides what a unit does with its act.
///
/// Different implementations can handle:
/// - Interactive selection (prompting the person running the encounter)
/// - Enemy AI
/// - Scripted/replayed choices
/// - Testing fixtures
pub trait ActionPolicy: Send + Sync {
    /// Index into `actor`'s action list, or `None` to pass.
    fn choose_action(&self, scene: &Scene, actor: UnitId) -> Option<usize>;

    /// Picks one of `candidates` for an action of `actor`.
    ///
    /// `tag` is the label the action gave the selection, if any.
    fn choose_target(
        &self,
        _scene: &Scene,
        _actor: UnitId,
        candidates: &[UnitId],
        _tag: Option<&str>,
    ) -> Option<UnitId> {
        candidates.first().copied()
    }
}

/// Always takes the first action and the first candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstChoice;

impl ActionPolicy for FirstChoice {
    fn choose_action(&self, scene: &Scene, actor: UnitId) -> Option<usize> {
        scene
            .unit(actor)
            .ok()
            .filter(|unit| !unit.actions.is_empty())
            .map(|_| 0)
    }
}
