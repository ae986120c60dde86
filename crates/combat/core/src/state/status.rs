//! Status effects.
//!
//! A [`Status`] pairs a shared [`StatusType`] (name plus the declarative
//! table of event bindings) with per-instance state: remaining turns and
//! uses, potency, flags and its place in a composition tree.
//!
//! Statuses live in the scene's arena and refer to each other by
//! [`StatusId`]. Composite statuses (see [`Shape`]) own the ids of the
//! statuses they wrap; the scene sets each wrapped status's `parent` when the
//! wrapper is added, so consumption and removal can walk up to the root.

use std::fmt;

use bitflags::bitflags;

use super::{StatusId, UnitId};
use crate::scene::{EventBinding, Guard, Target};

bitflags! {
    /// Status classification flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StatusFlags: u8 {
        const UNBREAKABLE = 1 << 0;
        const UNDISPELLABLE = 1 << 1;
        const PERMANENT = 1 << 2;
        const KEY = 1 << 3;
        const INVISIBLE = 1 << 4;
        const IMPLICIT = 1 << 5;
        /// Detached from the scene; never notified again.
        const REMOVED = 1 << 6;
    }
}

/// Shared, immutable definition of a status kind.
///
/// Bindings are listed explicitly and registered in order when a status of
/// this type is linked to a bearer.
#[derive(Debug)]
pub struct StatusType {
    pub name: &'static str,
    pub bindings: &'static [EventBinding],
}

impl StatusType {
    pub const fn new(name: &'static str, bindings: &'static [EventBinding]) -> Self {
        Self { name, bindings }
    }

    /// Ordered event bindings registered on link.
    pub fn bindings(&self) -> &'static [EventBinding] {
        self.bindings
    }
}

impl PartialEq for StatusType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

/// Wrapper type of [`Shape::Aura`] statuses.
pub static AURA: StatusType = StatusType::new("Aura", &[]);
/// Wrapper type of [`Shape::Link`] statuses.
pub static LINK: StatusType = StatusType::new("Link", &[]);
/// Wrapper type of [`Shape::Vs`] statuses.
pub static VS: StatusType = StatusType::new("Vs", &[]);

/// Strength of a potency status.
///
/// Flat potencies shift the additive part of a damage frame, scaling
/// potencies multiply (or divide) its proportional part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Potency {
    Flat(i64),
    Scale(f64),
}

impl Potency {
    /// Strengthens the modified quantity.
    pub fn raise(self, flat: &mut i64, prop: &mut f64) {
        match self {
            Self::Flat(value) => *flat += value,
            Self::Scale(factor) => *prop *= factor,
        }
    }

    /// Weakens the modified quantity.
    pub fn lower(self, flat: &mut i64, prop: &mut f64) {
        match self {
            Self::Flat(value) => *flat -= value,
            Self::Scale(factor) => *prop /= factor,
        }
    }
}

impl From<i64> for Potency {
    fn from(value: i64) -> Self {
        Self::Flat(value)
    }
}

impl From<f64> for Potency {
    fn from(factor: f64) -> Self {
        Self::Scale(factor)
    }
}

impl fmt::Display for Potency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat(value) => write!(f, "{value}"),
            Self::Scale(factor) => write!(f, "x{factor}"),
        }
    }
}

/// Composition of a status.
#[derive(Clone, Debug, Default)]
pub enum Shape {
    /// Registers its own bindings on the bearer.
    #[default]
    Plain,
    /// Registers its own bindings and those of the mounted status; the
    /// mounted status lives and dies with this one.
    Mounted { mount: StatusId },
    /// The mounted status watches every unit matching `area` instead of the
    /// bearer.
    Aura { mount: StatusId, area: Target },
    /// Every member is registered and removed together.
    Link { members: Vec<StatusId> },
    /// The inner status only fires while `guard` holds.
    Vs { inner: StatusId, guard: Guard },
}

impl Shape {
    /// Ids of the statuses this shape wraps.
    pub fn children(&self) -> Vec<StatusId> {
        match self {
            Self::Plain => Vec::new(),
            Self::Mounted { mount } | Self::Aura { mount, .. } => vec![*mount],
            Self::Link { members } => members.clone(),
            Self::Vs { inner, .. } => vec![*inner],
        }
    }
}

/// Live status instance.
#[derive(Clone, Debug)]
pub struct Status {
    pub ty: &'static StatusType,
    pub(crate) shape: Shape,
    pub(crate) parent: Option<StatusId>,
    pub(crate) owner: Option<UnitId>,
    /// Remaining turns; `None` never expires.
    pub turns: Option<u32>,
    /// Remaining uses; `None` never runs out.
    pub uses: Option<u32>,
    pub potency: Option<Potency>,
    pub flags: StatusFlags,
    disabled: u32,
}

impl Status {
    pub fn new(ty: &'static StatusType) -> Self {
        Self {
            ty,
            shape: Shape::Plain,
            parent: None,
            owner: None,
            turns: None,
            uses: None,
            potency: None,
            flags: StatusFlags::empty(),
            disabled: 0,
        }
    }

    /// Status of type `ty` carrying `mount` along with it.
    pub fn mounted(ty: &'static StatusType, mount: StatusId) -> Self {
        Self::new(ty).with_shape(Shape::Mounted { mount })
    }

    /// Projects `mount` onto every unit matching `area`.
    pub fn aura(mount: StatusId, area: Target) -> Self {
        Self::new(&AURA).with_shape(Shape::Aura { mount, area })
    }

    /// Bundles statuses so they are linked and removed as one.
    pub fn link(members: impl IntoIterator<Item = StatusId>) -> Self {
        Self::new(&LINK).with_shape(Shape::Link {
            members: members.into_iter().collect(),
        })
    }

    /// Gates `inner` behind `guard`.
    pub fn vs(inner: StatusId, guard: Guard) -> Self {
        Self::new(&VS).with_shape(Shape::Vs { inner, guard })
    }

    fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_turns(mut self, turns: u32) -> Self {
        self.turns = Some(turns);
        self
    }

    pub fn with_uses(mut self, uses: u32) -> Self {
        self.uses = Some(uses);
        self
    }

    pub fn with_potency(mut self, potency: impl Into<Potency>) -> Self {
        self.potency = Some(potency.into());
        self
    }

    pub fn with_flags(mut self, flags: StatusFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Marks the status as implied by something else (not shown, not
    /// separately dispellable by scripts).
    pub fn implicit(self) -> Self {
        self.with_flags(StatusFlags::IMPLICIT)
    }

    pub fn name(&self) -> &'static str {
        self.ty.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn parent(&self) -> Option<StatusId> {
        self.parent
    }

    /// Unit that inflicted this status, if it is linked.
    pub fn owner(&self) -> Option<UnitId> {
        self.owner
    }

    pub fn is_removed(&self) -> bool {
        self.flags.contains(StatusFlags::REMOVED)
    }

    pub fn enabled(&self) -> bool {
        self.disabled == 0
    }

    pub fn disable(&mut self) {
        self.disabled += 1;
    }

    pub fn enable(&mut self) {
        self.disabled = self.disabled.saturating_sub(1);
    }

    /// Advances the turn counter. Returns true once the status has expired.
    pub fn tick(&mut self) -> bool {
        match self.turns.as_mut() {
            None => false,
            Some(turns) => {
                *turns = turns.saturating_sub(1);
                *turns == 0
            }
        }
    }

    /// Consumes one local use. Returns true once uses are exhausted.
    ///
    /// Parent propagation is handled by [`Scene::use_status`](crate::Scene::use_status).
    pub fn consume(&mut self) -> bool {
        match self.uses.as_mut() {
            None => false,
            Some(uses) => {
                *uses = uses.saturating_sub(1);
                *uses == 0
            }
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ty.name)?;
        if let Some(potency) = self.potency {
            write!(f, " [{potency}]")?;
        }
        match (self.turns, self.uses) {
            (Some(t), Some(u)) => write!(f, " ({t}t,{u}u)"),
            (Some(t), None) => write!(f, " ({t}t)"),
            (None, Some(u)) => write!(f, " ({u}u)"),
            (None, None) => Ok(()),
        }
    }
}
