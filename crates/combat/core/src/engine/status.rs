//! Status infliction and removal.

use tracing::{info, warn};

use super::{Engine, Frame, Keys, RemovalCause};
use crate::error::Flow;
use crate::state::{Status, StatusId, UnitId};

impl Engine {
    /// Places a status already in the arena on `target`.
    ///
    /// Without an `actor` the infliction is framed as self-inflicted:
    /// `out_inflict` fires first and the target becomes the source.
    /// Observers of `out_inflict`/`in_inflict` may rewrite the actor or
    /// target in the context before the status is linked.
    pub fn inflict_status(
        &mut self,
        status: StatusId,
        target: UnitId,
        actor: Option<UnitId>,
    ) -> Flow<()> {
        self.scene.status(status)?;
        self.scene.unit(target)?;

        self.scope(Frame::Atom("inflict"), Keys::empty())
            .bind(|ctx| {
                ctx.actor = actor;
                ctx.status = Some(status);
                ctx.target = Some(target);
            })
            .run(|eng| {
                if eng.ctx.actor.is_none() {
                    eng.atom("out", "inflict")?;
                }
                eng.atom("in", "inflict")?;

                let target = eng.ctx.target.unwrap_or(target);
                let source = *eng.ctx.actor.get_or_insert(target);

                eng.scene.link_status(status, source, target)?;
                info!(
                    target: "combat::status",
                    %status,
                    name = eng.scene.status(status)?.name(),
                    %source,
                    bearer = %target,
                    "inflicted"
                );
                eng.atom("hit", "inflict")
            })?;
        Ok(())
    }

    /// Moves `status` into the arena and inflicts it.
    pub fn inflict(
        &mut self,
        status: Status,
        target: UnitId,
        actor: Option<UnitId>,
    ) -> Flow<StatusId> {
        let id = self.scene.add_status(status);
        self.inflict_status(id, target, actor)?;
        Ok(id)
    }

    /// Removes a linked status.
    ///
    /// `cause` is exposed to observers but does not affect the outcome:
    /// `UNBREAKABLE` and `UNDISPELLABLE` statuses are removed all the same.
    pub fn remove_status(
        &mut self,
        status: StatusId,
        actor: Option<UnitId>,
        cause: RemovalCause,
    ) -> Flow<()> {
        self.scene.status(status)?;

        self.scope(Frame::Atom("remove_status"), Keys::empty())
            .bind(|ctx| {
                ctx.actor = actor;
                ctx.status = Some(status);
                ctx.removal = Some(cause);
            })
            .run(|eng| {
                if eng.ctx.actor.is_none() {
                    eng.atom("out", "dispel")?;
                }
                eng.atom("in", "dispel")?;

                if eng.scene.status(status)?.owner().is_none() {
                    warn!(target: "combat::status", %status, "removing a status that is not linked");
                    return Ok(());
                }
                eng.scene.unlink_status(status)?;
                info!(
                    target: "combat::status",
                    %status,
                    name = eng.scene.status(status)?.name(),
                    ?cause,
                    "removed"
                );
                eng.atom("post", "dispel")
            })?;
        Ok(())
    }
}
