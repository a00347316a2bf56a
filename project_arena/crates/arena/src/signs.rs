use net::{Host, Tone};
use session::{PlayerId, SignClick};
use space::TilePos;

use crate::error::ArenaError;
use crate::membership::JoinReport;
use crate::state::ArenaCore;

/// What a sign interaction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    Linked {
        space: String,
        /// Space the coordinate was linked to before, if any.
        moved_from: Option<String>,
    },
    AlreadyLinked {
        space: String,
    },
    Unlinked {
        space: String,
    },
    NotLinked,
    /// Plain sign, nothing pending.
    Ignored,
    /// First click: occupancy shown, a second click joins.
    Prompted {
        space: String,
        occupants: usize,
        capacity: u32,
    },
    Joined(JoinReport),
}

impl ArenaCore {
    /// Arm link mode: the player's next sign interaction binds that sign to
    /// `space`. Returns the canonical space name.
    pub fn request_sign_link(&mut self, player: PlayerId, space: &str) -> Result<String, ArenaError> {
        let name = self.spaces.require(space)?.name.clone();
        let session = self.sessions.get_or_create(player);
        session.pending_sign_link = Some(name.clone());
        session.pending_sign_unlink = false;
        Ok(name)
    }

    /// Arm unlink mode for the player's next sign interaction.
    pub fn request_sign_unlink(&mut self, player: PlayerId) {
        let session = self.sessions.get_or_create(player);
        session.pending_sign_unlink = true;
        session.pending_sign_link = None;
    }

    /// Handle a sign interaction at `pos`.
    ///
    /// A pending link or unlink request is consumed first. Otherwise a click
    /// on a linked sign either prompts (first click) or joins (second click on
    /// the same sign within the debounce window).
    pub fn on_sign_click(
        &mut self,
        host: &mut dyn Host,
        player: PlayerId,
        pos: TilePos,
        now_ms: i64,
    ) -> Result<SignOutcome, ArenaError> {
        let session = self.sessions.get_or_create(player);
        if let Some(target) = session.pending_sign_link.take() {
            return self.link_sign(host, player, &target, pos);
        }
        if std::mem::take(&mut session.pending_sign_unlink) {
            return Ok(self.unlink_sign(host, player, pos));
        }

        let Some(space) = self.spaces.space_for_sign(pos) else {
            return Ok(SignOutcome::Ignored);
        };
        let space_name = space.name.clone();
        let capacity = space.capacity;

        let debounce = self.settings.sign_debounce_ms;
        let session = self.sessions.get_or_create(player);
        let double_click = session
            .last_sign_click
            .is_some_and(|last| last.pos == pos && now_ms - last.at_ms < debounce);

        if double_click {
            session.last_sign_click = None;
            return self
                .join(host, player, &space_name, now_ms)
                .map(SignOutcome::Joined);
        }

        session.last_sign_click = Some(SignClick { pos, at_ms: now_ms });
        let occupants = self.sessions.occupant_count(&space_name);
        host.message(
            player,
            Tone::Info,
            &format!("Space '{space_name}': {occupants}/{capacity} players. Click again to join."),
        );
        Ok(SignOutcome::Prompted {
            space: space_name,
            occupants,
            capacity,
        })
    }

    fn link_sign(
        &mut self,
        host: &mut dyn Host,
        player: PlayerId,
        target: &str,
        pos: TilePos,
    ) -> Result<SignOutcome, ArenaError> {
        let target = self.spaces.require(target)?.name.clone();

        let current = self.spaces.space_for_sign(pos).map(|s| s.name.clone());
        if current.as_deref() == Some(target.as_str()) {
            tracing::warn!(player = ?player, space = %target, %pos, "sign already linked");
            host.message(player, Tone::Notice, &format!("This sign is already linked to space '{target}'."));
            return Ok(SignOutcome::AlreadyLinked { space: target });
        }

        if let Some(old) = current.as_deref().and_then(|n| self.spaces.get_mut(n)) {
            old.unlink_sign(pos);
        }
        self.spaces.require_mut(&target)?.link_sign(pos);
        self.persist("sign", |s| s.save_sign(&target, pos));

        tracing::info!(player = ?player, space = %target, %pos, moved_from = ?current, "sign linked");
        host.message(player, Tone::Success, &format!("Sign {pos} linked to space '{target}'."));
        Ok(SignOutcome::Linked {
            space: target,
            moved_from: current,
        })
    }

    fn unlink_sign(&mut self, host: &mut dyn Host, player: PlayerId, pos: TilePos) -> SignOutcome {
        let Some(space) = self.spaces.iter_mut().find(|s| s.has_sign(pos)) else {
            host.message(player, Tone::Error, "This sign is not linked to any space.");
            return SignOutcome::NotLinked;
        };
        space.unlink_sign(pos);
        let name = space.name.clone();
        self.persist("sign", |s| s.delete_sign(pos));

        tracing::info!(player = ?player, space = %name, %pos, "sign unlinked");
        host.message(player, Tone::Success, &format!("Sign {pos} unlinked from space '{name}'."));
        SignOutcome::Unlinked { space: name }
    }
}
