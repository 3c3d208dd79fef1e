//! Per-session gate state and the two configured gates.
//!
//! A [`Session`] holds one [`GateState`] per [`GateKind`]. It belongs to a
//! single visitor and is passed explicitly to every gate call; nothing about
//! it is global or shared.

use crate::config::AccessConfig;
use rsvp_core::gate::{GateError, GateKind, GateState, SecretGate};

/// The invite gate and the admin gate of one event
#[derive(Clone, Debug)]
pub struct Gates {
    invite: SecretGate,
    admin: SecretGate,
}

impl Gates {
    /// Build both gates from the configured secrets
    #[must_use]
    pub fn from_config(access: &AccessConfig) -> Self {
        Self {
            invite: SecretGate::with_secret(GateKind::Invite, access.invite_code.clone()),
            admin: SecretGate::with_secret(GateKind::Admin, access.admin_password.clone()),
        }
    }

    /// The gate of `kind`
    #[must_use]
    pub const fn get(&self, kind: GateKind) -> &SecretGate {
        match kind {
            GateKind::Invite => &self.invite,
            GateKind::Admin => &self.admin,
        }
    }

    /// Verify `input` against the gate of `kind`, updating `session`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if the gate stays closed.
    pub fn verify(
        &self,
        session: &mut Session,
        kind: GateKind,
        input: &str,
    ) -> Result<(), GateError> {
        self.get(kind).verify(session.gate_mut(kind), input)
    }
}

/// Gate state of one visitor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    invite: GateState,
    admin: GateState,
}

impl Session {
    /// Fresh session: every configured gate locked
    #[must_use]
    pub const fn new(gates: &Gates) -> Self {
        Self {
            invite: gates.invite.initial_state(),
            admin: gates.admin.initial_state(),
        }
    }

    /// State of the gate of `kind`
    #[must_use]
    pub const fn gate(&self, kind: GateKind) -> &GateState {
        match kind {
            GateKind::Invite => &self.invite,
            GateKind::Admin => &self.admin,
        }
    }

    /// Mutable state of the gate of `kind`
    pub const fn gate_mut(&mut self, kind: GateKind) -> &mut GateState {
        match kind {
            GateKind::Invite => &mut self.invite,
            GateKind::Admin => &mut self.admin,
        }
    }

    /// Whether this visitor may see the registration form
    #[must_use]
    pub const fn is_invited(&self) -> bool {
        self.invite.is_unlocked()
    }

    /// Whether this visitor may see the admin view
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.admin.is_unlocked()
    }
}
