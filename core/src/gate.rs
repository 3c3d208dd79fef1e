//! Shared-secret access gate.
//!
//! One generic gate guards both the registration form (invite code) and the
//! admin view (admin password). Each instance is a [`SecretGate`] bound to a
//! [`GateKind`] and its configured secret; the per-session flag lives in a
//! [`GateState`] owned by the caller's session.
//!
//! # State machine
//!
//! ```text
//! Unconfigured   (no secret; terminal, never opens)
//! Locked  ──verify(secret)──▶ Unlocked
//! Unlocked ──verify(other)──▶ Locked
//! ```
//!
//! Verification trims the input and compares it to the trimmed secret in
//! constant time. There is no lockout and no rate limiting.
//!
//! The transitions are written as a [`Reducer`]: a `Verify` command decides
//! the outcome and dispatches an `Unlocked` or `Denied` event, and applying
//! the event updates the state.

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::{SmallVec, smallvec};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Which gate an instance guards; also the key of its flag in a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// Guards the registration form
    Invite,
    /// Guards the admin view and export
    Admin,
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invite => write!(f, "invite"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A configured shared secret.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Trim `raw`; blank secrets are treated as not configured
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Whether `input`, trimmed, equals the secret
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        constant_time_eq::constant_time_eq(input.trim().as_bytes(), self.0.as_bytes())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Why a verification did not open the gate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// The input did not match the configured secret.
    #[error("access denied")]
    AccessDenied,

    /// No secret is configured, so the gated feature is disabled.
    #[error("feature disabled: no secret configured")]
    Unconfigured,
}

/// Observable gate status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateStatus {
    /// No secret configured
    Unconfigured,
    /// Secret configured, not yet verified (or last verify failed)
    Locked,
    /// Last verify succeeded
    Unlocked,
}

/// Session-scoped state of one gate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateState {
    status: GateStatus,
    last_error: Option<GateError>,
}

impl GateState {
    /// Initial state of a gate with a configured secret
    #[must_use]
    pub const fn locked() -> Self {
        Self {
            status: GateStatus::Locked,
            last_error: None,
        }
    }

    /// Permanent state of a gate without a secret
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self {
            status: GateStatus::Unconfigured,
            last_error: None,
        }
    }

    /// Current status
    #[must_use]
    pub const fn status(&self) -> GateStatus {
        self.status
    }

    /// Whether the gate is open for this session
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        matches!(self.status, GateStatus::Unlocked)
    }

    /// Error from the most recent failed verification, cleared on success
    #[must_use]
    pub const fn last_error(&self) -> Option<GateError> {
        self.last_error
    }
}

/// Commands and events of the gate reducer
#[derive(Clone, PartialEq, Eq)]
pub enum GateAction {
    // ========== Commands ==========
    /// Command: check an entered passphrase
    Verify {
        /// Raw user input
        input: String,
    },

    // ========== Events ==========
    /// Event: the passphrase matched
    Unlocked,
    /// Event: the passphrase was rejected
    Denied {
        /// Why
        reason: GateError,
    },
}

impl fmt::Debug for GateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verify { .. } => f.debug_struct("Verify").field("input", &"***").finish(),
            Self::Unlocked => f.write_str("Unlocked"),
            Self::Denied { reason } => f.debug_struct("Denied").field("reason", reason).finish(),
        }
    }
}

/// Dependencies of the gate reducer: which gate, and its secret
#[derive(Clone, Debug)]
pub struct GateEnvironment {
    kind: GateKind,
    secret: Option<Secret>,
}

impl GateEnvironment {
    /// Creates a new `GateEnvironment`
    #[must_use]
    pub const fn new(kind: GateKind, secret: Option<Secret>) -> Self {
        Self { kind, secret }
    }

    /// The gate this environment belongs to
    #[must_use]
    pub const fn kind(&self) -> GateKind {
        self.kind
    }

    /// Whether a secret is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.secret.is_some()
    }
}

/// Reducer implementing the gate state machine
#[derive(Clone, Copy, Debug, Default)]
pub struct GateReducer;

impl GateReducer {
    /// Decide the outcome of a verify command
    fn decide(input: &str, env: &GateEnvironment) -> GateAction {
        match &env.secret {
            None => GateAction::Denied {
                reason: GateError::Unconfigured,
            },
            Some(secret) if secret.matches(input) => GateAction::Unlocked,
            Some(_) => GateAction::Denied {
                reason: GateError::AccessDenied,
            },
        }
    }

    /// Applies an event to state
    fn apply_event(state: &mut GateState, action: &GateAction, env: &GateEnvironment) {
        if !env.is_configured() {
            *state = GateState::unconfigured();
            if let GateAction::Denied { reason } = action {
                state.last_error = Some(*reason);
            }
            return;
        }

        match action {
            GateAction::Unlocked => {
                state.status = GateStatus::Unlocked;
                state.last_error = None;
            }
            GateAction::Denied { reason } => {
                state.status = GateStatus::Locked;
                state.last_error = Some(*reason);
            }
            // Commands are not applied to state
            GateAction::Verify { .. } => {}
        }
    }
}

impl Reducer for GateReducer {
    type State = GateState;
    type Action = GateAction;
    type Environment = GateEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            GateAction::Verify { input } => smallvec![Effect::dispatch(Self::decide(&input, env))],

            // ========== Events ==========
            GateAction::Unlocked => {
                Self::apply_event(state, &action, env);
                tracing::info!(gate = %env.kind, "Gate unlocked");
                smallvec![Effect::None]
            }
            GateAction::Denied { reason } => {
                Self::apply_event(state, &action, env);
                match reason {
                    GateError::AccessDenied => {
                        tracing::warn!(gate = %env.kind, "Gate verification failed");
                    }
                    GateError::Unconfigured => {
                        tracing::debug!(gate = %env.kind, "Gate has no secret configured");
                    }
                }
                smallvec![Effect::None]
            }
        }
    }
}

/// One configured gate instance.
///
/// Holds the configuration half of a gate. The session half is a
/// [`GateState`] passed to [`SecretGate::verify`].
#[derive(Clone, Debug)]
pub struct SecretGate {
    env: GateEnvironment,
}

impl SecretGate {
    /// Creates a gate of `kind` with an optional configured secret.
    ///
    /// A missing or blank secret yields a gate that never opens.
    #[must_use]
    pub fn new(kind: GateKind, configured: Option<&str>) -> Self {
        Self::with_secret(kind, configured.and_then(Secret::new))
    }

    /// Creates a gate from an already-parsed secret
    #[must_use]
    pub const fn with_secret(kind: GateKind, secret: Option<Secret>) -> Self {
        Self {
            env: GateEnvironment::new(kind, secret),
        }
    }

    /// Which gate this is
    #[must_use]
    pub const fn kind(&self) -> GateKind {
        self.env.kind
    }

    /// Whether the gated feature is available at all
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.env.is_configured()
    }

    /// Reducer environment of this gate
    #[must_use]
    pub const fn environment(&self) -> &GateEnvironment {
        &self.env
    }

    /// State a new session starts in
    #[must_use]
    pub const fn initial_state(&self) -> GateState {
        if self.is_configured() {
            GateState::locked()
        } else {
            GateState::unconfigured()
        }
    }

    /// Verify `input` and update the session's gate state.
    ///
    /// A mismatch relocks a previously unlocked state.
    ///
    /// # Errors
    ///
    /// - [`GateError::AccessDenied`] if the input does not match
    /// - [`GateError::Unconfigured`] if the gate has no secret
    pub fn verify(&self, state: &mut GateState, input: &str) -> Result<(), GateError> {
        let mut pending = VecDeque::from([GateAction::Verify {
            input: input.to_string(),
        }]);

        while let Some(action) = pending.pop_front() {
            for effect in GateReducer.reduce(state, action, &self.env) {
                if let Effect::Dispatch(next) = effect {
                    pending.push_back(*next);
                }
            }
        }

        match state.status {
            GateStatus::Unlocked => Ok(()),
            GateStatus::Unconfigured => Err(GateError::Unconfigured),
            GateStatus::Locked => Err(state.last_error.unwrap_or(GateError::AccessDenied)),
        }
    }
}
