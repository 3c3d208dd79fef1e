//! # RSVP Core
//!
//! Core types and policies for a single-event registration manager.
//!
//! This crate holds everything with real invariants: the registration record
//! and its column schema, the tabular codec used to persist and export
//! records, the record store boundary, the capacity policy, and the
//! shared-secret access gate.
//!
//! ## Core Concepts
//!
//! - **Record**: one validated registration, immutable once appended
//! - **Column Schema**: the fixed column set of one event configuration
//! - **Record Store**: append-only log of records (`load` / `append`)
//! - **Capacity**: advisory seat accounting derived from the record count
//! - **Gate**: shared-secret checkpoint, modeled as a reducer over session state
//!
//! ## Example
//!
//! ```
//! use rsvp_core::capacity::{is_over_capacity, seats_left};
//! use rsvp_core::gate::{GateKind, GateStatus, SecretGate};
//!
//! assert_eq!(seats_left(19, 20), 1);
//! assert!(is_over_capacity(20, 20));
//!
//! let gate = SecretGate::new(GateKind::Invite, Some("go2025"));
//! let mut state = gate.initial_state();
//! assert!(gate.verify(&mut state, " go2025 ").is_ok());
//! assert_eq!(state.status(), GateStatus::Unlocked);
//! ```

pub mod capacity;
pub mod gate;
pub mod record;
pub mod record_store;
pub mod table;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

pub use record::{ColumnSchema, Record, SchemaError, ValidationError};
pub use record_store::{PersistenceError, RecordStore};

/// Reducer module - The core trait for state machines
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They hold the decision logic and are deterministic and testable. The access
/// gate is the reducer in this crate; its runner lives in [`crate::gate::SecretGate`].
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed by the caller
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Descriptions of follow-up work returned by reducers
pub mod effect {
    /// Effect type - describes work to be performed after a reduction
    ///
    /// Effects are NOT executed by the reducer. Whoever drives the reducer
    /// interprets them.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Feed an action back into the reducer
        ///
        /// Commands use this to emit the event describing their outcome.
        Dispatch(Box<Action>),
    }

    impl<Action> Effect<Action> {
        /// Wrap an action for dispatch
        #[must_use]
        pub fn dispatch(action: Action) -> Self {
            Self::Dispatch(Box::new(action))
        }
    }
}

/// Environment module - Dependency injection traits
///
/// External dependencies (currently only time) are abstracted behind traits
/// and injected into the components that need them.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Clone, Copy, Debug, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn dispatch_boxes_action() {
        let effect = Effect::dispatch(7_u8);
        assert_eq!(effect, Effect::Dispatch(Box::new(7)));
    }
}
