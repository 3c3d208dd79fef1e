//! Given-When-Then harness for the gate reducer
//!
//! One step of a reducer is checked at a time: start from a gate state, feed
//! one command or event, then inspect the new state and the dispatched
//! follow-ups. [`crate::assertions`] covers the common effect shapes.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use rsvp_core::{SmallVec, effect::Effect, reducer::Reducer};

type StateAssertion<S> = Box<dyn FnOnce(&S)>;
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Single-step reducer check.
///
/// A `Verify` command leaves the gate state untouched and dispatches the
/// decided event; the event is what changes the state. Test each half with
/// its own `ReducerTest`.
///
/// # Example
///
/// ```
/// use rsvp_core::gate::{GateAction, GateKind, GateReducer, GateState, SecretGate};
/// use rsvp_testing::{ReducerTest, assertions};
///
/// let gate = SecretGate::new(GateKind::Invite, Some("go2025"));
///
/// ReducerTest::new(GateReducer)
///     .with_env(gate.environment().clone())
///     .given_state(GateState::locked())
///     .when_action(GateAction::Unlocked)
///     .then_state(|state| assert!(state.is_unlocked()))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    action: Option<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Start a check of `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Gate configuration the step runs against
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Session state before the step (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Command or event to feed (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Check the state after the step (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Check the follow-up effects of the step (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Reduce once and run every check.
    ///
    /// # Panics
    ///
    /// Panics if the state, action or environment was never given, or if a
    /// check fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self.initial_state.expect("call given_state() first");
        let action = self.action.expect("call when_action() first");
        let env = self.environment.expect("call with_env() first");

        let effects: SmallVec<[Effect<A>; 4]> = self.reducer.reduce(&mut state, action, &env);

        for check in self.state_assertions {
            check(&state);
        }
        for check in self.effect_assertions {
            check(effects.as_slice());
        }
    }
}

/// Checks on the effects of one reducer step
pub mod assertions {
    use rsvp_core::effect::Effect;

    /// The step settled: nothing, or a lone `Effect::None`
    ///
    /// # Panics
    ///
    /// Panics if anything was dispatched.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.is_empty() || matches!(effects, [Effect::None]),
            "step should settle, got {effects:?}"
        );
    }

    /// Exactly `expected` effects were returned
    ///
    /// # Panics
    ///
    /// Panics on any other count.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "wrong number of effects");
    }

    /// Assert that one of the effects dispatches `expected`
    ///
    /// # Panics
    ///
    /// Panics if no `Dispatch` effect carries an equal action.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_dispatches<A: PartialEq + std::fmt::Debug>(effects: &[Effect<A>], expected: &A) {
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::Dispatch(action) if **action == *expected)),
            "no effect dispatches {expected:?} in {effects:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsvp_core::gate::{
        GateAction, GateError, GateKind, GateReducer, GateState, GateStatus, SecretGate,
    };

    fn invite_gate() -> SecretGate {
        SecretGate::new(GateKind::Invite, Some("go2025"))
    }

    #[test]
    fn test_verify_dispatches_unlocked() {
        ReducerTest::new(GateReducer)
            .with_env(invite_gate().environment().clone())
            .given_state(GateState::locked())
            .when_action(GateAction::Verify {
                input: "go2025".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.status(), GateStatus::Locked);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_dispatches(effects, &GateAction::Unlocked);
            })
            .run();
    }

    #[test]
    fn test_denied_event_relocks() {
        ReducerTest::new(GateReducer)
            .with_env(invite_gate().environment().clone())
            .given_state({
                let mut state = GateState::locked();
                let _ = invite_gate().verify(&mut state, "go2025");
                state
            })
            .when_action(GateAction::Denied {
                reason: GateError::AccessDenied,
            })
            .then_state(|state| {
                assert_eq!(state.status(), GateStatus::Locked);
                assert_eq!(state.last_error(), Some(GateError::AccessDenied));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_assertions_no_effects() {
        assertions::assert_no_effects::<GateAction>(&[Effect::None]);
        assertions::assert_no_effects::<GateAction>(&[]);
    }
}
