//! Advisory capacity accounting.
//!
//! Capacity never blocks a registration. Once the limit is reached new
//! registrants are told they are on the waitlist, but their records are
//! stored like any other.

/// Shown to registrants once the limit has been reached
pub const WAITLIST_NOTICE: &str = "RSVPs have reached capacity. You can still join the waitlist.";

/// Seats remaining before the limit, never negative
#[must_use]
pub const fn seats_left(current_count: usize, limit: usize) -> usize {
    limit.saturating_sub(current_count)
}

/// Whether the limit has been reached
#[must_use]
pub const fn is_over_capacity(current_count: usize, limit: usize) -> bool {
    current_count >= limit
}

/// Registration status derived from the current count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapacityStatus {
    /// Below the limit
    Open {
        /// Seats remaining
        seats_left: usize,
    },
    /// At or past the limit; new registrants join the waitlist
    Waitlist,
}

impl CapacityStatus {
    /// Evaluate the status for `current_count` registrations against `limit`
    #[must_use]
    pub const fn evaluate(current_count: usize, limit: usize) -> Self {
        if is_over_capacity(current_count, limit) {
            Self::Waitlist
        } else {
            Self::Open {
                seats_left: seats_left(current_count, limit),
            }
        }
    }

    /// Notice to show alongside the registration form, if any
    #[must_use]
    pub const fn notice(self) -> Option<&'static str> {
        match self {
            Self::Open { .. } => None,
            Self::Waitlist => Some(WAITLIST_NOTICE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn last_seat_flips_to_waitlist() {
        assert_eq!(seats_left(19, 20), 1);
        assert!(!is_over_capacity(19, 20));
        assert_eq!(seats_left(20, 20), 0);
        assert!(is_over_capacity(20, 20));
        assert_eq!(CapacityStatus::evaluate(20, 20), CapacityStatus::Waitlist);
        assert_eq!(
            CapacityStatus::evaluate(20, 20).notice(),
            Some(WAITLIST_NOTICE)
        );
    }

    #[test]
    fn zero_limit_is_always_full() {
        assert_eq!(seats_left(0, 0), 0);
        assert!(is_over_capacity(0, 0));
    }

    proptest! {
        #[test]
        fn seats_left_matches_clamped_difference(count in 0usize..10_000, limit in 0usize..10_000) {
            let expected = if limit > count { limit - count } else { 0 };
            prop_assert_eq!(seats_left(count, limit), expected);
        }

        #[test]
        fn seats_left_never_increases(count in 0usize..10_000, limit in 0usize..10_000) {
            prop_assert!(seats_left(count + 1, limit) <= seats_left(count, limit));
        }

        #[test]
        fn over_capacity_matches_comparison(count in 0usize..10_000, limit in 0usize..10_000) {
            prop_assert_eq!(is_over_capacity(count, limit), count >= limit);
            let open = matches!(
                CapacityStatus::evaluate(count, limit),
                CapacityStatus::Open { .. }
            );
            prop_assert_eq!(open, count < limit);
        }
    }
}
