//! Retry classification and backoff computation.
//!
//! Everything here is a pure function of its inputs (apart from the jitter
//! draw in [`compute_backoff`]), so it can be tested without a network.

use std::time::Duration;

use rand::Rng;

use crate::{GdprError, Result, TransportError, TransportErrorKind};

/// Retry behavior for one client instance.
///
/// Built once at configuration time and only read afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
    /// Growth factor applied per retry, must be greater than `1.0`.
    pub backoff_factor: f64,
    /// Fraction in `[0, 1]` by which a delay may be stretched at random.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Checks the field ranges.
    pub fn validate(&self) -> Result<()> {
        if self.initial_backoff.is_zero() {
            return Err(GdprError::Config(
                "initial_backoff must be greater than zero".to_owned(),
            ));
        }
        if self.max_backoff < self.initial_backoff {
            return Err(GdprError::Config(format!(
                "max_backoff ({:?}) must not be shorter than initial_backoff ({:?})",
                self.max_backoff, self.initial_backoff
            )));
        }
        if !(self.backoff_factor > 1.0 && self.backoff_factor.is_finite()) {
            return Err(GdprError::Config(format!(
                "backoff_factor must be a finite value greater than 1.0, got {}",
                self.backoff_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(GdprError::Config(format!(
                "jitter must be within [0, 1], got {}",
                self.jitter
            )));
        }
        Ok(())
    }

    /// Delay before retry `attempt` for an already drawn jitter value `draw`.
    ///
    /// `draw` is clamped to `[0, jitter]`, with `jitter` itself limited to
    /// `[0, 1]`. The result is `initial * factor^attempt * (1 + draw)`,
    /// clamped to `max_backoff`.
    pub fn backoff_with_draw(&self, attempt: u32, draw: f64) -> Duration {
        let max_nanos = self.max_backoff.as_nanos() as f64;
        let mut raw = self.initial_backoff.as_nanos() as f64
            * self.backoff_factor.powf(f64::from(attempt));
        if draw > 0.0 {
            raw *= 1.0 + draw.min(self.effective_jitter());
        }
        if raw.is_nan() {
            raw = max_nanos;
        }
        // `as u64` saturates, and the clamp keeps infinities out.
        Duration::from_nanos(raw.clamp(0.0, max_nanos) as u64)
    }

    /// `jitter` limited to `[0, 1]`. NaN counts as no jitter.
    fn effective_jitter(&self) -> f64 {
        if self.jitter.is_nan() {
            0.0
        } else {
            self.jitter.clamp(0.0, 1.0)
        }
    }
}

/// Reports whether a failed attempt is worth repeating.
///
/// `status` is `0` when no response was obtained.
pub fn should_retry(status: u16, error: Option<&TransportError>) -> bool {
    if let Some(err) = error {
        if matches!(
            err.kind(),
            TransportErrorKind::DeadlineExceeded
                | TransportErrorKind::Canceled
                | TransportErrorKind::ConnectionRefused
                | TransportErrorKind::NoSuchHost
        ) {
            return true;
        }
    }

    matches!(status, 429 | 500 | 502..=599)
}

/// Delay before retry `attempt` (`0` is the wait before the second attempt).
pub fn compute_backoff(policy: &RetryPolicy, attempt: u32) -> Duration {
    let jitter = policy.effective_jitter();
    let draw = if jitter > 0.0 {
        rand::thread_rng().gen_range(0.0..=jitter)
    } else {
        0.0
    };
    policy.backoff_with_draw(attempt, draw)
}

#[cfg(test)]
mod tests {
    use std::{io, time::Duration};

    use proptest::prelude::*;

    use super::{compute_backoff, should_retry, RetryPolicy};
    use crate::{GdprError, TransportError, TransportErrorKind};

    fn transport_error(kind: TransportErrorKind) -> TransportError {
        TransportError::new(kind, io::Error::new(io::ErrorKind::Other, "boom"))
    }

    fn no_jitter() -> RetryPolicy {
        RetryPolicy {
            jitter: 0.0,
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn server_errors_are_retryable_except_not_implemented() {
        for status in [500, 502, 503, 504, 599] {
            assert!(should_retry(status, None), "status {status}");
        }
        assert!(!should_retry(501, None));
    }

    #[test]
    fn too_many_requests_is_retryable() {
        assert!(should_retry(429, None));
    }

    #[test]
    fn success_redirect_and_client_errors_are_terminal() {
        for status in [0, 200, 201, 204, 301, 304, 400, 401, 403, 404, 409, 422, 428, 430, 600] {
            assert!(!should_retry(status, None), "status {status}");
        }
    }

    #[test]
    fn transient_transport_errors_are_retryable() {
        for kind in [
            TransportErrorKind::DeadlineExceeded,
            TransportErrorKind::Canceled,
            TransportErrorKind::ConnectionRefused,
            TransportErrorKind::NoSuchHost,
        ] {
            let err = transport_error(kind);
            assert!(should_retry(0, Some(&err)), "kind {kind:?}");
        }
    }

    #[test]
    fn other_transport_errors_are_terminal() {
        let err = transport_error(TransportErrorKind::Other);
        assert!(!should_retry(0, Some(&err)));
    }

    #[test]
    fn classification_is_repeatable() {
        let err = transport_error(TransportErrorKind::DeadlineExceeded);
        for _ in 0..10 {
            assert!(should_retry(0, Some(&err)));
            assert!(should_retry(503, None));
            assert!(!should_retry(404, None));
        }
    }

    #[test]
    fn backoff_doubles_from_initial() {
        let policy = no_jitter();
        assert_eq!(compute_backoff(&policy, 0), Duration::from_millis(100));
        assert_eq!(compute_backoff(&policy, 1), Duration::from_millis(200));
        assert_eq!(compute_backoff(&policy, 2), Duration::from_millis(400));
    }

    #[test]
    fn backoff_is_capped_for_huge_attempts() {
        let policy = no_jitter();
        assert_eq!(compute_backoff(&policy, 10_000), policy.max_backoff);
        assert_eq!(compute_backoff(&policy, u32::MAX), policy.max_backoff);
    }

    #[test]
    fn default_policy_is_valid() {
        RetryPolicy::default()
            .validate()
            .expect("default policy must validate");
        RetryPolicy::no_retries()
            .validate()
            .expect("no-retry policy must validate");
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let cases = [
            RetryPolicy {
                initial_backoff: Duration::ZERO,
                ..RetryPolicy::default()
            },
            RetryPolicy {
                max_backoff: Duration::from_millis(10),
                ..RetryPolicy::default()
            },
            RetryPolicy {
                backoff_factor: 1.0,
                ..RetryPolicy::default()
            },
            RetryPolicy {
                backoff_factor: f64::NAN,
                ..RetryPolicy::default()
            },
            RetryPolicy {
                jitter: 1.5,
                ..RetryPolicy::default()
            },
            RetryPolicy {
                jitter: -0.1,
                ..RetryPolicy::default()
            },
        ];
        for policy in cases {
            assert!(
                matches!(policy.validate(), Err(GdprError::Config(_))),
                "expected config error for {policy:?}"
            );
        }
    }

    #[test]
    fn unvalidated_jitter_is_limited_to_one() {
        for jitter in [f64::INFINITY, 5.0, 1.5] {
            let policy = RetryPolicy {
                jitter,
                ..RetryPolicy::default()
            };
            for _ in 0..200 {
                let delay = compute_backoff(&policy, 0);
                assert!(
                    delay >= Duration::from_millis(100) && delay <= Duration::from_millis(200),
                    "jitter {jitter} gave {delay:?}"
                );
            }
        }
    }

    #[test]
    fn negative_or_nan_jitter_means_no_jitter() {
        for jitter in [-0.5, f64::NEG_INFINITY, f64::NAN] {
            let policy = RetryPolicy {
                jitter,
                ..RetryPolicy::default()
            };
            assert_eq!(compute_backoff(&policy, 1), Duration::from_millis(200));
        }
    }

    #[test]
    fn explicit_draw_cannot_leave_the_band() {
        let policy = RetryPolicy {
            jitter: 0.5,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff_with_draw(0, 10.0), Duration::from_millis(150));
    }

    proptest! {
        #[test]
        fn backoff_without_jitter_is_monotonic_and_bounded(
            initial_ms in 1u64..5_000,
            extra_ms in 0u64..60_000,
            factor in 1.01f64..8.0,
            attempt in 0u32..64,
        ) {
            let policy = RetryPolicy {
                max_retries: 3,
                initial_backoff: Duration::from_millis(initial_ms),
                max_backoff: Duration::from_millis(initial_ms + extra_ms),
                backoff_factor: factor,
                jitter: 0.0,
            };
            let current = compute_backoff(&policy, attempt);
            let next = compute_backoff(&policy, attempt + 1);
            prop_assert!(current <= next);
            prop_assert!(next <= policy.max_backoff);
            prop_assert!(current >= policy.initial_backoff.min(policy.max_backoff));
        }

        #[test]
        fn jittered_backoff_stays_within_band(
            initial_ms in 1u64..1_000,
            factor in 1.01f64..4.0,
            jitter in 0.0f64..=1.0,
            attempt in 0u32..8,
        ) {
            let policy = RetryPolicy {
                max_retries: 3,
                initial_backoff: Duration::from_millis(initial_ms),
                max_backoff: Duration::from_secs(1_000_000),
                backoff_factor: factor,
                jitter,
            };
            let base = initial_ms as f64 * 1_000_000.0 * factor.powf(f64::from(attempt));
            let delay = compute_backoff(&policy, attempt).as_nanos() as f64;
            // One nanosecond of slack for the float-to-integer truncation.
            prop_assert!(delay >= base - 1.0, "delay {} below base {}", delay, base);
            prop_assert!(delay <= base * (1.0 + jitter) + 1.0, "delay {} above band", delay);
        }
    }
}
