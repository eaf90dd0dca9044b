//! In-process half of the duplicate-add protection.
//!
//! One logical "add" can arrive through several triggers at once (context
//! menu, hotkey, a re-fired event). Two in-memory layers absorb that:
//!
//! - the in-flight set refuses a signature while it is being processed and
//!   for a short linger after it finished, to swallow trailing triggers;
//! - the throttle map refuses a signature accepted within the throttle
//!   window, whether or not that add has finished.
//!
//! Expired entries are swept at the start of every guard call instead of
//! by timers, so tests drive expiry with a manual clock.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::normalize::Signature;
use crate::clock::Clock;
use crate::config::GuardConfig;

/// Why an add was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureRejection {
    #[error("Nothing to add")]
    EmptyText,

    #[error("Already adding {0}")]
    InFlight(String),

    #[error("{0} was added moments ago")]
    Throttled(String),

    #[error("{0} is already stored")]
    RecentDuplicate(String),

    #[error("Word collection unavailable, {0} was not added")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum InFlight {
    Processing,
    /// Finished; kept until the given instant
    Lingering(DateTime<Utc>),
}

#[derive(Debug, Default)]
struct GuardState {
    in_flight: HashMap<Signature, InFlight>,
    /// Signature → when it was last accepted
    accepted: HashMap<Signature, DateTime<Utc>>,
}

pub struct DuplicateGuard {
    clock: Arc<dyn Clock>,
    config: GuardConfig,
    state: Mutex<GuardState>,
}

impl DuplicateGuard {
    pub fn new(clock: Arc<dyn Clock>, config: GuardConfig) -> Self {
        Self {
            clock,
            config,
            state: Mutex::new(GuardState::default()),
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sweep(&self, state: &mut GuardState, now: DateTime<Utc>) {
        state.in_flight.retain(|_, entry| match entry {
            InFlight::Processing => true,
            InFlight::Lingering(until) => *until > now,
        });
        let window = self.config.throttle_window();
        state.accepted.retain(|_, at| now - *at < window);
    }

    /// Claim a signature. The returned ticket keeps it in flight until it is
    /// dropped, after which it lingers for the configured delay.
    pub fn admit(&self, signature: Signature) -> Result<InFlightTicket<'_>, CaptureRejection> {
        let now = self.clock.now();
        let mut state = self.lock();
        self.sweep(&mut state, now);

        if state.in_flight.contains_key(&signature) {
            return Err(CaptureRejection::InFlight(signature.to_string()));
        }
        if state.accepted.contains_key(&signature) {
            return Err(CaptureRejection::Throttled(signature.to_string()));
        }

        state.accepted.insert(signature.clone(), now);
        state.in_flight.insert(signature.clone(), InFlight::Processing);
        Ok(InFlightTicket {
            guard: self,
            signature,
        })
    }

    fn finish(&self, signature: &Signature) {
        let now = self.clock.now();
        let until = now
            .checked_add_signed(self.config.in_flight_linger())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut state = self.lock();
        self.sweep(&mut state, now);
        state
            .in_flight
            .insert(signature.clone(), InFlight::Lingering(until));
    }

    /// Number of signatures currently blocked by either layer
    pub fn tracked(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.lock();
        self.sweep(&mut state, now);
        let blocked: HashSet<&Signature> = state
            .in_flight
            .keys()
            .chain(state.accepted.keys())
            .collect();
        blocked.len()
    }
}

/// Proof that a signature is being processed
pub struct InFlightTicket<'a> {
    guard: &'a DuplicateGuard,
    signature: Signature,
}

impl InFlightTicket<'_> {
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        self.guard.finish(&self.signature);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};

    fn setup() -> (Arc<ManualClock>, DuplicateGuard) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap(),
        ));
        let guard = DuplicateGuard::new(clock.clone(), GuardConfig::default());
        (clock, guard)
    }

    fn sig(text: &str) -> Signature {
        Signature::new("japanese", text)
    }

    #[test]
    fn test_in_flight_signature_is_refused() {
        let (_clock, guard) = setup();
        let ticket = guard.admit(sig("猫")).unwrap();
        assert!(matches!(guard.admit(sig(" 猫")), Err(CaptureRejection::InFlight(_))));
        drop(ticket);
    }

    #[test]
    fn test_throttle_outlives_completion() {
        let (clock, guard) = setup();
        drop(guard.admit(sig("猫")).unwrap());

        // Linger (1.2s) over, throttle (1.5s) still active
        clock.advance(Duration::milliseconds(1300));
        assert!(matches!(guard.admit(sig("猫")), Err(CaptureRejection::Throttled(_))));

        clock.advance(Duration::milliseconds(300));
        assert!(guard.admit(sig("猫")).is_ok());
    }

    #[test]
    fn test_linger_outlives_throttle_for_slow_adds() {
        let (clock, guard) = setup();
        let ticket = guard.admit(sig("犬")).unwrap();
        clock.advance(Duration::seconds(5));
        drop(ticket);

        clock.advance(Duration::milliseconds(1000));
        assert!(matches!(guard.admit(sig("犬")), Err(CaptureRejection::InFlight(_))));

        clock.advance(Duration::milliseconds(200));
        assert!(guard.admit(sig("犬")).is_ok());
    }

    #[test]
    fn test_distinct_signatures_do_not_interfere() {
        let (_clock, guard) = setup();
        let _a = guard.admit(sig("猫")).unwrap();
        let _b = guard.admit(sig("犬")).unwrap();
        assert!(guard.admit(Signature::new("korean", "猫")).is_ok());
    }

    #[test]
    fn test_expired_entries_are_swept() {
        let (clock, guard) = setup();
        drop(guard.admit(sig("a")).unwrap());
        drop(guard.admit(sig("b")).unwrap());
        assert_eq!(guard.tracked(), 2);

        clock.advance(Duration::seconds(2));
        assert_eq!(guard.tracked(), 0);
    }

    #[test]
    fn test_huge_linger_saturates() {
        let config = crate::config::CoreConfig::from_toml(
            "[guard]\nin_flight_linger_ms = 9223372036854775807",
        )
        .unwrap();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap(),
        ));
        let guard = DuplicateGuard::new(clock.clone(), config.guard);

        drop(guard.admit(sig("猫")).unwrap());
        clock.advance(Duration::days(3650));
        assert!(matches!(guard.admit(sig("猫")), Err(CaptureRejection::InFlight(_))));
        assert_eq!(guard.tracked(), 1);
    }
}
