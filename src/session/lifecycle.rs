//! Wall-clock session lifecycle, independent of game phase.
//!
//! A session is `Active` until it sits idle past the inactivity threshold,
//! `TimedOut` until the player resumes or the hard threshold expires, and
//! `AutoClosed` once the watchdog force-settles it. Transitions are driven
//! by elapsed wall-clock time, so a delayed watchdog tick only delays a
//! transition, never skips it.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    TimedOut,
    /// Terminal: the watchdog settled the session without player action
    AutoClosed,
}

/// Timing knobs for the session watchdog
#[derive(Debug, Clone, Copy)]
pub struct LifecycleConfig {
    /// Continuous inactivity before an Active session is suspended
    pub inactivity_timeout: Duration,
    /// Further inactivity, measured from entering TimedOut, before the
    /// session is force-settled
    pub hard_timeout: Duration,
    /// Watchdog poll interval
    pub check_interval: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(2 * 60),
            hard_timeout: Duration::from_secs(8 * 60),
            check_interval: Duration::from_secs(15),
        }
    }
}

/// What the watchdog should do with a session right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessCheck {
    Healthy,
    SuspendNow,
    AutoCloseNow,
}

impl LifecycleConfig {
    pub fn evaluate(
        &self,
        state: LifecycleState,
        last_action: Instant,
        timed_out_at: Option<Instant>,
        now: Instant,
    ) -> LivenessCheck {
        match state {
            LifecycleState::Active => {
                if now.duration_since(last_action) > self.inactivity_timeout {
                    LivenessCheck::SuspendNow
                } else {
                    LivenessCheck::Healthy
                }
            }
            LifecycleState::TimedOut => match timed_out_at {
                Some(since) if now.duration_since(since) > self.hard_timeout => {
                    LivenessCheck::AutoCloseNow
                }
                _ => LivenessCheck::Healthy,
            },
            LifecycleState::AutoClosed => LivenessCheck::Healthy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LifecycleConfig {
        LifecycleConfig {
            inactivity_timeout: Duration::from_secs(120),
            hard_timeout: Duration::from_secs(480),
            check_interval: Duration::from_secs(15),
        }
    }

    #[test]
    fn test_active_session_times_out_after_inactivity() {
        let cfg = config();
        let now = Instant::now();

        let fresh = cfg.evaluate(LifecycleState::Active, now, None, now);
        assert_eq!(fresh, LivenessCheck::Healthy);

        let stale = now + Duration::from_secs(121);
        assert_eq!(
            cfg.evaluate(LifecycleState::Active, now, None, stale),
            LivenessCheck::SuspendNow
        );
    }

    #[test]
    fn test_timed_out_session_hard_expires() {
        let cfg = config();
        let now = Instant::now();
        let suspended_at = now;

        let early = now + Duration::from_secs(100);
        assert_eq!(
            cfg.evaluate(LifecycleState::TimedOut, now, Some(suspended_at), early),
            LivenessCheck::Healthy
        );

        let late = now + Duration::from_secs(481);
        assert_eq!(
            cfg.evaluate(LifecycleState::TimedOut, now, Some(suspended_at), late),
            LivenessCheck::AutoCloseNow
        );
    }

    #[test]
    fn test_auto_closed_is_terminal() {
        let cfg = config();
        let now = Instant::now();
        let much_later = now + Duration::from_secs(3600);
        assert_eq!(
            cfg.evaluate(LifecycleState::AutoClosed, now, Some(now), much_later),
            LivenessCheck::Healthy
        );
    }
}
