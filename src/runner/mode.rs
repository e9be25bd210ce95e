use std::fmt;
use std::time::Duration;

use crate::model::LoadProfile;
use crate::report::RunShape;

/// How virtual users are scheduled for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One virtual user runs every scenario once.
    SinglePass,
    /// `users` virtual users each run every scenario once.
    SinglePassPerUser { users: u64, ramp_up: Duration },
    /// `users` virtual users loop over the scenarios until `duration` elapses.
    Continuous {
        users: u64,
        ramp_up: Duration,
        duration: Duration,
    },
}

impl RunMode {
    /// Picks the mode for an optional profile. A missing profile or a
    /// non-positive user count means a single pass.
    #[must_use]
    pub fn from_profile(profile: Option<&LoadProfile>) -> Self {
        let Some(profile) = profile else {
            return Self::SinglePass;
        };
        let Ok(users) = u64::try_from(profile.users) else {
            return Self::SinglePass;
        };
        if users == 0 {
            return Self::SinglePass;
        }

        let ramp_up = profile.ramp_up.as_duration();
        let duration = profile.duration.as_duration();
        if duration.is_zero() {
            Self::SinglePassPerUser { users, ramp_up }
        } else {
            Self::Continuous {
                users,
                ramp_up,
                duration,
            }
        }
    }

    #[must_use]
    pub const fn users(&self) -> u64 {
        match self {
            Self::SinglePass => 1,
            Self::SinglePassPerUser { users, .. } | Self::Continuous { users, .. } => *users,
        }
    }

    /// Delay between consecutive virtual user starts. Ramp-up never exceeds
    /// the run duration.
    #[must_use]
    pub fn spawn_delay(&self) -> Duration {
        match self {
            Self::SinglePass | Self::SinglePassPerUser { .. } => Duration::ZERO,
            Self::Continuous {
                users,
                ramp_up,
                duration,
            } => {
                let ramp_up = (*ramp_up).min(*duration);
                let users = u32::try_from(*users).unwrap_or(u32::MAX).max(1);
                ramp_up.checked_div(users).unwrap_or_default()
            }
        }
    }

    #[must_use]
    pub const fn shape(&self, users_spawned: u64) -> RunShape {
        match self {
            Self::SinglePass => RunShape {
                users: 1,
                users_spawned,
                ramp_up_seconds: 0,
                target_duration_seconds: 0,
            },
            Self::SinglePassPerUser { users, ramp_up } => RunShape {
                users: *users,
                users_spawned,
                ramp_up_seconds: ramp_up.as_secs(),
                target_duration_seconds: 0,
            },
            Self::Continuous {
                users,
                ramp_up,
                duration,
            } => RunShape {
                users: *users,
                users_spawned,
                ramp_up_seconds: ramp_up.as_secs(),
                target_duration_seconds: duration.as_secs(),
            },
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SinglePass => f.write_str("single pass"),
            Self::SinglePassPerUser { users, .. } => {
                write!(f, "single pass per user ({} users)", users)
            }
            Self::Continuous {
                users,
                ramp_up,
                duration,
            } => write!(
                f,
                "continuous ({} users, ramp-up {}s, duration {}s)",
                users,
                ramp_up.as_secs(),
                duration.as_secs()
            ),
        }
    }
}
