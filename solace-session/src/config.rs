//! Security preferences consumed from the settings layer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The user's inactivity auto-lock selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoLockTimeout {
    /// Never lock on inactivity.
    Never,
    Minutes15,
    Hours1,
    Hours4,
    Hours8,
}

impl AutoLockTimeout {
    /// The idle duration after which the session locks, or `None` for never.
    pub fn as_duration(self) -> Option<Duration> {
        match self {
            AutoLockTimeout::Never => None,
            AutoLockTimeout::Minutes15 => Some(Duration::from_secs(15 * 60)),
            AutoLockTimeout::Hours1 => Some(Duration::from_secs(60 * 60)),
            AutoLockTimeout::Hours4 => Some(Duration::from_secs(4 * 60 * 60)),
            AutoLockTimeout::Hours8 => Some(Duration::from_secs(8 * 60 * 60)),
        }
    }
}

/// Security preferences for a session.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SecurityPrefs {
    /// Master switch for inactivity auto-lock.
    pub auto_lock_enabled: bool,
    /// Idle timeout selection.
    pub auto_lock: AutoLockTimeout,
}

impl Default for SecurityPrefs {
    fn default() -> Self {
        Self {
            auto_lock_enabled: true,
            auto_lock: AutoLockTimeout::Minutes15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_has_no_duration() {
        assert_eq!(AutoLockTimeout::Never.as_duration(), None);
    }

    #[test]
    fn durations_are_ordered() {
        let mins15 = AutoLockTimeout::Minutes15.as_duration().unwrap();
        let hrs1 = AutoLockTimeout::Hours1.as_duration().unwrap();
        let hrs4 = AutoLockTimeout::Hours4.as_duration().unwrap();
        let hrs8 = AutoLockTimeout::Hours8.as_duration().unwrap();
        assert!(mins15 < hrs1 && hrs1 < hrs4 && hrs4 < hrs8);
    }

    #[test]
    fn prefs_serialization_roundtrip() {
        let prefs = SecurityPrefs {
            auto_lock_enabled: false,
            auto_lock: AutoLockTimeout::Hours4,
        };
        let json = serde_json::to_string(&prefs).unwrap();
        let restored: SecurityPrefs = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.auto_lock, AutoLockTimeout::Hours4);
        assert!(!restored.auto_lock_enabled);
    }
}
