//! Well-known entity state strings.
//!
//! Hub states are free-form strings (`"on"`, `"cool"`, `"armed_away"`,
//! `"21.5"`, …). Only the values the bridge interprets are listed here.

pub const ON: &str = "on";
pub const OFF: &str = "off";
pub const UNAVAILABLE: &str = "unavailable";
pub const UNKNOWN: &str = "unknown";

pub const OPEN: &str = "open";
pub const CLOSED: &str = "closed";

pub const LOCKED: &str = "locked";
pub const UNLOCKED: &str = "unlocked";

pub const STANDBY: &str = "standby";

pub const ALARM_DISARMED: &str = "disarmed";
pub const ALARM_ARMED_AWAY: &str = "armed_away";
pub const ALARM_ARMED_HOME: &str = "armed_home";
pub const ALARM_ARMED_NIGHT: &str = "armed_night";
pub const ALARM_ARMED_CUSTOM_BYPASS: &str = "armed_custom_bypass";

/// Whether the entity is reachable (anything but [`UNAVAILABLE`]).
#[must_use]
pub fn is_available(state: &str) -> bool {
    state != UNAVAILABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_available_when_state_is_on() {
        assert!(is_available(ON));
    }

    #[test]
    fn should_report_available_when_state_is_unknown() {
        assert!(is_available(UNKNOWN));
    }

    #[test]
    fn should_report_unavailable_when_state_is_unavailable() {
        assert!(!is_available(UNAVAILABLE));
    }
}
