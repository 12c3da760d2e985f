//! Scheduled restart announcements.
//!
//! The game host restarts its servers twice a day on a fixed schedule. A
//! once-a-minute check announces the pending restart in-game at the 20, 10,
//! 5, and 1 minute marks.

const RESTART_HOURS: [u32; 2] = [5, 18];

/// Announcement for the given server-local wall-clock time, if this minute
/// is one of the warning marks.
pub fn restart_announcement(hour: u32, minute: u32) -> Option<&'static str> {
    if !RESTART_HOURS.contains(&hour) {
        return None;
    }
    match minute {
        40 => Some("Server restart in 20 minutes"),
        50 => Some("Server restart in 10 minutes"),
        55 => Some("Server restart in 5 minutes"),
        59 => Some("Server restart in 1 minute"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announces_at_warning_marks_in_restart_hours() {
        assert_eq!(
            restart_announcement(5, 40),
            Some("Server restart in 20 minutes")
        );
        assert_eq!(
            restart_announcement(18, 59),
            Some("Server restart in 1 minute")
        );
    }

    #[test]
    fn silent_outside_restart_hours_and_marks() {
        assert_eq!(restart_announcement(12, 40), None);
        assert_eq!(restart_announcement(5, 41), None);
        assert_eq!(restart_announcement(18, 0), None);
    }
}
