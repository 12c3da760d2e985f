//! Player-facing notices.

use std::sync::LazyLock;

use regex::Regex;

/// The log files append a disambiguation counter to every display name,
/// e.g. `jacobdgraham02(102)`. Notices read better without it.
static NAME_COUNTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([0-9]{1,10}\)$").expect("name counter regex must compile"));

pub fn chat_display_name(stored_name: &str) -> String {
    NAME_COUNTER_REGEX.replace(stored_name.trim(), "").into_owned()
}

pub fn unknown_package_notice(display_name: &str, command_name: &str) -> String {
    format!("{display_name}, there is no package named '{command_name}'.")
}

pub fn insufficient_balance_notice(display_name: &str) -> String {
    format!(
        "{display_name}, you do not have enough money to use this package. Use the balance command to check your balance."
    )
}

pub fn welcome_kit_balance_notice(display_name: &str) -> String {
    format!(
        "{display_name}, you do not have enough money to use your welcome kit again. Use the balance command to check your balance."
    )
}

pub fn unauthorized_package_notice(display_name: &str, command_name: &str) -> String {
    format!("{display_name}, the '{command_name}' package is not available to you.")
}

pub fn unknown_teleport_notice(display_name: &str, location: &str) -> String {
    format!("{display_name}, there is no teleport location named '{location}'.")
}
