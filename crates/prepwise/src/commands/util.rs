//! Shared helpers for command handlers.

use chrono::{DateTime, Utc};

use prepwise_core::feed::{parse_kind_selector, parse_severity_selector};
use prepwise_core::{AlertFilter, ContactKind, Coordinates, Severity};

use crate::cli::{AlertFilterArgs, LocationArgs};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::validation("interactive", format!("prompt failed: {e}"))
}

/// Coordinates from `--lat/--lng`, validated. `None` when both are absent.
pub fn location(args: &LocationArgs) -> Result<Option<Coordinates>, CliError> {
    match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(CliError::validation("lat", format!("{lat} is out of range")));
            }
            if !(-180.0..=180.0).contains(&lng) {
                return Err(CliError::validation("lng", format!("{lng} is out of range")));
            }
            Ok(Some(Coordinates::new(lat, lng)))
        }
        (None, None) => Ok(None),
        _ => Err(CliError::validation("location", "pass both --lat and --lng")),
    }
}

pub fn parse_severity(raw: &str) -> Result<Severity, CliError> {
    raw.parse()
        .map_err(|_| CliError::validation("severity", format!("unknown severity: {raw}")))
}

pub fn alert_filter(args: &AlertFilterArgs) -> Result<AlertFilter, CliError> {
    Ok(AlertFilter {
        active_only: args.active,
        kind: parse_kind_selector(&args.kind),
        severity: parse_severity_selector(&args.severity)
            .map_err(|reason| CliError::validation("severity", reason))?,
    })
}

pub fn parse_contact_kind(raw: &str) -> Result<ContactKind, CliError> {
    raw.trim()
        .replace(['-', ' '], "_")
        .parse()
        .map_err(|_| CliError::validation("type", format!("unknown contact type: {raw}")))
}

/// Join positional words into one prompt.
pub fn joined(words: &[String]) -> String {
    words.join(" ")
}

pub fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn location_needs_both_halves() {
        let half = LocationArgs {
            lat: Some(10.0),
            lng: None,
        };
        assert!(location(&half).is_err());

        let none = LocationArgs {
            lat: None,
            lng: None,
        };
        assert_eq!(location(&none).unwrap(), None);

        let bad = LocationArgs {
            lat: Some(91.0),
            lng: Some(0.0),
        };
        assert!(location(&bad).is_err());
    }

    #[test]
    fn contact_kind_accepts_dashes() {
        assert_eq!(
            parse_contact_kind("disaster-management").unwrap(),
            ContactKind::DisasterManagement
        );
        assert!(parse_contact_kind("plumber").is_err());
    }

    #[test]
    fn filter_rejects_unknown_severity() {
        let args = AlertFilterArgs {
            kind: "flood".into(),
            severity: "extreme".into(),
            active: false,
        };
        assert!(alert_filter(&args).is_err());
    }
}
