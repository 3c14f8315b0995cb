// ── Alert projection filter ──

use crate::model::{Alert, HazardKind, Severity};

/// Three independent predicates, ANDed. `None` disables a predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertFilter {
    pub active_only: bool,
    pub kind: Option<HazardKind>,
    pub severity: Option<Severity>,
}

impl AlertFilter {
    pub fn kind(mut self, kind: HazardKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        (!self.active_only || alert.active)
            && self.kind.as_ref().is_none_or(|k| *k == alert.kind)
            && self.severity.is_none_or(|s| s == alert.severity)
    }
}

/// Parse a kind selector where `all` disables the predicate.
pub fn parse_kind_selector(raw: &str) -> Option<HazardKind> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(HazardKind::from(raw))
    }
}

/// Parse a severity selector where `all` disables the predicate.
/// Unrecognised values are an error rather than silently matching nothing.
pub fn parse_severity_selector(raw: &str) -> Result<Option<Severity>, String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| format!("unknown severity: {raw}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn all_disables_predicates() {
        assert_eq!(parse_kind_selector("all"), None);
        assert_eq!(parse_kind_selector("Fire"), Some(HazardKind::Fire));
        assert_eq!(parse_severity_selector("ALL").unwrap(), None);
        assert_eq!(
            parse_severity_selector("high").unwrap(),
            Some(Severity::High)
        );
        assert!(parse_severity_selector("extreme").is_err());
    }
}
