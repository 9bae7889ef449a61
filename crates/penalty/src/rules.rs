//! Per-penalty-type rules: severity, duration, threshold, and ban length.

use std::collections::HashMap;

use voting_types::PenaltyType;

/// A single penalty type's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyRule {
    /// Severity recorded on each applied record (copied from [`PenaltyType::severity`]).
    pub severity: u8,
    /// How long a single record counts toward the threshold, in seconds.
    pub duration_secs: i64,
    /// Active-record count at which the validator is sanctioned.
    pub max_count: u32,
    /// Sanction length in seconds; `0` means a permanent ban.
    pub ban_duration_secs: i64,
}

/// Build the default rule table.
pub fn default_rules() -> HashMap<PenaltyType, PenaltyRule> {
    let mut rules = HashMap::new();
    rules.insert(
        PenaltyType::MissedRound,
        PenaltyRule {
            severity: PenaltyType::MissedRound.severity(),
            duration_secs: 30 * 60,
            max_count: 5,
            ban_duration_secs: 24 * 60 * 60,
        },
    );
    rules.insert(
        PenaltyType::InvalidBlock,
        PenaltyRule {
            severity: PenaltyType::InvalidBlock.severity(),
            duration_secs: 2 * 60 * 60,
            max_count: 3,
            ban_duration_secs: 48 * 60 * 60,
        },
    );
    rules.insert(
        PenaltyType::DoubleSign,
        PenaltyRule {
            severity: PenaltyType::DoubleSign.severity(),
            duration_secs: 24 * 60 * 60,
            max_count: 1,
            ban_duration_secs: 7 * 24 * 60 * 60,
        },
    );
    rules.insert(
        PenaltyType::Timeout,
        PenaltyRule {
            severity: PenaltyType::Timeout.severity(),
            duration_secs: 15 * 60,
            max_count: 10,
            ban_duration_secs: 12 * 60 * 60,
        },
    );
    rules.insert(
        PenaltyType::MaliciousBehavior,
        PenaltyRule {
            severity: PenaltyType::MaliciousBehavior.severity(),
            duration_secs: 7 * 24 * 60 * 60,
            max_count: 1,
            ban_duration_secs: 0,
        },
    );
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_penalty_type() {
        let rules = default_rules();
        assert_eq!(rules.len(), 5);
        assert!(rules.contains_key(&PenaltyType::MaliciousBehavior));
    }
}
