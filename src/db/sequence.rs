//! Id sequence drift detection and repair.

use serde::Serialize;

/// Observed state of a table's id sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceState {
    pub table: String,
    /// `None` for an empty table.
    pub max_id: Option<i64>,
    /// Last id the sequence handed out.
    pub last_value: i64,
}

/// What to do about a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SequenceRepair {
    InSync,
    /// The sequence lags the table; the next id must become `next`.
    Advance { next: i64 },
}

/// The sequence must never hand out an id at or below the current maximum.
pub fn plan_sequence_repair(state: &SequenceState) -> SequenceRepair {
    match state.max_id {
        Some(max_id) if max_id > state.last_value => SequenceRepair::Advance { next: max_id + 1 },
        _ => SequenceRepair::InSync,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(max_id: Option<i64>, last_value: i64) -> SequenceState {
        SequenceState {
            table: "saved_prompts".to_string(),
            max_id,
            last_value,
        }
    }

    #[test]
    fn lagging_sequence_advances_past_max() {
        assert_eq!(
            plan_sequence_repair(&state(Some(42), 40)),
            SequenceRepair::Advance { next: 43 }
        );
    }

    #[test]
    fn leading_sequence_is_left_alone() {
        assert_eq!(plan_sequence_repair(&state(Some(10), 40)), SequenceRepair::InSync);
    }

    #[test]
    fn equal_values_are_in_sync() {
        assert_eq!(plan_sequence_repair(&state(Some(40), 40)), SequenceRepair::InSync);
    }

    #[test]
    fn empty_table_is_in_sync() {
        assert_eq!(plan_sequence_repair(&state(None, 0)), SequenceRepair::InSync);
    }
}
