//! Course settings form: field collection and the live character counters.

use minicourse_common::CourseSettings;

use crate::platform::Platform;
use crate::types::FormField;

/// A soft length limit with an authoring hint.
///
/// Going over the limit only flags the counter; nothing is truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCounter {
    pub limit: usize,
    pub hint: &'static str,
}

impl CharCounter {
    pub const OUTCOME: CharCounter = CharCounter {
        limit: 200,
        hint: "Keep it specific and actionable!",
    };

    pub const AUDIENCE: CharCounter = CharCounter {
        limit: 300,
        hint: "Focus on their starting point and goals.",
    };

    /// Counter text for `value`, and whether it is over the limit.
    pub fn render(&self, value: &str) -> (String, bool) {
        let len = value.chars().count();
        (
            format!("{}/{} characters. {}", len, self.limit, self.hint),
            len > self.limit,
        )
    }
}

/// Fields that carry a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    Outcome,
    Audience,
}

impl CounterKind {
    pub const ALL: [CounterKind; 2] = [CounterKind::Outcome, CounterKind::Audience];

    pub fn counter(&self) -> CharCounter {
        match self {
            CounterKind::Outcome => CharCounter::OUTCOME,
            CounterKind::Audience => CharCounter::AUDIENCE,
        }
    }

    pub fn field(&self) -> FormField {
        match self {
            CounterKind::Outcome => FormField::CourseOutcome,
            CounterKind::Audience => FormField::CourseAudience,
        }
    }
}

/// Collect the settings form. Absent fields read as empty.
pub fn read_settings<P: Platform>(platform: &P) -> CourseSettings {
    let read = |field| platform.read_field(field).unwrap_or_default();
    CourseSettings {
        title: read(FormField::CourseTitle),
        description: read(FormField::CourseDescription),
        outcome: read(FormField::CourseOutcome),
        audience: read(FormField::CourseAudience),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_counter_text() {
        let (text, over) = CharCounter::OUTCOME.render("Bake bread");
        assert_eq!(text, "10/200 characters. Keep it specific and actionable!");
        assert!(!over);
    }

    #[test]
    fn test_counter_flags_over_limit_only_past_limit() {
        let at_limit = "a".repeat(300);
        assert!(!CharCounter::AUDIENCE.render(&at_limit).1);
        let past = "a".repeat(301);
        let (text, over) = CharCounter::AUDIENCE.render(&past);
        assert!(over);
        assert_eq!(
            text,
            "301/300 characters. Focus on their starting point and goals."
        );
    }

    #[test]
    fn test_counter_counts_characters_not_bytes() {
        let (text, _) = CharCounter::OUTCOME.render("héllo");
        assert!(text.starts_with("5/200"));
    }
}
