//! Field rules for each request payload.

use super::validation::{FieldKind, ValidationRule};

pub const GOAL_TITLE_MAX: usize = 200;
pub const JOURNAL_CONTENT_MAX: usize = 5000;

const GOAL_TITLE: ValidationRule = ValidationRule::new("title", FieldKind::String)
    .length(1, GOAL_TITLE_MAX)
    .messages("Goal cannot be empty", "Goal is too long");
const GOAL_PRIORITY: ValidationRule = ValidationRule::new("priority", FieldKind::Integer).range(1, 3);
const JOURNAL_CONTENT: ValidationRule = ValidationRule::new("content", FieldKind::String)
    .length(1, JOURNAL_CONTENT_MAX)
    .messages("Journal entry cannot be empty", "Entry is too long");

pub const GOAL_CREATE: &[ValidationRule] = &[
    GOAL_TITLE.required(),
    GOAL_PRIORITY.required(),
    ValidationRule::new("weekStart", FieldKind::Date).required(),
    ValidationRule::new("completed", FieldKind::Boolean),
];

pub const GOAL_PATCH: &[ValidationRule] = &[
    GOAL_TITLE,
    GOAL_PRIORITY,
    ValidationRule::new("completed", FieldKind::Boolean),
];

pub const PROGRESS_UPSERT: &[ValidationRule] = &[
    ValidationRule::new("date", FieldKind::Date).required(),
    ValidationRule::new("goalsCompleted", FieldKind::Integer)
        .required()
        .range(0, 3),
    ValidationRule::new("totalGoals", FieldKind::Integer).range(1, 3),
];

pub const JOURNAL_CREATE: &[ValidationRule] = &[
    ValidationRule::new("weekStart", FieldKind::Date).required(),
    JOURNAL_CONTENT.required(),
];

pub const JOURNAL_PATCH: &[ValidationRule] = &[JOURNAL_CONTENT.required()];
