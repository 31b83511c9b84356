//! Request validation against per-field rules. Every violation is collected, not just the first.

use crate::error::{AppError, FieldViolation};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    /// `YYYY-MM-DD`, and a real calendar date.
    Date,
}

#[derive(Clone, Debug)]
pub struct ValidationRule {
    pub field: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    pub too_short: Option<&'static str>,
    pub too_long: Option<&'static str>,
}

impl ValidationRule {
    pub const fn new(field: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            kind,
            required: false,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            too_short: None,
            too_long: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }

    pub const fn messages(mut self, too_short: &'static str, too_long: &'static str) -> Self {
        self.too_short = Some(too_short);
        self.too_long = Some(too_long);
        self
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against rules. Required fields must be present and non-null.
    pub fn validate(body: &Map<String, Value>, rules: &[ValidationRule]) -> Result<(), AppError> {
        let mut violations = Vec::new();
        for rule in rules {
            match body.get(rule.field) {
                None | Some(Value::Null) => {
                    if rule.required {
                        violations.push(FieldViolation::new(rule.field, "Required"));
                    }
                }
                Some(v) => validate_field(v, rule, &mut violations),
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(violations))
        }
    }
}

fn validate_field(v: &Value, rule: &ValidationRule, out: &mut Vec<FieldViolation>) {
    let field = rule.field;
    match rule.kind {
        FieldKind::String => {
            let Some(s) = v.as_str() else {
                out.push(FieldViolation::new(field, "Expected string"));
                return;
            };
            let len = s.chars().count();
            if let Some(min) = rule.min_length {
                if len < min {
                    let msg = rule
                        .too_short
                        .map(String::from)
                        .unwrap_or_else(|| format!("Must be at least {} characters", min));
                    out.push(FieldViolation::new(field, msg));
                }
            }
            if let Some(max) = rule.max_length {
                if len > max {
                    let msg = rule
                        .too_long
                        .map(String::from)
                        .unwrap_or_else(|| format!("Must be at most {} characters", max));
                    out.push(FieldViolation::new(field, msg));
                }
            }
        }
        FieldKind::Integer => {
            let Some(n) = v.as_i64() else {
                out.push(FieldViolation::new(field, "Expected integer"));
                return;
            };
            if let Some(min) = rule.minimum {
                if n < min {
                    out.push(FieldViolation::new(field, format!("Must be at least {}", min)));
                }
            }
            if let Some(max) = rule.maximum {
                if n > max {
                    out.push(FieldViolation::new(field, format!("Must be at most {}", max)));
                }
            }
        }
        FieldKind::Boolean => {
            if !v.is_boolean() {
                out.push(FieldViolation::new(field, "Expected boolean"));
            }
        }
        FieldKind::Date => match v.as_str() {
            Some(s) if is_date(s) => {}
            Some(_) => out.push(FieldViolation::new(field, "Expected date in YYYY-MM-DD format")),
            None => out.push(FieldViolation::new(field, "Expected string")),
        },
    }
}

fn date_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("static date pattern")
    })
}

/// Parse a `YYYY-MM-DD` string naming a real calendar date in years 1..=9999.
/// Year 0 parses in chrono but PostgreSQL DATE has no year 0.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if !date_shape().is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .filter(|d| d.year() >= 1)
}

pub fn is_date(s: &str) -> bool {
    parse_date(s).is_some()
}
