//! Validation gate
//!
//! Entry points:
//! - struct mode (`validate`): walk an entity's descriptor in declaration order
//! - patch mode (`validate_patch`): only the fields an update would write
//! - ad-hoc mode (`validate_each`, `validate_var`): apply rules to loose values
//!
//! All stop at the first violated rule and return its message. Rules on a
//! field run in the order they were declared, so required-ness should come
//! first, then length, then format.

use regex::Regex;
use serde_json::Value;

use super::errors::{ValidationFailure, ValidationResult};
use super::types::{is_zero, Entity, MutationMode, Rule};

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$";
const ALPHANUM_PATTERN: &str = r"^[A-Za-z0-9]+$";
const NUMERIC_PATTERN: &str = r"^[-+]?[0-9]+(\.[0-9]+)?$";

/// Shared validator service, built once at startup and passed to every module.
#[derive(Debug, Clone)]
pub struct Validator {
    email: Regex,
    alphanum: Regex,
    numeric: Regex,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            email: Regex::new(EMAIL_PATTERN).expect("email pattern compiles"),
            alphanum: Regex::new(ALPHANUM_PATTERN).expect("alphanum pattern compiles"),
            numeric: Regex::new(NUMERIC_PATTERN).expect("numeric pattern compiles"),
        }
    }

    /// Struct mode: check every field of `entity` against its descriptor.
    pub fn validate<E: Entity>(&self, entity: &E) -> ValidationResult {
        for spec in E::schema().fields() {
            let value = spec.value_of(entity);
            self.check(spec.name(), &value, spec.rule_list())?;
        }
        Ok(())
    }

    /// Patch mode: check only updatable fields that carry a value.
    ///
    /// Zero-valued fields are left out of an update, so their rules
    /// (`Required` included) do not apply.
    pub fn validate_patch<E: Entity>(&self, entity: &E) -> ValidationResult {
        for spec in E::schema().fields() {
            if !spec.tag().includes(MutationMode::Update) {
                continue;
            }
            let value = spec.value_of(entity);
            if is_zero(&value) {
                continue;
            }
            self.check(spec.name(), &value, spec.rule_list())?;
        }
        Ok(())
    }

    /// Ad-hoc mode: apply the same rules to each named value, in order.
    pub fn validate_each(&self, values: &[(&str, Value)], rules: &[Rule]) -> ValidationResult {
        for (name, value) in values {
            self.check(name, value, rules)?;
        }
        Ok(())
    }

    /// Ad-hoc mode for a single value
    pub fn validate_var(&self, name: &str, value: &Value, rules: &[Rule]) -> ValidationResult {
        self.check(name, value, rules)
    }

    fn check(&self, field: &str, value: &Value, rules: &[Rule]) -> ValidationResult {
        for rule in rules {
            if *rule == Rule::OmitEmpty {
                if is_zero(value) {
                    return Ok(());
                }
                continue;
            }
            if !self.passes(rule, value) {
                return Err(ValidationFailure::new(field, rule.name(), message(field, rule, value)));
            }
        }
        Ok(())
    }

    fn passes(&self, rule: &Rule, value: &Value) -> bool {
        match rule {
            Rule::Required => !is_zero(value),
            Rule::OmitEmpty => true,
            Rule::Min(n) => measure(value) >= *n as f64,
            Rule::Max(n) => measure(value) <= *n as f64,
            Rule::AlphaNum => value.as_str().is_some_and(|s| self.alphanum.is_match(s)),
            Rule::Numeric => match value {
                Value::Number(_) => true,
                Value::String(s) => self.numeric.is_match(s),
                _ => false,
            },
            Rule::Email => value.as_str().is_some_and(|s| self.email.is_match(s)),
        }
    }
}

/// Length for strings and arrays, magnitude for numbers
fn measure(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.chars().count() as f64,
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Array(a) => a.len() as f64,
        Value::Object(o) => o.len() as f64,
        Value::Bool(_) | Value::Null => 0.0,
    }
}

fn message(field: &str, rule: &Rule, value: &Value) -> String {
    let numeric = value.is_number();
    match rule {
        Rule::Required => format!("{} is a required field", field),
        Rule::Min(n) if numeric => format!("{} must be {} or greater", field, n),
        Rule::Min(n) => format!("{} must be at least {} characters in length", field, n),
        Rule::Max(n) if numeric => format!("{} must be {} or less", field, n),
        Rule::Max(n) => format!("{} must be a maximum of {} characters in length", field, n),
        Rule::AlphaNum => format!("{} can only contain alphanumeric characters", field),
        Rule::Numeric => format!("{} must be a valid numeric value", field),
        Rule::Email => format!("{} must be a valid email address", field),
        Rule::OmitEmpty => format!("{} is invalid", field),
    }
}
