//! Declarative validation of raw environment maps.
//!
//! A [`ValidationSchema`] is a static list of rules checked in declaration
//! order. The first failing rule aborts validation, so the error always
//! names the first offending field and nothing partial is returned.

use std::collections::BTreeMap;

use crate::env_map::EnvironmentMap;
use crate::error::{ConfigError, Result};
use crate::{DB_HOST, DB_NAME, DB_PASSWORD, DB_PORT, DB_SCHEMA, DB_USER};

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Any non-empty string.
    Text,
    /// Base-10 integer within `[min, max]`.
    Integer { min: i64, max: i64 },
}

/// One required key and its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub key: &'static str,
    pub field_type: FieldType,
}

impl FieldRule {
    pub const fn text(key: &'static str) -> Self {
        FieldRule {
            key,
            field_type: FieldType::Text,
        }
    }

    pub const fn integer(key: &'static str, min: i64, max: i64) -> Self {
        FieldRule {
            key,
            field_type: FieldType::Integer { min, max },
        }
    }

    fn check(&self, raw: Option<&str>) -> Result<ValidatedValue> {
        let raw = match raw {
            Some(value) => value,
            None => return Err(ConfigError::validation(self.key, "is required")),
        };
        if raw.is_empty() {
            return Err(ConfigError::validation(
                self.key,
                "is not allowed to be empty",
            ));
        }

        match self.field_type {
            FieldType::Text => Ok(ValidatedValue::Text(raw.to_string())),
            FieldType::Integer { min, max } => {
                let number: i64 = raw.parse().map_err(|_| {
                    ConfigError::validation(self.key, format!("must be a number, got {:?}", raw))
                })?;
                if number < min || number > max {
                    return Err(ConfigError::validation(
                        self.key,
                        format!("must be between {} and {}, got {}", min, max, number),
                    ));
                }
                Ok(ValidatedValue::Integer(number))
            }
        }
    }
}

/// Immutable set of rules applied to an [`EnvironmentMap`].
#[derive(Debug, Clone, Copy)]
pub struct ValidationSchema {
    rules: &'static [FieldRule],
}

static DB_CONNECTION_RULES: [FieldRule; 6] = [
    FieldRule::text(DB_HOST),
    FieldRule::text(DB_NAME),
    FieldRule::text(DB_PASSWORD),
    FieldRule::integer(DB_PORT, 1, 65_535),
    FieldRule::text(DB_SCHEMA),
    FieldRule::text(DB_USER),
];

/// Schema for the database connection variables.
pub static DB_CONNECTION_SCHEMA: ValidationSchema = ValidationSchema::new(&DB_CONNECTION_RULES);

impl ValidationSchema {
    pub const fn new(rules: &'static [FieldRule]) -> Self {
        ValidationSchema { rules }
    }

    pub fn rules(&self) -> &'static [FieldRule] {
        self.rules
    }

    /// Validate `env` against every rule.
    ///
    /// Keys not named by the schema are ignored.
    pub fn validate(&self, env: &EnvironmentMap) -> Result<ValidatedEnv> {
        let mut values = BTreeMap::new();
        for rule in self.rules {
            let value = rule.check(env.get(rule.key))?;
            values.insert(rule.key, value);
        }
        Ok(ValidatedEnv { values })
    }
}

/// A value normalized to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedValue {
    Text(String),
    Integer(i64),
}

/// Output of a successful validation: every rule's key, typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEnv {
    values: BTreeMap<&'static str, ValidatedValue>,
}

impl ValidatedEnv {
    pub fn get(&self, key: &str) -> Option<&ValidatedValue> {
        self.values.get(key)
    }

    /// Text value of `key`.
    pub fn text(&self, key: &str) -> Result<&str> {
        match self.values.get(key) {
            Some(ValidatedValue::Text(value)) => Ok(value),
            Some(ValidatedValue::Integer(_)) => {
                Err(ConfigError::validation(key, "is declared as a number"))
            }
            None => Err(ConfigError::validation(key, "is not declared by the schema")),
        }
    }

    /// Integer value of `key`.
    pub fn integer(&self, key: &str) -> Result<i64> {
        match self.values.get(key) {
            Some(ValidatedValue::Integer(value)) => Ok(*value),
            Some(ValidatedValue::Text(_)) => Err(ConfigError::validation(key, "is declared as text")),
            None => Err(ConfigError::validation(key, "is not declared by the schema")),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
