//! Argument values and their coercion rules
//!
//! Argument values arrive as loosely typed JSON (literals converted from the
//! query document, or variables from the request). Each one is coerced into
//! an [`ArgValue`] according to the [`ScalarKind`] its schema declares; any
//! mismatch becomes [`DomainError::InvalidArgument`].

use crate::core::error::{DomainError, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// Scalar kinds an argument can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Float,
    String,
    Boolean,
}

impl ScalarKind {
    /// GraphQL name of the scalar type
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::String => "String",
            ScalarKind::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A coerced argument value
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

impl ArgValue {
    /// Coerce a raw value into the declared kind
    ///
    /// Int accepts only integral numbers within the 32-bit range. Float also
    /// accepts integers. String and Boolean accept only their own JSON type.
    pub fn coerce(argument: &str, kind: ScalarKind, raw: &Value) -> Result<Self> {
        let mismatch = || {
            DomainError::invalid_argument(
                argument,
                format!("{} cannot represent value {}", kind, raw),
            )
        };

        match (kind, raw) {
            (_, Value::Null) => Ok(ArgValue::Null),
            (ScalarKind::Int, Value::Number(n)) => {
                let i = n.as_i64().ok_or_else(mismatch)?;
                if i32::try_from(i).is_err() {
                    return Err(DomainError::invalid_argument(
                        argument,
                        format!("Int cannot represent non 32-bit signed integer value {}", i),
                    ));
                }
                Ok(ArgValue::Int(i))
            }
            (ScalarKind::Float, Value::Number(n)) => {
                n.as_f64().map(ArgValue::Float).ok_or_else(mismatch)
            }
            (ScalarKind::String, Value::String(s)) => Ok(ArgValue::String(s.clone())),
            (ScalarKind::Boolean, Value::Bool(b)) => Ok(ArgValue::Boolean(*b)),
            _ => Err(mismatch()),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgValue::Float(f) => Some(*f),
            ArgValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }
}

/// The coerced arguments of one field invocation
///
/// Absent and explicitly-null arguments both read as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: IndexMap<String, ArgValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Required integer argument
    pub fn int(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        value
            .as_int()
            .ok_or_else(|| DomainError::invalid_argument(name, "expected an Int"))
    }

    /// Required float argument (integers are widened)
    pub fn float(&self, name: &str) -> Result<f64> {
        let value = self.require(name)?;
        value
            .as_float()
            .ok_or_else(|| DomainError::invalid_argument(name, "expected a Float"))
    }

    /// Required string argument
    pub fn string(&self, name: &str) -> Result<String> {
        let value = self.require(name)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DomainError::invalid_argument(name, "expected a String"))
    }

    /// Optional string argument; present values must still be strings
    pub fn optional_string(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| DomainError::invalid_argument(name, "expected a String")),
        }
    }

    fn require(&self, name: &str) -> Result<&ArgValue> {
        self.get(name).ok_or_else(|| {
            DomainError::invalid_argument(name, "required argument was not provided")
        })
    }
}
