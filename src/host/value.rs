use std::fmt;

use super::{ObjectRef, same_object};

/// A value reachable from the host tree: a live object or a plain scalar.
///
/// Objects (including ordered collections) have identity and can be
/// retained; scalars are copied by value and never retained.
#[derive(Clone)]
pub enum HostValue {
    Object(ObjectRef),
    Scalar(Scalar),
}

impl HostValue {
    pub fn string(value: impl Into<String>) -> Self {
        HostValue::Scalar(Scalar::String(value.into()))
    }

    pub fn number(value: f64) -> Self {
        HostValue::Scalar(Scalar::Number(value))
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            HostValue::Object(object) => Some(object),
            HostValue::Scalar(_) => None,
        }
    }

    /// Falsy values are treated as absent when attaching models.
    pub fn is_truthy(&self) -> bool {
        match self {
            HostValue::Object(_) => true,
            HostValue::Scalar(scalar) => scalar.is_truthy(),
        }
    }

    /// Strict identity: objects by pointer, scalars by value.
    pub fn same_as(&self, other: &HostValue) -> bool {
        match (self, other) {
            (HostValue::Object(a), HostValue::Object(b)) => same_object(a, b),
            (HostValue::Scalar(a), HostValue::Scalar(b)) => a == b,
            _ => false,
        }
    }
}

impl From<ObjectRef> for HostValue {
    fn from(object: ObjectRef) -> Self {
        HostValue::Object(object)
    }
}

impl From<Scalar> for HostValue {
    fn from(scalar: Scalar) -> Self {
        HostValue::Scalar(scalar)
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Object(object) => write!(f, "Object({})", object.class_name()),
            HostValue::Scalar(scalar) => write!(f, "Scalar({scalar:?})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Runtime type name used in `scalar-<type>` kind tags.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Undefined => "undefined",
            Scalar::Null => "null",
            Scalar::Boolean(_) => "boolean",
            Scalar::Number(_) => "number",
            Scalar::String(_) => "string",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Undefined | Scalar::Null => false,
            Scalar::Boolean(b) => *b,
            Scalar::Number(n) => *n != 0.0 && !n.is_nan(),
            Scalar::String(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Undefined => write!(f, "undefined"),
            Scalar::Null => write!(f, "null"),
            Scalar::Boolean(b) => write!(f, "{b}"),
            Scalar::Number(n) if n.is_nan() => write!(f, "NaN"),
            Scalar::Number(n) if n.is_infinite() => {
                write!(f, "{}Infinity", if *n < 0.0 { "-" } else { "" })
            }
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => write!(f, "{s}"),
        }
    }
}
