use std::{fmt, ops::Deref, sync::Arc};

use serde::{Deserialize, Serialize};

/// Opaque id the panel uses to refer to a retained host object.
///
/// Ids are minted by the [`ObjectRegistry`](crate::ObjectRegistry) and stay
/// resolvable until the object is released. Ids received from the panel are
/// plain strings and may be stale; resolving them never fails loudly.
///
/// Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Arc<str>);

impl ObjectId {
    pub(crate) fn mint(prefix: &str, seq: u64) -> Self {
        Self(Arc::from(format!("{prefix}{seq}")))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for ObjectId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_id_format() {
        assert_eq!(ObjectId::mint("obj", 7).as_str(), "obj7");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = ObjectId::from("obj12");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"obj12\"");
        let back: ObjectId = serde_json::from_str("\"stale-1\"").unwrap();
        assert_eq!(back, ObjectId::from("stale-1"));
    }
}
