use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Namespaced event name, written `namespace:action` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventName {
    namespace: Arc<str>,
    action: Arc<str>,
}

impl EventName {
    pub fn new(namespace: impl Into<Arc<str>>, action: impl Into<Arc<str>>) -> Self {
        Self {
            namespace: namespace.into(),
            action: action.into(),
        }
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn action(&self) -> &str {
        &self.action
    }
}

impl FromStr for EventName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((namespace, action)) if !namespace.is_empty() && !action.is_empty() => {
                Ok(EventName::new(namespace, action))
            }
            _ => Err(Error::InvalidEventName(Arc::from(s))),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.action)
    }
}

impl Serialize for EventName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One protocol message: an event name plus a flat object payload.
///
/// On the wire the name travels in the `type` field next to the payload
/// fields: `{"type": "view:showLayer", "objectId": "obj3"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub name: EventName,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Message {
    /// Builds a message from any payload serializing to an object.
    /// Unit and `null` payloads produce an empty payload.
    pub fn new<P: Serialize>(name: EventName, payload: P) -> Result<Self> {
        let payload = match serde_json::to_value(payload)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Ok(Self { name, payload })
    }

    /// Decodes the payload into a typed command.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.payload.clone()))?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
