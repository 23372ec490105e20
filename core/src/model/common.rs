//! Attributes, resources and scopes shared by every signal

use serde::{Deserialize, Serialize};

/// A single string-valued attribute.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message, Serialize, Deserialize)]
pub struct KeyValue {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

impl KeyValue {
    /// Create a new attribute
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Map-like access over an attribute list.
///
/// Keys are unique: `put_str` overwrites the value of an existing key in
/// place, so the last write wins. Order carries no meaning.
pub trait AttributeMap {
    /// Insert or overwrite `key`
    fn put_str(&mut self, key: &str, value: &str);

    /// Look up the value stored under `key`
    fn get(&self, key: &str) -> Option<&str>;

    /// Overlay every attribute of `other`, later entries winning
    fn put_all(&mut self, other: &[KeyValue]) {
        for attr in other {
            self.put_str(&attr.key, &attr.value);
        }
    }
}

impl AttributeMap for Vec<KeyValue> {
    fn put_str(&mut self, key: &str, value: &str) {
        match self.iter_mut().find(|attr| attr.key == key) {
            Some(existing) => value.clone_into(&mut existing.value),
            None => self.push(KeyValue::new(key, value)),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }
}

/// Entity producing the telemetry (service identity and friends).
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    #[prost(message, repeated, tag = "1")]
    pub attributes: Vec<KeyValue>,
    #[prost(uint32, tag = "2")]
    pub dropped_attributes_count: u32,
}

impl Resource {
    /// Build a resource from a list of attributes, deduplicating keys
    pub fn from_attributes<I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = KeyValue>,
    {
        let mut attrs = Vec::new();
        for attr in attributes {
            attrs.put_str(&attr.key, &attr.value);
        }
        Self {
            attributes: attrs,
            dropped_attributes_count: 0,
        }
    }

    /// Value of the `service.name` attribute, if set
    pub fn service_name(&self) -> Option<&str> {
        self.attributes.get("service.name")
    }
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentationScope {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub version: String,
}

/// Serde adapter writing binary ids as lowercase hex strings.
pub mod hex_id {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn decode(text: &str) -> Option<Vec<u8>> {
        if text.len() % 2 != 0 {
            return None;
        }
        (0..text.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
            .collect()
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode(&text).ok_or_else(|| D::Error::custom(format!("invalid hex id: {text}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_str_last_write_wins() {
        let mut attrs = vec![KeyValue::new("a", "1")];
        attrs.put_str("a", "2");
        attrs.put_str("b", "3");

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("a"), Some("2"));
        assert_eq!(attrs.get("b"), Some("3"));
        assert_eq!(attrs.get("c"), None);
    }

    #[test]
    fn test_resource_dedupes_keys() {
        let resource = Resource::from_attributes([
            KeyValue::new("service.name", "first"),
            KeyValue::new("service.name", "second"),
        ]);
        assert_eq!(resource.attributes.len(), 1);
        assert_eq!(resource.service_name(), Some("second"));
    }

    #[test]
    fn test_hex_id() {
        let id = [0x0a, 0xff, 0x00, 0x42];
        assert_eq!(hex_id::encode(&id), "0aff0042");
        assert_eq!(hex_id::decode("0aff0042"), Some(id.to_vec()));
        assert_eq!(hex_id::decode("abc"), None);
        assert_eq!(hex_id::decode("zz"), None);
    }
}
