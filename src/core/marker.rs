use crate::core::kinds::MarkerKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The Alias for serde_json::Value, used for marker field values.
pub type MarkerValue = serde_json::Value;

/// A typed marker: a plain data struct that can be attached to a method.
///
/// The struct's fields become the [`MarkerInstance`] payload, so aspects can
/// decode them back with [`MarkerInstance::decode`].
pub trait Marker: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The kind every instance of this marker carries.
    const KIND: &'static str;

    fn kind() -> MarkerKind {
        MarkerKind::new(Self::KIND)
    }
}

/// One concrete occurrence of a marker on a method.
///
/// Several instances of the same [`MarkerKind`] may sit on one method, each
/// carrying its own payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerInstance {
    kind: MarkerKind,
    payload: MarkerValue,
}

impl MarkerInstance {
    /// Creates an instance without fields.
    pub fn new(kind: impl Into<MarkerKind>) -> Self {
        Self {
            kind: kind.into(),
            payload: MarkerValue::Object(Default::default()),
        }
    }

    /// Creates an instance carrying an arbitrary payload.
    pub fn with_payload(kind: impl Into<MarkerKind>, payload: MarkerValue) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Creates an instance from a typed marker.
    pub fn from_marker<M: Marker>(marker: &M) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: M::kind(),
            payload: serde_json::to_value(marker)?,
        })
    }

    /// Sets a single field. A non-object payload is replaced by an object.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<MarkerValue>) -> Self {
        if !self.payload.is_object() {
            log::warn!(
                "Marker '{}' payload is not an object, replacing it to set field.",
                self.kind
            );
            self.payload = MarkerValue::Object(Default::default());
        }
        if let Some(map) = self.payload.as_object_mut() {
            map.insert(name.into(), value.into());
        }
        self
    }

    pub fn kind(&self) -> &MarkerKind {
        &self.kind
    }

    pub fn payload(&self) -> &MarkerValue {
        &self.payload
    }

    pub fn field(&self, name: &str) -> Option<&MarkerValue> {
        self.payload.get(name)
    }

    /// Decodes the payload back into a typed marker.
    pub fn decode<M: DeserializeOwned>(&self) -> Result<M, serde_json::Error> {
        M::deserialize(&self.payload)
    }
}
