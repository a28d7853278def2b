use serde_json::Value;

/// A bound value, or the marker for an optional spec that received no input.
///
/// `Slot::Omitted` is its own variant, so it never equals a filled slot, not
/// even `Slot::Filled(Value::Null)` or an empty string.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    Filled(Value),
    #[default]
    Omitted,
}

/// The omitted marker.
pub const OMITTED: Slot = Slot::Omitted;

impl Slot {
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Filled(value) => Some(value),
            Self::Omitted => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value().and_then(Value::as_str)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value().and_then(Value::as_bool)
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Self::Filled(value)
    }
}

impl PartialEq<Value> for Slot {
    fn eq(&self, other: &Value) -> bool {
        self.value() == Some(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omitted_differs_from_every_value() {
        assert_ne!(OMITTED, Slot::Filled(Value::Null));
        assert_ne!(OMITTED, Slot::Filled(json!("")));
        assert_ne!(OMITTED, Value::Null);
        assert!(OMITTED.is_omitted());
        assert_eq!(OMITTED.value(), None);
    }

    #[test]
    fn filled_accessors() {
        let slot = Slot::from(json!(2.5));
        assert_eq!(slot, json!(2.5));
        assert_eq!(slot.as_f64(), Some(2.5));
        assert_eq!(slot.as_str(), None);
        assert_eq!(Slot::from(json!(true)).as_bool(), Some(true));
    }
}
