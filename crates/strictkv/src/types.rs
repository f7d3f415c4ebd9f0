//! Value types shared between the facade and store implementations

/// One slot of a batched read
///
/// Stores report a missing key (or a key holding a non-string value) as
/// `Empty` rather than an error; absence is not a failure at batch level.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Slot {
    #[default]
    Empty,
    Value(String),
}

impl Slot {
    /// Collapse into a plain string, using `""` for an empty slot
    pub fn into_string(self) -> String {
        match self {
            Slot::Empty => String::new(),
            Slot::Value(v) => v,
        }
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Slot::Empty => None,
            Slot::Value(v) => Some(v),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

impl From<Option<String>> for Slot {
    fn from(value: Option<String>) -> Self {
        value.map(Slot::Value).unwrap_or(Slot::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_into_string() {
        assert_eq!(Slot::Empty.into_string(), "");
        assert_eq!(Slot::Value("bar".to_string()).into_string(), "bar");
    }

    #[test]
    fn test_slot_from_option() {
        assert_eq!(Slot::from(None), Slot::Empty);
        assert_eq!(
            Slot::from(Some("x".to_string())).as_deref(),
            Some("x")
        );
        assert!(Slot::default().is_empty());
    }
}
