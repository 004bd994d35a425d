//! Key assembly
//!
//! Two layouts are in use. The exact fingerprint joins its fixed datapoints with
//! the separator between values; custom and extended fingerprints terminate
//! every value with the separator, the last one included.

use tracing::trace;

use super::Datapoint;
use crate::constants::key::SEPARATOR;

/// Incremental builder for separator-terminated keys
#[derive(Debug, Default, Clone)]
pub struct KeyBuilder {
    key: String,
    values: usize,
}

impl KeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value followed by the separator
    pub fn push(&mut self, value: &Datapoint) {
        self.key.push_str(&value.to_string());
        self.key.push(SEPARATOR);
        self.values += 1;
    }

    /// Number of values appended so far
    pub fn len(&self) -> usize {
        self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values == 0
    }

    pub fn finish(self) -> String {
        trace!(values = self.values, len = self.key.len(), "Assembled key");
        self.key
    }
}

/// `a|b|c` - values joined by the separator
pub fn joined_key<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a Datapoint>,
{
    values
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

/// `a|b|c|` - every value followed by the separator
pub fn terminated_key<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a Datapoint>,
{
    let mut builder = KeyBuilder::new();
    for value in values {
        builder.push(value);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> Vec<Datapoint> {
        vec!["custom".into(), "fingerprint".into(), true.into()]
    }

    #[test]
    fn test_joined_key() {
        assert_eq!(joined_key(&values()), "custom|fingerprint|true");
        assert_eq!(joined_key(&[]), "");
    }

    #[test]
    fn test_terminated_key_keeps_last_value() {
        assert_eq!(terminated_key(&values()), "custom|fingerprint|true|");
        assert_eq!(terminated_key(&[]), "");
    }

    #[test]
    fn test_builder_counts_values() {
        let mut builder = KeyBuilder::new();
        assert!(builder.is_empty());
        builder.push(&Datapoint::Undefined);
        builder.push(&Datapoint::from(24u32));
        assert_eq!(builder.len(), 2);
        assert_eq!(builder.finish(), "undefined|24|");
    }
}
