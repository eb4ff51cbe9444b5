//! Cache keys.
//!
//! A key is an ordered list of scalar parts, usually an endpoint path
//! followed by its parameters: `["/api/leads/list", true]` or
//! `["/api/email-campaigns", 12, "logs"]`. Two keys are equal when their
//! parts are equal element by element. Invalidation matches by prefix, so
//! `["/api/leads/list"]` covers both variants of the lead list.

use std::fmt;

/// One scalar element of a [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Str(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

impl From<i32> for KeyPart {
    fn from(value: i32) -> Self {
        KeyPart::Int(i64::from(value))
    }
}

impl From<u32> for KeyPart {
    fn from(value: u32) -> Self {
        KeyPart::Int(i64::from(value))
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Bool(value)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Bool(value) => write!(f, "{value}"),
            KeyPart::Int(value) => write!(f, "{value}"),
            KeyPart::Str(value) => write!(f, "{value:?}"),
        }
    }
}

/// Identity of a cached query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Vec<KeyPart>);

impl CacheKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPart>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Append a part, builder style.
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `prefix` matches the leading parts of this key. A key is a
    /// prefix of itself; the empty key is a prefix of everything.
    pub fn starts_with(&self, prefix: &CacheKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, part) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_str("]")
    }
}

/// Build a [`CacheKey`] from heterogeneous parts.
///
/// ```
/// use leadpilot_query::cache_key;
///
/// let key = cache_key!["/api/email-campaigns", 12i64, "logs"];
/// assert_eq!(key.to_string(), r#"["/api/email-campaigns", 12, "logs"]"#);
/// ```
#[macro_export]
macro_rules! cache_key {
    ($($part:expr),* $(,)?) => {
        $crate::CacheKey::new()$(.with($part))*
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keys_compare_element_wise() {
        assert_eq!(cache_key!["/api/leads/list", true], cache_key!["/api/leads/list", true]);
        assert_ne!(cache_key!["/api/leads/list", true], cache_key!["/api/leads/list", false]);
        assert_ne!(cache_key!["/api/x", 1i64], cache_key!["/api/x", "1"]);
    }

    #[test]
    fn prefix_matching() {
        let lists = cache_key!["/api/leads/list"];
        assert!(cache_key!["/api/leads/list", true].starts_with(&lists));
        assert!(cache_key!["/api/leads/list", false].starts_with(&lists));
        assert!(lists.starts_with(&lists));
        assert!(!cache_key!["/api/leads/stats"].starts_with(&lists));
        assert!(!lists.starts_with(&cache_key!["/api/leads/list", true]));
    }

    #[test]
    fn display_reads_like_json() {
        let key = cache_key!["/api/email-campaigns", 7i64, "logs", false];
        assert_eq!(key.to_string(), r#"["/api/email-campaigns", 7, "logs", false]"#);
        assert_eq!(CacheKey::new().to_string(), "[]");
    }

    fn part() -> impl Strategy<Value = KeyPart> {
        prop_oneof![
            any::<bool>().prop_map(KeyPart::Bool),
            any::<i64>().prop_map(KeyPart::Int),
            "[a-z/]{0,8}".prop_map(KeyPart::Str),
        ]
    }

    proptest! {
        #[test]
        fn every_truncation_is_a_prefix(parts in prop::collection::vec(part(), 0..6), cut in 0usize..6) {
            let key = CacheKey::from_parts(parts.clone());
            let cut = cut.min(parts.len());
            let prefix = CacheKey::from_parts(parts[..cut].to_vec());
            prop_assert!(key.starts_with(&prefix));
            prop_assert!(key.starts_with(&CacheKey::new()));
        }
    }
}
