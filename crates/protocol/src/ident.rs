use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An immutable, reference-counted name.
///
/// Used for segment (chromosome) ids, layer names and label text: values
/// that are cloned into every frame's renderables and hotspot records, so
/// cloning must be a refcount bump rather than a string copy.
#[derive(Clone, Eq, PartialOrd, Ord, Hash)]
pub struct Ident(Arc<str>);

/// Identifier of one segment of the global axis, e.g. `"1"`, `"X"`.
pub type SegmentId = Ident;

impl Ident {
    pub fn new(name: impl AsRef<str>) -> Self {
        Ident(Arc::from(name.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Ident {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Ident {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl std::ops::Deref for Ident {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Ident {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Ident(Arc::from(s))
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Ident(Arc::from(s))
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Hand-rolled so serde's `rc` feature is not needed.
impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Ident::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn compares_with_str() {
        let chr = Ident::from("X");
        assert_eq!(chr, "X");
        assert_ne!(chr, Ident::from("Y"));
    }

    #[test]
    fn map_lookup_by_borrowed_name() {
        let mut index = HashMap::new();
        index.insert(SegmentId::from("chr7"), 6usize);
        assert_eq!(index.get("chr7"), Some(&6));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = Ident::from("22");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"22\"");
        let back: Ident = serde_json::from_str(&json).unwrap_or_else(|_| Ident::from(""));
        assert_eq!(back, "22");
    }

    #[test]
    fn debug_shows_quoted_name() {
        assert_eq!(format!("{:?}", Ident::from("gwas")), "\"gwas\"");
    }
}
