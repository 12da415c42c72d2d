use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for positional keys. Keys are rebuilt on every
/// render, so interning keeps them `Copy` and O(1) to compare.
///
/// Entries are never released. Every distinct key a process ever builds
/// stays resident, so trees whose identities or shapes keep changing grow
/// this table for the life of the process.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Sentinel segment every key chain starts from.
pub const ROOT_SEGMENT: &str = "R";

/// Stable positional identity of a node in the controlled tree.
///
/// Computed as `parent + "-" + (identity or sibling index)`, rooted at `"R"`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(Spur);

impl NodeKey {
    /// Intern a raw key string, or return the existing key.
    pub fn intern(s: &str) -> Self {
        NodeKey(INTERNER.get_or_intern(s))
    }

    /// The sentinel key all top-level nodes hang off.
    pub fn root() -> Self {
        Self::intern(ROOT_SEGMENT)
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Key of a child of `self`. The explicit identity wins over the
    /// sibling position.
    pub fn child(&self, identity: Option<&str>, index: usize) -> Self {
        match identity {
            Some(id) => Self::intern(&format!("{}-{id}", self.as_str())),
            None => Self::intern(&format!("{}-{index}", self.as_str())),
        }
    }

    pub fn is_root(&self) -> bool {
        *self == Self::root()
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeKey::intern(&s))
    }
}

// ─── Ancestor path ───────────────────────────────────────────────────────

/// Root-first chain of ancestor keys.
///
/// Each recursion step gets its own extended copy; a path is never mutated
/// after it has been handed out.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KeyPath(SmallVec<[NodeKey; 8]>);

impl KeyPath {
    /// Path containing only the root sentinel.
    pub fn root() -> Self {
        let mut keys = SmallVec::new();
        keys.push(NodeKey::root());
        Self(keys)
    }

    /// A new path with `key` appended.
    #[must_use]
    pub fn extended(&self, key: NodeKey) -> Self {
        let mut keys = self.0.clone();
        keys.push(key);
        Self(keys)
    }

    /// The innermost key (the direct parent for a node's ancestor path).
    pub fn last(&self) -> NodeKey {
        self.0.last().copied().unwrap_or_else(NodeKey::root)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.0.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[NodeKey] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.0.iter().copied()
    }
}

impl Default for KeyPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeKey::intern("R-0-1");
        let b = NodeKey::intern("R-0-1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "R-0-1");
    }

    #[test]
    fn child_prefers_identity_over_index() {
        let root = NodeKey::root();
        assert_eq!(root.child(None, 2).as_str(), "R-2");
        assert_eq!(root.child(Some("A"), 2).as_str(), "R-A");
        assert_eq!(root.child(Some("A"), 0).child(None, 1).as_str(), "R-A-1");
    }

    #[test]
    fn path_extension_leaves_original_untouched() {
        let root = KeyPath::root();
        let a = NodeKey::intern("R-A");
        let extended = root.extended(a);
        assert_eq!(root.len(), 1);
        assert_eq!(extended.len(), 2);
        assert_eq!(extended.last(), a);
        assert_eq!(root.last(), NodeKey::root());
        assert!(extended.contains(NodeKey::root()));
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = NodeKey::intern("R-A-b1");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"R-A-b1\"");
        let back: NodeKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
