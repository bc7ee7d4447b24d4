//! String keys to view and guide handles

use std::collections::HashMap;
use std::fmt;

use crate::error::CompileError;

/// Opaque handle to a view owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewNode(u32);

impl ViewNode {
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Opaque handle to a non-rendering layout guide owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GuideNode(u32);

impl GuideNode {
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Anything a constraint can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    View(ViewNode),
    Guide(GuideNode),
}

impl Node {
    pub fn as_view(self) -> Option<ViewNode> {
        match self {
            Node::View(view) => Some(view),
            Node::Guide(_) => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::View(v) => write!(f, "view#{}", v.0),
            Node::Guide(g) => write!(f, "guide#{}", g.0),
        }
    }
}

/// Keyed nodes visible to constraint text.
///
/// The parent key is reserved: it always resolves to the container and can
/// never be registered explicitly.
#[derive(Debug, Clone)]
pub struct Registry {
    parent_key: String,
    container: Option<ViewNode>,
    entries: HashMap<String, Node>,
}

impl Registry {
    pub fn new(parent_key: impl Into<String>, container: ViewNode) -> Self {
        Self {
            parent_key: parent_key.into(),
            container: Some(container),
            entries: HashMap::new(),
        }
    }

    /// A registry whose parent key does not resolve (no container yet)
    pub fn without_container(parent_key: impl Into<String>) -> Self {
        Self {
            parent_key: parent_key.into(),
            container: None,
            entries: HashMap::new(),
        }
    }

    pub fn parent_key(&self) -> &str {
        &self.parent_key
    }

    pub fn container(&self) -> Option<ViewNode> {
        self.container
    }

    /// Register a node, replacing any previous node under the same key
    pub fn register(&mut self, key: impl Into<String>, node: Node) -> Result<(), CompileError> {
        let key = key.into();
        if key == self.parent_key {
            return Err(CompileError::ReservedKey { key });
        }
        self.entries.insert(key, node);
        Ok(())
    }

    /// Remove entries and return what was removed, in the order asked
    pub fn unregister<S: AsRef<str>>(&mut self, keys: &[S]) -> Vec<(String, Node)> {
        keys.iter()
            .filter_map(|key| {
                let key = key.as_ref();
                self.entries.remove(key).map(|node| (key.to_string(), node))
            })
            .collect()
    }

    /// Resolve a key to a node, the parent key included
    pub fn resolve(&self, key: &str) -> Result<Node, CompileError> {
        if key == self.parent_key {
            return self
                .container
                .map(Node::View)
                .ok_or_else(|| CompileError::ParentKeyUnresolved {
                    key: key.to_string(),
                });
        }
        self.entries
            .get(key)
            .copied()
            .ok_or_else(|| CompileError::UnknownViewKey {
                key: key.to_string(),
                suggestions: find_similar(self.entries.keys(), key, 2),
            })
    }

    /// Resolve a key that must name a view (not a guide)
    pub fn resolve_view(&self, key: &str) -> Result<ViewNode, CompileError> {
        match self.resolve(key)? {
            Node::View(view) => Ok(view),
            Node::Guide(_) => Err(CompileError::UnknownViewKey {
                key: key.to_string(),
                suggestions: Vec::new(),
            }),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        key == self.parent_key || self.entries.contains_key(key)
    }

    /// Keys currently bound to views
    pub fn view_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, node)| matches!(node, Node::View(_)))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Find the key a node was registered under
    pub fn key_of(&self, node: Node) -> Option<&str> {
        if Some(node) == self.container.map(Node::View) {
            return Some(&self.parent_key);
        }
        self.entries
            .iter()
            .find(|(_, n)| **n == node)
            .map(|(key, _)| key.as_str())
    }
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for (i, ac) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, bc) in b_chars.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Find similar keys within a maximum edit distance
fn find_similar<'a>(
    defined: impl Iterator<Item = &'a String>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut candidates: Vec<(String, usize)> = defined
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist <= max_distance && dist > 0).then(|| (name.clone(), dist))
        })
        .collect();

    candidates.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));
    candidates
        .into_iter()
        .map(|(name, _)| name)
        .take(3)
        .collect()
}
