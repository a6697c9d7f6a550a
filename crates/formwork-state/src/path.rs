//! Dotted field paths for navigating form documents.
//!
//! A path addresses one location in a nested JSON document and serializes as
//! dot-joined tokens (`"externalIdBundle.ID.0.Scheme"`). Two reserved tokens
//! act as pattern wildcards in type-map keys: `<INDEX>` matches any existing
//! sequence index and `<EMPTY>` matches a position not yet present. Concrete
//! runtime paths never contain wildcards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved token matching any existing sequence index in a pattern.
pub const INDEX_TOKEN: &str = "<INDEX>";

/// Reserved token matching a not-yet-present position in a pattern.
pub const EMPTY_TOKEN: &str = "<EMPTY>";

/// A single segment in a field path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Seg {
    /// Mapping key access.
    Key(String),
    /// Sequence index access.
    Index(usize),
    /// Pattern wildcard: any existing sequence index (`<INDEX>`).
    AnyIndex,
    /// Pattern wildcard: a position not yet present (`<EMPTY>`).
    NewIndex,
}

impl Seg {
    /// Create a key segment.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Seg::Key(k.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }

    /// Returns true if this segment is one of the pattern wildcards.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Seg::AnyIndex | Seg::NewIndex)
    }

    /// Get the key if this is a key segment.
    #[inline]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Seg::Key(k) => Some(k),
            _ => None,
        }
    }

    /// Get the index if this is an index segment.
    #[inline]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Seg::Index(i) => Some(*i),
            _ => None,
        }
    }

    /// Parse one dotted token. Canonical non-negative integers become
    /// indices, the reserved tokens become wildcards, everything else is a
    /// key. Signed or zero-padded tokens (`"+5"`, `"007"`) stay keys so that
    /// display and parse round-trip.
    pub fn parse_token(token: &str) -> Self {
        match token {
            INDEX_TOKEN => Seg::AnyIndex,
            EMPTY_TOKEN => Seg::NewIndex,
            _ => match token.parse::<usize>() {
                Ok(i) if i.to_string() == token => Seg::Index(i),
                _ => Seg::Key(token.to_owned()),
            },
        }
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => f.write_str(k),
            Seg::Index(i) => write!(f, "{}", i),
            Seg::AnyIndex => f.write_str(INDEX_TOKEN),
            Seg::NewIndex => f.write_str(EMPTY_TOKEN),
        }
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A complete path into a form document.
///
/// # Examples
///
/// ```
/// use formwork_state::Path;
///
/// let path = Path::parse("externalIdBundle.ID.0.Scheme");
/// assert_eq!(path.len(), 4);
/// assert!(path.is_concrete());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<Seg>);

impl Path {
    /// Create an empty path (document root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from a vector of segments.
    #[inline]
    pub fn from_segments(segments: Vec<Seg>) -> Self {
        Self(segments)
    }

    /// Parse a dot-separated path string.
    ///
    /// Empty tokens are skipped, so `"a..b"` and `"a.b"` parse the same.
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|t| !t.is_empty())
                .map(Seg::parse_token)
                .collect(),
        )
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Push a segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    /// Pop the last segment.
    #[inline]
    pub fn pop(&mut self) -> Option<Seg> {
        self.0.pop()
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the last segment.
    #[inline]
    pub fn last(&self) -> Option<&Seg> {
        self.0.last()
    }

    /// True iff no segment is a pattern wildcard.
    ///
    /// Only concrete paths may address a live document; wildcard segments are
    /// legal in type-map patterns exclusively.
    #[inline]
    pub fn is_concrete(&self) -> bool {
        !self.0.iter().any(Seg::is_wildcard)
    }

    /// Join this path with another.
    #[inline]
    pub fn join(&self, other: &Path) -> Path {
        let mut result = self.clone();
        result.0.extend(other.0.iter().cloned());
        result
    }

    /// Get the parent path (without the last segment).
    #[inline]
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Check if this path starts with another path.
    #[inline]
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The pattern obtained by replacing every index segment with `<INDEX>`.
    pub fn as_pattern(&self) -> Path {
        Path(
            self.0
                .iter()
                .map(|seg| match seg {
                    Seg::Index(_) => Seg::AnyIndex,
                    other => other.clone(),
                })
                .collect(),
        )
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

impl FromIterator<Seg> for Path {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl IntoIterator for Path {
    type Item = Seg;
    type IntoIter = std::vec::IntoIter<Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Seg;
    type IntoIter = std::slice::Iter<'a, Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Seg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Construct a `Path` from a sequence of segments.
///
/// # Examples
///
/// ```
/// use formwork_state::path;
///
/// // String literals become Key segments, numbers become Index segments.
/// let p = path!("externalIdBundle", "ID", 0, "Scheme");
/// assert_eq!(p.to_string(), "externalIdBundle.ID.0.Scheme");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($crate::Seg::from($seg));
        )+
        p
    }};
}
