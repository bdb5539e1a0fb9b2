//! Node paths.
//!
//! A [`Path`] is the list of child indices leading from the document root
//! to a node. Paths order lexicographically, and a prefix sorts before its
//! extensions, so an ancestor always comes before its descendants. This is
//! document order for every pair of nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The empty path, addressing the document itself
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn get(&self, level: usize) -> Option<usize> {
        self.0.get(level).copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Append a relative path
    pub fn join(&self, relative: &[usize]) -> Path {
        let mut indices = self.0.clone();
        indices.extend_from_slice(relative);
        Path(indices)
    }

    /// Path of the following sibling
    pub fn next(&self) -> Option<Path> {
        let last = self.last()?;
        let mut indices = self.0.clone();
        *indices.last_mut()? = last + 1;
        Some(Path(indices))
    }

    /// Path of the preceding sibling
    pub fn previous(&self) -> Option<Path> {
        let last = self.last()?;
        if last == 0 {
            return None;
        }
        let mut indices = self.0.clone();
        *indices.last_mut()? = last - 1;
        Some(Path(indices))
    }

    /// Whether `self` is a strict ancestor of `other`
    pub fn is_ancestor(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_ancestor_or_equal(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    pub fn is_descendant(&self, other: &Path) -> bool {
        other.is_ancestor(self)
    }

    pub fn is_parent(&self, other: &Path) -> bool {
        self.0.len() + 1 == other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_sibling(&self, other: &Path) -> bool {
        !self.is_root()
            && self.0.len() == other.0.len()
            && self.0[..self.0.len() - 1] == other.0[..other.0.len() - 1]
            && self != other
    }

    /// Whether `self` is an earlier sibling of `other` or of one of
    /// `other`'s ancestors.
    ///
    /// These are exactly the paths whose insertion or removal shifts `other`.
    pub fn ends_before(&self, other: &Path) -> bool {
        let Some(last) = self.last() else {
            return false;
        };
        let level = self.0.len() - 1;
        other.0.len() > level && self.0[..level] == other.0[..level] && last < other.0[level]
    }

    /// Whether `self` is a later sibling of `other` or of one of `other`'s
    /// ancestors.
    pub fn ends_after(&self, other: &Path) -> bool {
        let Some(last) = self.last() else {
            return false;
        };
        let level = self.0.len() - 1;
        other.0.len() > level && self.0[..level] == other.0[..level] && last > other.0[level]
    }

    /// Deepest path that is an ancestor-or-equal of both
    pub fn common_ancestor(&self, other: &Path) -> Path {
        let shared = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count();
        Path(self.0[..shared].to_vec())
    }

    /// Add `n` to the index at `level`
    pub fn increment(&self, level: usize, n: usize) -> Path {
        let mut indices = self.0.clone();
        if let Some(index) = indices.get_mut(level) {
            *index += n;
        }
        Path(indices)
    }

    /// Subtract `n` from the index at `level`, saturating at zero
    pub fn decrement(&self, level: usize, n: usize) -> Path {
        let mut indices = self.0.clone();
        if let Some(index) = indices.get_mut(level) {
            *index = index.saturating_sub(n);
        }
        Path(indices)
    }

    /// Path relative to `ancestor` (which must be an ancestor-or-equal)
    pub fn relative_to(&self, ancestor: &Path) -> Option<&[usize]> {
        if ancestor.is_ancestor_or_equal(self) {
            Some(&self.0[ancestor.0.len()..])
        } else {
            None
        }
    }

    /// Every ancestor from the root down to the parent
    pub fn ancestors(&self) -> impl Iterator<Item = Path> + '_ {
        (0..self.0.len()).map(move |len| Path(self.0[..len].to_vec()))
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Path(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Path(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Path(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_puts_ancestors_first() {
        let mut paths = vec![
            Path::from([1]),
            Path::from([0, 1]),
            Path::from([0]),
            Path::root(),
            Path::from([0, 0, 5]),
        ];
        paths.sort();

        assert_eq!(
            paths,
            vec![
                Path::root(),
                Path::from([0]),
                Path::from([0, 0, 5]),
                Path::from([0, 1]),
                Path::from([1]),
            ]
        );
    }

    #[test]
    fn test_ancestry() {
        let a = Path::from([0, 1]);
        let b = Path::from([0, 1, 2]);

        assert!(a.is_ancestor(&b));
        assert!(!a.is_ancestor(&a));
        assert!(a.is_ancestor_or_equal(&a));
        assert!(a.is_parent(&b));
        assert!(b.is_descendant(&a));
        assert!(Path::root().is_ancestor(&a));
    }

    #[test]
    fn test_ends_before() {
        let p = Path::from([0, 1]);

        assert!(p.ends_before(&Path::from([0, 2])));
        assert!(p.ends_before(&Path::from([0, 3, 0])));
        assert!(!p.ends_before(&Path::from([0, 1, 0])));
        assert!(!p.ends_before(&Path::from([0])));
        assert!(!p.ends_before(&Path::from([1, 2])));
        assert!(Path::from([0, 2]).ends_after(&p));
    }

    #[test]
    fn test_siblings() {
        assert!(Path::from([0, 1]).is_sibling(&Path::from([0, 3])));
        assert!(!Path::from([0, 1]).is_sibling(&Path::from([0, 1])));
        assert!(!Path::from([0, 1]).is_sibling(&Path::from([1, 1])));
    }

    #[test]
    fn test_common_ancestor() {
        let a = Path::from([0, 1, 4]);
        let b = Path::from([0, 1, 2, 3]);
        assert_eq!(a.common_ancestor(&b), Path::from([0, 1]));
        assert_eq!(a.common_ancestor(&Path::from([1])), Path::root());
    }

    #[test]
    fn test_next_previous() {
        let p = Path::from([2, 0]);
        assert_eq!(p.next(), Some(Path::from([2, 1])));
        assert_eq!(p.previous(), None);
        assert_eq!(Path::root().next(), None);
    }

    #[test]
    fn test_ancestors_iterator() {
        let ancestors: Vec<Path> = Path::from([1, 2]).ancestors().collect();
        assert_eq!(ancestors, vec![Path::root(), Path::from([1])]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Path::from([0, 12]).to_string(), "[0, 12]");
    }
}
