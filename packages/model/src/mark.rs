use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;

/// Arbitrary node/mark payload. Keys are kept sorted, so equality and
/// serialization are deterministic.
pub type Data = serde_json::Map<String, serde_json::Value>;

/// Named, data-bearing formatting annotation on a run of text.
///
/// Marks compare by value: two marks with the same type and data are the
/// same mark regardless of where they were created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,

    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,
}

impl Mark {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Self {
            mark_type: mark_type.into(),
            data: Data::new(),
        }
    }

    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    /// Canonical ordering used to keep mark sets sorted
    fn canonical_cmp(&self, other: &Mark) -> Ordering {
        self.mark_type.cmp(&other.mark_type).then_with(|| {
            let a = serde_json::Value::Object(self.data.clone()).to_string();
            let b = serde_json::Value::Object(other.data.clone()).to_string();
            a.cmp(&b)
        })
    }
}

/// Set of marks with value semantics.
///
/// Kept in canonical order so that two sets holding the same marks compare
/// equal no matter the order marks were added in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MarkSet(Vec<Mark>);

impl MarkSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mark> {
        self.0.iter()
    }

    pub fn contains(&self, mark: &Mark) -> bool {
        self.position(mark).is_ok()
    }

    /// Whether any mark of the given type is present
    pub fn has_type(&self, mark_type: &str) -> bool {
        self.0.iter().any(|m| m.mark_type == mark_type)
    }

    /// Insert a mark; returns false if it was already present
    pub fn insert(&mut self, mark: Mark) -> bool {
        match self.position(&mark) {
            Ok(_) => false,
            Err(index) => {
                self.0.insert(index, mark);
                true
            }
        }
    }

    /// Remove a mark; returns false if it was absent
    pub fn remove(&mut self, mark: &Mark) -> bool {
        match self.position(mark) {
            Ok(index) => {
                self.0.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    pub fn union(&self, other: &MarkSet) -> MarkSet {
        let mut result = self.clone();
        for mark in other.iter() {
            result.insert(mark.clone());
        }
        result
    }

    pub fn intersection(&self, other: &MarkSet) -> MarkSet {
        self.0.iter().filter(|m| other.contains(m)).cloned().collect()
    }

    fn position(&self, mark: &Mark) -> Result<usize, usize> {
        self.0.binary_search_by(|existing| existing.canonical_cmp(mark))
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        let mut set = MarkSet::new();
        for mark in iter {
            set.insert(mark);
        }
        set
    }
}

impl<'a> IntoIterator for &'a MarkSet {
    type Item = &'a Mark;
    type IntoIter = std::slice::Iter<'a, Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for MarkSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let marks = Vec::<Mark>::deserialize(deserializer)?;
        Ok(marks.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marks_compare_by_value() {
        let mut data = Data::new();
        data.insert("href".to_string(), json!("https://example.com"));

        let a = Mark::new("link").with_data(data.clone());
        let b = Mark::new("link").with_data(data);

        assert_eq!(a, b);
        assert_ne!(a, Mark::new("link"));
    }

    #[test]
    fn test_mark_set_is_order_independent() {
        let one: MarkSet = vec![Mark::new("bold"), Mark::new("italic")].into_iter().collect();
        let two: MarkSet = vec![Mark::new("italic"), Mark::new("bold")].into_iter().collect();

        assert_eq!(one, two);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut set = MarkSet::new();
        assert!(set.insert(Mark::new("bold")));
        assert!(!set.insert(Mark::new("bold")));
        assert_eq!(set.len(), 1);

        // Removing an absent mark is a no-op
        assert!(!set.remove(&Mark::new("italic")));
        assert!(set.remove(&Mark::new("bold")));
        assert!(set.is_empty());
    }

    #[test]
    fn test_deserialize_dedupes() {
        let set: MarkSet =
            serde_json::from_value(json!([{ "type": "bold" }, { "type": "bold" }])).unwrap();
        assert_eq!(set.len(), 1);
    }
}
