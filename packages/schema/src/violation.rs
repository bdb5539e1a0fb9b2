use folio_model::{Key, Mark, Path};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a node failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    ChildObjectInvalid,
    ChildTypeInvalid,
    ChildUnknown,
    ChildMinInvalid,
    ChildMaxInvalid,
    ChildRequired,
    FirstChildObjectInvalid,
    FirstChildTypeInvalid,
    LastChildObjectInvalid,
    LastChildTypeInvalid,
    NodeDataInvalid,
    NodeMarkInvalid,
    NodeTextInvalid,
    ParentObjectInvalid,
    ParentTypeInvalid,
    InlineEmpty,
    InlineVoidUnpadded,
    AdjacentText,
    ExtraEmptyText,
}

impl ViolationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationCode::ChildObjectInvalid => "child_object_invalid",
            ViolationCode::ChildTypeInvalid => "child_type_invalid",
            ViolationCode::ChildUnknown => "child_unknown",
            ViolationCode::ChildMinInvalid => "child_min_invalid",
            ViolationCode::ChildMaxInvalid => "child_max_invalid",
            ViolationCode::ChildRequired => "child_required",
            ViolationCode::FirstChildObjectInvalid => "first_child_object_invalid",
            ViolationCode::FirstChildTypeInvalid => "first_child_type_invalid",
            ViolationCode::LastChildObjectInvalid => "last_child_object_invalid",
            ViolationCode::LastChildTypeInvalid => "last_child_type_invalid",
            ViolationCode::NodeDataInvalid => "node_data_invalid",
            ViolationCode::NodeMarkInvalid => "node_mark_invalid",
            ViolationCode::NodeTextInvalid => "node_text_invalid",
            ViolationCode::ParentObjectInvalid => "parent_object_invalid",
            ViolationCode::ParentTypeInvalid => "parent_type_invalid",
            ViolationCode::InlineEmpty => "inline_empty",
            ViolationCode::InlineVoidUnpadded => "inline_void_unpadded",
            ViolationCode::AdjacentText => "adjacent_text",
            ViolationCode::ExtraEmptyText => "extra_empty_text",
        }
    }

    /// Codes whose target is one child of the validated node
    pub fn targets_child(self) -> bool {
        matches!(
            self,
            ViolationCode::ChildObjectInvalid
                | ViolationCode::ChildTypeInvalid
                | ViolationCode::ChildUnknown
                | ViolationCode::ChildMaxInvalid
                | ViolationCode::FirstChildObjectInvalid
                | ViolationCode::FirstChildTypeInvalid
                | ViolationCode::LastChildObjectInvalid
                | ViolationCode::LastChildTypeInvalid
                | ViolationCode::ParentObjectInvalid
                | ViolationCode::ParentTypeInvalid
                | ViolationCode::InlineEmpty
                | ViolationCode::AdjacentText
                | ViolationCode::ExtraEmptyText
        )
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema violation found on one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub code: ViolationCode,

    /// Layer that reported it
    pub layer: String,

    /// Rule inside the layer
    pub rule: String,

    /// Human-readable message
    pub message: String,

    /// Path of the validated node
    pub path: Path,

    /// Key of the validated node
    pub key: Key,

    /// Offending (or missing) child position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    /// Offending child, when it exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Key>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<Mark>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_key: Option<String>,

    /// Block type to wrap the offending child in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<String>,
}

impl Violation {
    pub fn new(
        code: ViolationCode,
        rule: impl Into<String>,
        message: impl Into<String>,
        path: &Path,
        key: Key,
    ) -> Self {
        Self {
            code,
            layer: String::new(),
            rule: rule.into(),
            message: message.into(),
            path: path.clone(),
            key,
            index: None,
            child: None,
            mark: None,
            data_key: None,
            wrap: None,
        }
    }

    pub fn with_child(mut self, index: usize, key: Key) -> Self {
        self.index = Some(index);
        self.child = Some(key);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.mark = Some(mark);
        self
    }

    pub fn with_data_key(mut self, data_key: impl Into<String>) -> Self {
        self.data_key = Some(data_key.into());
        self
    }

    pub fn with_wrap(mut self, block_type: impl Into<String>) -> Self {
        self.wrap = Some(block_type.into());
        self
    }

    pub fn in_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    /// Path of the offending child, when the violation targets one
    pub fn child_path(&self) -> Option<Path> {
        if self.child.is_some() {
            self.index.map(|index| self.path.child(index))
        } else {
            None
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.code, self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_serializes_snake_case() {
        let json = serde_json::to_value(ViolationCode::FirstChildTypeInvalid).unwrap();
        assert_eq!(json, "first_child_type_invalid");
        assert_eq!(
            ViolationCode::FirstChildTypeInvalid.to_string(),
            "first_child_type_invalid"
        );
    }

    #[test]
    fn test_child_path() {
        let key = Key::generate();
        let violation = Violation::new(
            ViolationCode::ChildUnknown,
            "quote",
            "unexpected child",
            &Path::from([2]),
            key,
        )
        .with_child(1, Key::generate());

        assert_eq!(violation.child_path(), Some(Path::from([2, 1])));

        let missing = Violation::new(
            ViolationCode::ChildRequired,
            "quote",
            "missing child",
            &Path::from([2]),
            key,
        )
        .with_index(0);
        assert_eq!(missing.child_path(), None);
    }
}
