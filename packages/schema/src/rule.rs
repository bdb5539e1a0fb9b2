use crate::matcher::{check_any, DataPredicate, Mismatch, NodeMatcher};
use crate::violation::{Violation, ViolationCode};
use crate::Schema;
use folio_model::{Node, Object, Path};
use regex::Regex;

/// What a rule sees besides the node itself
pub struct ValidationContext<'a> {
    /// Path of the node under validation
    pub path: &'a Path,

    /// The full schema, for void checks
    pub schema: &'a Schema,
}

/// Trait for implementing schema rules
pub trait SchemaRule: Send + Sync {
    /// Identifier reported on violations
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str {
        ""
    }

    /// First violation on `node`, if any
    fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation>;

    /// Whether this rule declares `node` void (content is opaque)
    fn is_void(&self, _node: &Node) -> bool {
        false
    }
}

/// Ordered, counted slot for children
#[derive(Debug, Clone)]
pub struct ChildGroup {
    pub matchers: Vec<NodeMatcher>,
    pub min: usize,
    pub max: Option<usize>,

    /// Block type that a rejected child is wrapped in during repair
    pub wrap: Option<String>,
}

impl ChildGroup {
    pub fn new(matchers: Vec<NodeMatcher>) -> Self {
        Self {
            matchers,
            min: 0,
            max: None,
            wrap: None,
        }
    }

    pub fn of(matcher: NodeMatcher) -> Self {
        Self::new(vec![matcher])
    }

    pub fn min(mut self, min: usize) -> Self {
        self.min = min;
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn wrap(mut self, block_type: impl Into<String>) -> Self {
        self.wrap = Some(block_type.into());
        self
    }

    fn accepts(&self, node: &Node) -> bool {
        check_any(&self.matchers, node).is_ok()
    }

    /// Block type to wrap a rejected `child` in. Without an explicit `wrap`,
    /// a group that only takes one block type wraps stray texts and inlines
    /// in it.
    fn wrapper_for(&self, child: &Node) -> Option<String> {
        if self.wrap.is_some() {
            return self.wrap.clone();
        }
        if child.is_block() {
            return None;
        }
        match self.matchers.as_slice() {
            [only]
                if only.objects == [Object::Block]
                    && only.types.len() == 1
                    && only.data.is_empty() =>
            {
                Some(only.types[0].clone())
            }
            _ => None,
        }
    }
}

/// Declarative rule for the nodes picked by `matcher`
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub matcher: NodeMatcher,
    pub parent: Option<Vec<NodeMatcher>>,
    pub nodes: Option<Vec<ChildGroup>>,
    pub first: Option<Vec<NodeMatcher>>,
    pub last: Option<Vec<NodeMatcher>>,
    pub data: Vec<(String, DataPredicate)>,
    pub text: Option<Regex>,
    pub marks: Option<Vec<String>>,
    pub is_void: bool,
}

impl Rule {
    pub fn new(matcher: NodeMatcher) -> Self {
        let name = if matcher.types.is_empty() {
            "rule".to_string()
        } else {
            matcher.types.join("|")
        };
        Self {
            name,
            matcher,
            parent: None,
            nodes: None,
            first: None,
            last: None,
            data: Vec::new(),
            text: None,
            marks: None,
            is_void: false,
        }
    }

    pub fn block(node_type: &str) -> Self {
        Self::new(NodeMatcher::block(node_type))
    }

    pub fn inline(node_type: &str) -> Self {
        Self::new(NodeMatcher::inline(node_type))
    }

    pub fn document() -> Self {
        Self::new(NodeMatcher::object(Object::Document)).named("document")
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn parent(mut self, parents: Vec<NodeMatcher>) -> Self {
        self.parent = Some(parents);
        self
    }

    pub fn nodes(mut self, groups: Vec<ChildGroup>) -> Self {
        self.nodes = Some(groups);
        self
    }

    pub fn first(mut self, matchers: Vec<NodeMatcher>) -> Self {
        self.first = Some(matchers);
        self
    }

    pub fn last(mut self, matchers: Vec<NodeMatcher>) -> Self {
        self.last = Some(matchers);
        self
    }

    pub fn data(mut self, key: impl Into<String>, predicate: DataPredicate) -> Self {
        self.data.push((key.into(), predicate));
        self
    }

    pub fn text(mut self, pattern: Regex) -> Self {
        self.text = Some(pattern);
        self
    }

    pub fn marks(mut self, mark_types: &[&str]) -> Self {
        self.marks = Some(mark_types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn void(mut self) -> Self {
        self.is_void = true;
        self
    }

    fn violation(&self, code: ViolationCode, message: String, node: &Node, path: &Path) -> Violation {
        Violation::new(code, self.name.clone(), message, path, node.key())
    }

    /// Children this rule applies to whose parent is not allowed
    fn validate_parent_of_children(&self, node: &Node, path: &Path) -> Option<Violation> {
        let parents = self.parent.as_ref()?;
        for (index, child) in node.nodes().iter().enumerate() {
            if !self.matcher.matches(child) {
                continue;
            }
            if let Err(mismatch) = check_any(parents, node) {
                let code = match mismatch {
                    Mismatch::Object => ViolationCode::ParentObjectInvalid,
                    Mismatch::Type => ViolationCode::ParentTypeInvalid,
                };
                let message = format!(
                    "'{}' is not allowed inside {} '{}'",
                    child.node_type().unwrap_or("text"),
                    node.object().as_str(),
                    node.node_type().unwrap_or_default()
                );
                return Some(self.violation(code, message, node, path).with_child(index, child.key()));
            }
        }
        None
    }

    fn validate_data(&self, node: &Node, path: &Path) -> Option<Violation> {
        let data = node.data();
        for (key, predicate) in &self.data {
            if !predicate.test(data.and_then(|d| d.get(key))) {
                let message = format!("data '{key}' does not satisfy {predicate:?}");
                return Some(
                    self.violation(ViolationCode::NodeDataInvalid, message, node, path)
                        .with_data_key(key.clone()),
                );
            }
        }
        None
    }

    fn validate_marks(&self, node: &Node, path: &Path) -> Option<Violation> {
        let allowed = self.marks.as_ref()?;
        for (_, text) in node.texts() {
            for leaf in text.leaves() {
                if let Some(mark) = leaf.marks.iter().find(|m| !allowed.contains(&m.mark_type)) {
                    let message = format!("mark '{}' is not allowed here", mark.mark_type);
                    return Some(
                        self.violation(ViolationCode::NodeMarkInvalid, message, node, path)
                            .with_mark(mark.clone()),
                    );
                }
            }
        }
        None
    }

    fn validate_text(&self, node: &Node, path: &Path) -> Option<Violation> {
        let pattern = self.text.as_ref()?;
        if pattern.is_match(&node.text()) {
            return None;
        }
        let message = format!("text does not match /{}/", pattern.as_str());
        Some(self.violation(ViolationCode::NodeTextInvalid, message, node, path))
    }

    fn validate_edge(&self, node: &Node, path: &Path, first: bool) -> Option<Violation> {
        let matchers = if first { self.first.as_ref()? } else { self.last.as_ref()? };
        let children = node.nodes();
        let index = if first { 0 } else { children.len().checked_sub(1)? };
        let child = children.get(index)?;
        let mismatch = check_any(matchers, child).err()?;
        let code = match (first, mismatch) {
            (true, Mismatch::Object) => ViolationCode::FirstChildObjectInvalid,
            (true, Mismatch::Type) => ViolationCode::FirstChildTypeInvalid,
            (false, Mismatch::Object) => ViolationCode::LastChildObjectInvalid,
            (false, Mismatch::Type) => ViolationCode::LastChildTypeInvalid,
        };
        let message = format!(
            "{} child '{}' is not allowed",
            if first { "first" } else { "last" },
            child.node_type().unwrap_or("text")
        );
        Some(self.violation(code, message, node, path).with_child(index, child.key()))
    }

    /// Walk children through the ordered groups. A child that does not fit
    /// the current group moves on to the next one once the current group's
    /// minimum is met. In the last group it is reported as invalid; only a
    /// child left over past a full last group is unknown.
    fn validate_nodes(&self, node: &Node, path: &Path) -> Option<Violation> {
        let groups = self.nodes.as_ref()?;
        let children = node.nodes();
        let mut group_index = 0;
        let mut count = 0;

        for (index, child) in children.iter().enumerate() {
            let mut passed_full: Option<&ChildGroup> = None;
            loop {
                let Some(group) = groups.get(group_index) else {
                    let overflowed = passed_full.map_or(false, |g| g.accepts(child));
                    let (code, message) = if overflowed {
                        (ViolationCode::ChildMaxInvalid, "too many children".to_string())
                    } else {
                        (
                            ViolationCode::ChildUnknown,
                            format!("unexpected child at index {index}"),
                        )
                    };
                    return Some(
                        self.violation(code, message, node, path)
                            .with_child(index, child.key()),
                    );
                };

                if group.max.map_or(false, |max| count >= max) {
                    passed_full = Some(group);
                    group_index += 1;
                    count = 0;
                    continue;
                }

                match check_any(&group.matchers, child) {
                    Ok(()) => {
                        count += 1;
                        break;
                    }
                    Err(_) if count >= group.min && group_index + 1 < groups.len() => {
                        group_index += 1;
                        count = 0;
                    }
                    Err(_) if passed_full.map_or(false, |g| g.accepts(child)) => {
                        return Some(
                            self.violation(
                                ViolationCode::ChildMaxInvalid,
                                "too many children".to_string(),
                                node,
                                path,
                            )
                            .with_child(index, child.key()),
                        );
                    }
                    Err(mismatch) => {
                        let code = match mismatch {
                            Mismatch::Object => ViolationCode::ChildObjectInvalid,
                            Mismatch::Type => ViolationCode::ChildTypeInvalid,
                        };
                        let message = format!(
                            "child '{}' at index {index} is not allowed",
                            child.node_type().unwrap_or("text")
                        );
                        let mut violation = self
                            .violation(code, message, node, path)
                            .with_child(index, child.key());
                        if let Some(wrap) = group.wrapper_for(child) {
                            violation = violation.with_wrap(wrap);
                        }
                        return Some(violation);
                    }
                }
            }
        }

        for (offset, group) in groups.iter().enumerate().skip(group_index) {
            let present = if offset == group_index { count } else { 0 };
            if present < group.min {
                let code = if present == 0 {
                    ViolationCode::ChildRequired
                } else {
                    ViolationCode::ChildMinInvalid
                };
                let message = format!("expected at least {} children, found {present}", group.min);
                return Some(
                    self.violation(code, message, node, path)
                        .with_index(children.len()),
                );
            }
        }
        None
    }
}

impl SchemaRule for Rule {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation> {
        let path = ctx.path;
        if let Some(violation) = self.validate_parent_of_children(node, path) {
            return Some(violation);
        }
        if !self.matcher.matches(node) {
            return None;
        }
        self.validate_data(node, path)
            .or_else(|| self.validate_marks(node, path))
            .or_else(|| self.validate_text(node, path))
            .or_else(|| self.validate_edge(node, path, true))
            .or_else(|| self.validate_edge(node, path, false))
            .or_else(|| self.validate_nodes(node, path))
    }

    fn is_void(&self, node: &Node) -> bool {
        self.is_void && self.matcher.matches(node)
    }
}
