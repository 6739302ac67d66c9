use serde::{Deserialize, Serialize};

use crate::ObjectId;

/// One visible view in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    /// Short class name, resolver prefixes removed.
    pub view_class: String,
    pub complete_view_class: String,
    pub object_id: ObjectId,
    /// Last measured render duration, keyed by `object_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Display label.
    pub name: String,
    /// Template name, `(inline)` when the view has none.
    pub template: String,
    pub tag_name: String,
    pub is_virtual: bool,
    pub is_component: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<ControllerDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerDescriptor {
    pub name: String,
    pub complete_name: String,
    pub object_id: ObjectId,
}

/// Model attached to a view: a retained object or an inspected scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<ObjectId>,
    /// `object` for retained models, `scalar-<type>` otherwise.
    pub kind: String,
}

impl ModelDescriptor {
    pub const OBJECT_KIND: &'static str = "object";

    pub fn object(name: String, complete_name: String, object_id: ObjectId) -> Self {
        Self {
            name,
            complete_name: Some(complete_name),
            object_id: Some(object_id),
            kind: Self::OBJECT_KIND.to_string(),
        }
    }

    pub fn scalar(name: String, type_name: &str) -> Self {
        Self {
            name,
            complete_name: None,
            object_id: None,
            kind: format!("scalar-{type_name}"),
        }
    }

    pub fn is_object(&self) -> bool {
        self.kind == Self::OBJECT_KIND
    }
}

/// Node of a snapshot. Only the root carries a `tree_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub value: NodeDescriptor,
    pub children: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<ObjectId>,
}

impl TreeNode {
    pub fn new(value: NodeDescriptor, children: Vec<TreeNode>) -> Self {
        Self {
            value,
            children,
            tree_id: None,
        }
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn iter(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// First node (pre-order) with the given display name.
    pub fn find(&self, name: &str) -> Option<&TreeNode> {
        self.iter().find(|node| node.value.name == name)
    }

    pub fn object_ids(&self) -> impl Iterator<Item = &ObjectId> {
        self.iter().map(|node| &node.value.object_id)
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
