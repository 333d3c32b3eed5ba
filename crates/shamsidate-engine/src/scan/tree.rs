//! The document tree the scanner walks.
//!
//! A flat index arena stands in for the host's node tree: `NodeId` is a
//! plain index, so side-tables keyed on it never keep nodes alive, and the
//! whole tree can be walked without chasing pointers. The host builds the
//! tree, the scanner mutates text and whitelisted attributes in place.

use std::collections::BTreeMap;

/// Stable handle for a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node carries: markup structure or plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        tag: String,
        attrs: BTreeMap<String, String>,
    },
    Text {
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// A tree of text-bearing and element nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree with a single root element.
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element {
                    tag: root_tag.to_string(),
                    attrs: BTreeMap::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Append an element child under `parent`.
    pub fn push_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push_node(
            parent,
            NodeKind::Element {
                tag: tag.to_string(),
                attrs: BTreeMap::new(),
            },
        )
    }

    /// Append a text child under `parent`.
    pub fn push_text(&mut self, parent: NodeId, content: &str) -> NodeId {
        self.push_node(
            parent,
            NodeKind::Text {
                content: content.to_string(),
            },
        )
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(id);
        }
        id
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text { content } => Some(content),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, new_content: &str) {
        if let Some(node) = self.nodes.get_mut(id.0)
            && let NodeKind::Text { content } = &mut node.kind
        {
            *content = new_content.to_string();
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(id.0)
            && let NodeKind::Element { attrs, .. } = &mut node.kind
        {
            attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Pre-order depth-first walk from `root`, driven by an explicit stack
    /// so pathological nesting cannot exhaust the call stack.
    pub fn preorder(&self, root: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: if self.contains(root) { vec![root] } else { vec![] },
        }
    }

    /// All text content in document order, newline-joined. Used for the
    /// format profile and the monitor's cheap pre-check, not for rewriting.
    pub fn document_text(&self) -> String {
        let mut out = String::new();
        let mut first = true;
        for id in self.preorder(self.root()) {
            if let Some(text) = self.text(id) {
                if !first {
                    out.push('\n');
                }
                out.push_str(text);
                first = false;
            }
        }
        out
    }
}

pub struct Preorder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        // Reverse so the leftmost child is visited first.
        for &child in self.tree.children(id).iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}
