//! In-memory DOM backend.
//!
//! Backs the test suite and dry runs: documents are built from
//! [`NodeSpec`] trees, queries are evaluated structurally, and every
//! click and fill is recorded so tests can assert on the exact
//! interaction sequence without a browser.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::dom::{ContextId, DomBackend, DomNode, Query, Selector};
use crate::dom::AttrMatch;
use crate::error::{RotaError, RotaResult};

/// Declarative node description for building mock documents.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    tag: String,
    attrs: Vec<(String, String)>,
    own_text: String,
    children: Vec<NodeSpec>,
    visible: bool,
}

/// Start a node description: `el("tr").attr("class", "employee-row")`.
pub fn el(tag: &str) -> NodeSpec {
    NodeSpec {
        tag: tag.to_lowercase(),
        attrs: Vec::new(),
        own_text: String::new(),
        children: Vec::new(),
        visible: true,
    }
}

impl NodeSpec {
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.own_text = text.to_string();
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I: IntoIterator<Item = NodeSpec>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Debug)]
struct Node {
    tag: String,
    attrs: HashMap<String, String>,
    own_text: String,
    children: Vec<usize>,
    parent: Option<usize>,
    visible: bool,
    value: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<usize>,
    nodes: Vec<Node>,
    clicks: Vec<usize>,
    fills: Vec<(usize, String)>,
    frame_navigations: Vec<(usize, String)>,
}

/// The mock backend. Interior mutability so the interaction log can be
/// written through the `&self` trait methods.
#[derive(Debug, Default)]
pub struct MockDom {
    inner: Mutex<Inner>,
}

impl MockDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document context built from a spec tree. The first added
    /// document is the primary context.
    pub fn add_document(&self, root: NodeSpec) -> ContextId {
        let mut inner = self.lock();
        let root_idx = insert(&mut inner.nodes, root, None);
        inner.documents.push(root_idx);
        ContextId(inner.documents.len() - 1)
    }

    /// Convenience: a single document whose body holds the given nodes.
    pub fn with_body<I: IntoIterator<Item = NodeSpec>>(nodes: I) -> Self {
        let dom = Self::new();
        dom.add_document(el("body").children(nodes));
        dom
    }

    /// Clicks recorded so far, in order.
    pub fn clicks(&self) -> Vec<DomNode> {
        let inner = self.lock();
        inner
            .clicks
            .iter()
            .map(|idx| self.node_ref(&inner, *idx))
            .collect()
    }

    /// Fills recorded so far: (node, value written), in order.
    pub fn fills(&self) -> Vec<(DomNode, String)> {
        let inner = self.lock();
        inner
            .fills
            .iter()
            .map(|(idx, value)| (self.node_ref(&inner, *idx), value.clone()))
            .collect()
    }

    /// Frame URL rewrites recorded so far.
    pub fn frame_navigations(&self) -> Vec<(ContextId, String)> {
        let inner = self.lock();
        inner
            .frame_navigations
            .iter()
            .map(|(ctx, url)| (ContextId(*ctx), url.clone()))
            .collect()
    }

    /// Current value of a form control, if one was written.
    pub fn value_of(&self, node: &DomNode) -> Option<String> {
        let inner = self.lock();
        let idx = node.handle.parse::<usize>().ok()?;
        inner.nodes.get(idx)?.value.clone()
    }

    /// Tag name of a recorded interaction target, for assertions.
    pub fn tag_of(&self, node: &DomNode) -> Option<String> {
        let inner = self.lock();
        let idx = node.handle.parse::<usize>().ok()?;
        inner.nodes.get(idx).map(|n| n.tag.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("mock dom lock poisoned")
    }

    fn node_ref(&self, inner: &Inner, idx: usize) -> DomNode {
        let context = inner
            .documents
            .iter()
            .position(|root| subtree_contains(&inner.nodes, *root, idx))
            .unwrap_or(0);
        DomNode::new(ContextId(context), idx.to_string())
    }

    fn resolve(&self, inner: &Inner, node: &DomNode) -> RotaResult<usize> {
        let idx: usize = node
            .handle
            .parse()
            .map_err(|_| RotaError::StaleElement(node.handle.clone()))?;
        if idx >= inner.nodes.len() {
            return Err(RotaError::StaleElement(node.handle.clone()));
        }
        Ok(idx)
    }
}

fn insert(nodes: &mut Vec<Node>, spec: NodeSpec, parent: Option<usize>) -> usize {
    let idx = nodes.len();
    nodes.push(Node {
        tag: spec.tag,
        attrs: spec.attrs.into_iter().collect(),
        own_text: spec.own_text,
        children: Vec::new(),
        parent,
        visible: spec.visible,
        value: None,
    });
    for child in spec.children {
        let child_idx = insert(nodes, child, Some(idx));
        nodes[idx].children.push(child_idx);
    }
    idx
}

fn subtree_contains(nodes: &[Node], root: usize, target: usize) -> bool {
    if root == target {
        return true;
    }
    nodes[root]
        .children
        .iter()
        .any(|child| subtree_contains(nodes, *child, target))
}

fn attr_value<'a>(node: &'a Node, name: &str) -> Option<&'a str> {
    if name == "value" {
        if let Some(value) = &node.value {
            return Some(value);
        }
    }
    node.attrs.get(name).map(String::as_str)
}

fn matches_selector(node: &Node, selector: &Selector) -> bool {
    if let Some(tag) = &selector.tag {
        if node.tag != tag.to_lowercase() {
            return false;
        }
    }
    selector.attrs.iter().all(|constraint| match constraint {
        AttrMatch::Equals { name, value } => attr_value(node, name) == Some(value.as_str()),
        AttrMatch::Contains { name, value } => {
            attr_value(node, name).is_some_and(|v| v.contains(value.as_str()))
        }
    })
}

fn matches_query(node: &Node, query: &Query) -> bool {
    query.selectors.iter().any(|s| matches_selector(node, s))
}

fn collect_matches(nodes: &[Node], root: usize, query: &Query, out: &mut Vec<usize>) {
    if matches_query(&nodes[root], query) {
        out.push(root);
    }
    for child in &nodes[root].children {
        collect_matches(nodes, *child, query, out);
    }
}

fn text_content(nodes: &[Node], idx: usize) -> String {
    let node = &nodes[idx];
    let mut parts: Vec<String> = Vec::new();
    if !node.own_text.is_empty() {
        parts.push(node.own_text.clone());
    }
    for child in &node.children {
        let child_text = text_content(nodes, *child);
        if !child_text.is_empty() {
            parts.push(child_text);
        }
    }
    parts.join(" ")
}

fn effectively_visible(nodes: &[Node], idx: usize) -> bool {
    let node = &nodes[idx];
    if !node.visible {
        return false;
    }
    match node.parent {
        Some(parent) => effectively_visible(nodes, parent),
        None => true,
    }
}

#[async_trait]
impl DomBackend for MockDom {
    async fn contexts(&self) -> RotaResult<Vec<ContextId>> {
        let inner = self.lock();
        Ok((0..inner.documents.len()).map(ContextId).collect())
    }

    async fn query(&self, context: ContextId, query: &Query) -> RotaResult<Vec<DomNode>> {
        let inner = self.lock();
        let Some(root) = inner.documents.get(context.0).copied() else {
            return Ok(Vec::new());
        };
        let mut hits = Vec::new();
        collect_matches(&inner.nodes, root, query, &mut hits);
        Ok(hits
            .into_iter()
            .map(|idx| DomNode::new(context, idx.to_string()))
            .collect())
    }

    async fn query_within(&self, node: &DomNode, query: &Query) -> RotaResult<Vec<DomNode>> {
        let inner = self.lock();
        let root = self.resolve(&inner, node)?;
        let mut hits = Vec::new();
        for child in &inner.nodes[root].children {
            collect_matches(&inner.nodes, *child, query, &mut hits);
        }
        Ok(hits
            .into_iter()
            .map(|idx| DomNode::new(node.context, idx.to_string()))
            .collect())
    }

    async fn children(&self, node: &DomNode) -> RotaResult<Vec<DomNode>> {
        let inner = self.lock();
        let idx = self.resolve(&inner, node)?;
        Ok(inner.nodes[idx]
            .children
            .iter()
            .map(|child| DomNode::new(node.context, child.to_string()))
            .collect())
    }

    async fn text(&self, node: &DomNode) -> RotaResult<String> {
        let inner = self.lock();
        let idx = self.resolve(&inner, node)?;
        Ok(text_content(&inner.nodes, idx))
    }

    async fn tag_name(&self, node: &DomNode) -> RotaResult<String> {
        let inner = self.lock();
        let idx = self.resolve(&inner, node)?;
        Ok(inner.nodes[idx].tag.clone())
    }

    async fn attr(&self, node: &DomNode, name: &str) -> RotaResult<Option<String>> {
        let inner = self.lock();
        let idx = self.resolve(&inner, node)?;
        Ok(attr_value(&inner.nodes[idx], name).map(str::to_string))
    }

    async fn is_displayed(&self, node: &DomNode) -> RotaResult<bool> {
        let inner = self.lock();
        let idx = self.resolve(&inner, node)?;
        Ok(effectively_visible(&inner.nodes, idx))
    }

    async fn click(&self, node: &DomNode) -> RotaResult<()> {
        let mut inner = self.lock();
        let idx = self.resolve(&inner, node)?;
        inner.clicks.push(idx);
        Ok(())
    }

    async fn set_value(&self, node: &DomNode, value: &str) -> RotaResult<()> {
        let mut inner = self.lock();
        let idx = self.resolve(&inner, node)?;
        inner.nodes[idx].value = Some(value.to_string());
        inner.fills.push((idx, value.to_string()));
        Ok(())
    }

    async fn set_frame_url(&self, context: ContextId, url: &str) -> RotaResult<()> {
        let mut inner = self.lock();
        inner.frame_navigations.push((context.0, url.to_string()));
        Ok(())
    }
}
