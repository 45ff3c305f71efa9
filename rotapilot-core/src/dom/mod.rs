//! Abstraction over the host page's DOM.
//!
//! The portal's markup has no stable contract: it changes between
//! snapshots, nests content in frames, and may re-render at any time.
//! Everything above this layer treats the DOM as an untrusted external
//! store reached through [`DomBackend`], so the same locator and
//! orchestration code runs against a live WebDriver session or the
//! in-memory mock used in tests.

mod selector;

pub use selector::{AttrMatch, Query, Selector};

use async_trait::async_trait;

use crate::error::RotaResult;

/// One searchable document: the primary document or an accessible
/// nested frame. Context 0 is always the primary document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub usize);

impl ContextId {
    pub const PRIMARY: ContextId = ContextId(0);

    pub fn is_primary(&self) -> bool {
        self.0 == 0
    }
}

/// Opaque handle to one element in one document context.
///
/// Handles are only valid for a single locate-use cycle: the host may
/// re-render between actions, so nothing above this layer holds a node
/// across an await that could let the page change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode {
    pub context: ContextId,
    pub handle: String,
}

impl DomNode {
    pub fn new(context: ContextId, handle: impl Into<String>) -> Self {
        Self {
            context,
            handle: handle.into(),
        }
    }
}

/// A located element plus the index of the strategy that found it,
/// kept for diagnostics: a high index means a degraded, low-confidence
/// match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedElement {
    pub node: DomNode,
    pub strategy: usize,
}

impl ResolvedElement {
    pub fn new(node: DomNode, strategy: usize) -> Self {
        Self { node, strategy }
    }
}

/// Backend interface to a live document tree.
///
/// Implementations must tolerate arbitrary absence: a query that
/// matches nothing returns an empty list, and an inaccessible frame is
/// silently left out of [`contexts`](DomBackend::contexts). Only
/// transport-level trouble surfaces as an error.
#[async_trait]
pub trait DomBackend: Send + Sync {
    /// All searchable document contexts, primary document first, then
    /// accessible nested frames in document order. Cross-origin frames
    /// are omitted.
    async fn contexts(&self) -> RotaResult<Vec<ContextId>>;

    /// All elements matching `query` within one context, in document
    /// order.
    async fn query(&self, context: ContextId, query: &Query) -> RotaResult<Vec<DomNode>>;

    /// All descendants of `node` matching `query`, in document order.
    async fn query_within(&self, node: &DomNode, query: &Query) -> RotaResult<Vec<DomNode>>;

    /// Direct element children of `node`, in order.
    async fn children(&self, node: &DomNode) -> RotaResult<Vec<DomNode>>;

    /// Concatenated visible text content of `node` and its subtree.
    async fn text(&self, node: &DomNode) -> RotaResult<String>;

    /// Lowercase tag name.
    async fn tag_name(&self, node: &DomNode) -> RotaResult<String>;

    /// Attribute value, if present. Form controls report their current
    /// value under `"value"`.
    async fn attr(&self, node: &DomNode, name: &str) -> RotaResult<Option<String>>;

    /// Whether the element is currently rendered visible.
    async fn is_displayed(&self, node: &DomNode) -> RotaResult<bool>;

    /// Click the element. Irreversible from the portal's point of view.
    async fn click(&self, node: &DomNode) -> RotaResult<()>;

    /// Set a form control's value and fire synthetic bubbling `input`
    /// and `change` events, in that order. Both are required: host-page
    /// frameworks differ in which one they observe.
    async fn set_value(&self, node: &DomNode, value: &str) -> RotaResult<()>;

    /// Point a frame context at a new URL. Only meaningful for frame
    /// contexts; used as a last-resort navigation method.
    async fn set_frame_url(&self, context: ContextId, url: &str) -> RotaResult<()>;
}
