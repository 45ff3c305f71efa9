//! Heuristic element resolution.
//!
//! The portal guarantees nothing about its markup, so every lookup is
//! a ranked ladder of strategies evaluated first-match-wins: zero or
//! one handle comes back, never an error for a plain miss. Strategies
//! live in per-target submodules as explicit enums so each rung can be
//! exercised on its own against a mock document.
//!
//! Searches span the primary document and every accessible nested
//! frame in document order; frames the backend cannot reach are
//! skipped without comment.

mod cells;
mod inputs;
mod rows;
mod save;

pub use cells::CellStrategy;
pub use inputs::{InputRole, InputStrategy};
pub use rows::RowStrategy;
pub use save::SaveStrategy;

use std::sync::Arc;

use tracing::debug;

use crate::dom::{ContextId, DomBackend, DomNode};
use crate::names::NameResolver;

/// Resolves logical targets (employee row, day cell, form input, save
/// control) to DOM handles.
pub struct ElementLocator {
    dom: Arc<dyn DomBackend>,
    resolver: NameResolver,
}

impl ElementLocator {
    pub fn new(dom: Arc<dyn DomBackend>, resolver: NameResolver) -> Self {
        Self { dom, resolver }
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    /// Document contexts to search, primary first. A backend that
    /// cannot even enumerate contexts degrades to the primary document
    /// alone rather than aborting the lookup.
    pub(crate) async fn search_contexts(&self) -> Vec<ContextId> {
        match self.dom.contexts().await {
            Ok(contexts) => contexts,
            Err(err) => {
                debug!(%err, "context enumeration failed, falling back to primary");
                vec![ContextId::PRIMARY]
            }
        }
    }

    pub(crate) fn dom(&self) -> &dyn DomBackend {
        self.dom.as_ref()
    }

    /// Text content with driver errors coerced to empty. A node that
    /// went stale mid-scan reads as blank and simply fails to match.
    pub(crate) async fn text_of(&self, node: &DomNode) -> String {
        self.dom.text(node).await.unwrap_or_default()
    }

    pub(crate) async fn attr_of(&self, node: &DomNode, name: &str) -> String {
        self.dom
            .attr(node, name)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    pub(crate) async fn is_visible(&self, node: &DomNode) -> bool {
        self.dom.is_displayed(node).await.unwrap_or(false)
    }
}
