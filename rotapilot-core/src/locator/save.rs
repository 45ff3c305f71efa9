//! Save control resolution.

use tracing::debug;

use crate::dom::{ContextId, DomNode, Query, ResolvedElement, Selector};

use super::ElementLocator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStrategy {
    /// Submit-typed or save/submit-classed controls.
    SubmitClassed,
    /// Clickable elements whose text is exactly "save", then ones
    /// merely containing it.
    SaveText,
    /// Common synonyms (OK, Submit, Confirm, Done, Apply, Update),
    /// exact match first, containment second.
    Synonyms,
    /// Primary-action-classed elements, shape unknown.
    PrimaryAction,
}

impl SaveStrategy {
    pub const ALL: [SaveStrategy; 4] = [
        SaveStrategy::SubmitClassed,
        SaveStrategy::SaveText,
        SaveStrategy::Synonyms,
        SaveStrategy::PrimaryAction,
    ];
}

const SAVE_SYNONYMS: [&str; 6] = ["ok", "submit", "confirm", "done", "apply", "update"];

fn submit_query() -> Query {
    Query::new(vec![
        Selector::tag("button").attr_eq("type", "submit"),
        Selector::tag("input").attr_eq("type", "submit"),
        Selector::any().attr_contains("class", "save"),
        Selector::any().attr_contains("class", "submit"),
    ])
}

fn clickable_query() -> Query {
    Query::new(vec![
        Selector::tag("button"),
        Selector::tag("a"),
        Selector::tag("input").attr_eq("type", "button"),
        Selector::any().attr_eq("role", "button"),
    ])
}

fn primary_action_query() -> Query {
    Query::new(vec![
        Selector::any().attr_contains("class", "primary"),
        Selector::any().attr_contains("class", "btn-action"),
    ])
}

impl ElementLocator {
    /// Resolve the save control of the open shift form, or `None` when
    /// the ladder is exhausted. The caller must not click anything when
    /// this misses.
    pub async fn find_save_control(&self, context: ContextId) -> Option<ResolvedElement> {
        for (index, strategy) in SaveStrategy::ALL.iter().enumerate() {
            if let Some(node) = self.try_save_strategy(*strategy, context).await {
                debug!(strategy = ?strategy, "resolved save control");
                return Some(ResolvedElement::new(node, index));
            }
        }
        debug!("no save strategy matched");
        None
    }

    async fn try_save_strategy(&self, strategy: SaveStrategy, context: ContextId) -> Option<DomNode> {
        match strategy {
            SaveStrategy::SubmitClassed => {
                let found = self
                    .dom()
                    .query(context, &submit_query())
                    .await
                    .unwrap_or_default();
                self.first_visible(found).await
            }
            SaveStrategy::SaveText => self.clickable_by_text(context, &["save"]).await,
            SaveStrategy::Synonyms => self.clickable_by_text(context, &SAVE_SYNONYMS).await,
            SaveStrategy::PrimaryAction => {
                let found = self
                    .dom()
                    .query(context, &primary_action_query())
                    .await
                    .unwrap_or_default();
                self.first_visible(found).await
            }
        }
    }

    /// Visible clickable whose text matches one of `wanted`, exact
    /// match before containment.
    async fn clickable_by_text(&self, context: ContextId, wanted: &[&str]) -> Option<DomNode> {
        let candidates = self
            .dom()
            .query(context, &clickable_query())
            .await
            .unwrap_or_default();

        let mut texts = Vec::with_capacity(candidates.len());
        for node in candidates {
            let text = self.text_of(&node).await.trim().to_lowercase();
            texts.push((node, text));
        }

        for (node, text) in &texts {
            if wanted.contains(&text.as_str()) && self.is_visible(node).await {
                return Some(node.clone());
            }
        }
        for (node, text) in &texts {
            if wanted.iter().any(|w| text.contains(w)) && self.is_visible(node).await {
                return Some(node.clone());
            }
        }
        None
    }
}
