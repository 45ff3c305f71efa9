//! Shift form input resolution.

use std::fmt;

use tracing::debug;

use crate::dom::{ContextId, DomNode, Query, ResolvedElement, Selector};

use super::ElementLocator;

/// Which field of the shift form is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Start,
    End,
    Break,
}

impl InputRole {
    /// Tokens an input's attributes might carry for this role.
    pub fn tokens(&self) -> &'static [&'static str] {
        match self {
            InputRole::Start => &["start", "from", "begin"],
            InputRole::End => &["end", "to", "finish"],
            InputRole::Break => &["break", "rest", "pause"],
        }
    }
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRole::Start => f.write_str("start"),
            InputRole::End => f.write_str("end"),
            InputRole::Break => f.write_str("break"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStrategy {
    /// Role token in the input's `name`, `placeholder`, `id`, or
    /// `class` attribute.
    AttrTokens,
    /// Input nested inside a label whose text mentions the role.
    LabelText,
    /// Positional: exactly two time inputs map to start and end; the
    /// first number input is the break.
    Positional,
}

impl InputStrategy {
    pub const ALL: [InputStrategy; 3] = [
        InputStrategy::AttrTokens,
        InputStrategy::LabelText,
        InputStrategy::Positional,
    ];
}

const INPUT_ATTRS: [&str; 4] = ["name", "placeholder", "id", "class"];

fn attr_token_query(role: InputRole) -> Query {
    let mut selectors = Vec::new();
    for token in role.tokens() {
        for attr in INPUT_ATTRS {
            selectors.push(Selector::tag("input").attr_contains(attr, *token));
            selectors.push(Selector::tag("select").attr_contains(attr, *token));
        }
    }
    Query::new(selectors)
}

fn time_input_query() -> Query {
    Query::new(vec![
        Selector::tag("input").attr_eq("type", "time"),
        Selector::tag("input").attr_contains("class", "time"),
    ])
}

fn number_input_query() -> Query {
    Query::one(Selector::tag("input").attr_eq("type", "number"))
}

impl ElementLocator {
    /// Resolve the form input for `role` within `context`, the context
    /// the open shift form lives in. `None` when no strategy matched.
    pub async fn find_form_input(
        &self,
        context: ContextId,
        role: InputRole,
    ) -> Option<ResolvedElement> {
        for (index, strategy) in InputStrategy::ALL.iter().enumerate() {
            if let Some(node) = self.try_input_strategy(*strategy, context, role).await {
                debug!(%role, strategy = ?strategy, "resolved form input");
                return Some(ResolvedElement::new(node, index));
            }
        }
        debug!(%role, "no input strategy matched");
        None
    }

    async fn try_input_strategy(
        &self,
        strategy: InputStrategy,
        context: ContextId,
        role: InputRole,
    ) -> Option<DomNode> {
        match strategy {
            InputStrategy::AttrTokens => {
                let found = self
                    .dom()
                    .query(context, &attr_token_query(role))
                    .await
                    .unwrap_or_default();
                self.first_visible(found).await
            }
            InputStrategy::LabelText => self.input_by_label(context, role).await,
            InputStrategy::Positional => self.input_by_position(context, role).await,
        }
    }

    async fn input_by_label(&self, context: ContextId, role: InputRole) -> Option<DomNode> {
        let labels = self
            .dom()
            .query(context, &Query::tags(["label"]))
            .await
            .unwrap_or_default();
        for label in labels {
            let text = self.text_of(&label).await.to_lowercase();
            if !role.tokens().iter().any(|token| text.contains(token)) {
                continue;
            }
            let nested = self
                .dom()
                .query_within(&label, &Query::tags(["input", "select"]))
                .await
                .unwrap_or_default();
            if let Some(input) = nested.into_iter().next() {
                return Some(input);
            }
        }
        None
    }

    async fn input_by_position(&self, context: ContextId, role: InputRole) -> Option<DomNode> {
        match role {
            InputRole::Start | InputRole::End => {
                let inputs = self
                    .dom()
                    .query(context, &time_input_query())
                    .await
                    .unwrap_or_default();
                // Only trust position when the form has exactly one
                // start/end pair.
                if inputs.len() != 2 {
                    return None;
                }
                let index = if role == InputRole::Start { 0 } else { 1 };
                inputs.into_iter().nth(index)
            }
            InputRole::Break => {
                let inputs = self
                    .dom()
                    .query(context, &number_input_query())
                    .await
                    .unwrap_or_default();
                inputs.into_iter().next()
            }
        }
    }

    pub(crate) async fn first_visible(&self, nodes: Vec<DomNode>) -> Option<DomNode> {
        for node in nodes {
            if self.is_visible(&node).await {
                return Some(node);
            }
        }
        None
    }
}
