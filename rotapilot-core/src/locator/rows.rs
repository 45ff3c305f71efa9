//! Employee row resolution.

use tracing::{debug, trace};

use crate::dom::{DomNode, Query, ResolvedElement, Selector};
use crate::model::Weekday;

use super::ElementLocator;

/// Ranked strategies for mapping an employee name to a row. The index
/// of the matching strategy is kept on the result for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStrategy {
    /// The name appears verbatim (case-insensitive) in a row's text.
    ExactText,
    /// A row's text, or one of its tokens, is similar to the name
    /// under the fuzzy name rules.
    SimilarName,
    /// Some element's text contains a token of the name. Low
    /// confidence; row-shaped elements are preferred over the first
    /// arbitrary container.
    TokenContainment,
}

impl RowStrategy {
    pub const ALL: [RowStrategy; 3] = [
        RowStrategy::ExactText,
        RowStrategy::SimilarName,
        RowStrategy::TokenContainment,
    ];
}

/// Elements that plausibly represent one employee's schedule line.
fn row_query() -> Query {
    Query::new(vec![
        Selector::tag("tr"),
        Selector::any().attr_eq("role", "row"),
        Selector::any().attr_contains("class", "row"),
        Selector::any().attr_contains("class", "employee"),
        Selector::any().attr_contains("class", "staff"),
    ])
}

/// Containers worth scanning for name fragments in the last-resort
/// token pass. Deliberately excludes body-level wrappers.
fn fragment_query() -> Query {
    Query::tags(["tr", "td", "th", "li", "a", "span", "div", "label"])
}

fn looks_like_header(class: &str) -> bool {
    let class = class.to_lowercase();
    ["header", "heading", "title", "head"]
        .iter()
        .any(|marker| class.contains(marker))
}

/// Split row text into tokens worth fuzzy-matching against a name.
/// Schedule rows mix names with day headers and times; single
/// characters, pure numbers, and anything starting with a weekday
/// abbreviation ("Mon", "Tue"...) would otherwise substring-match
/// names like "Monica" and resolve the wrong row.
fn name_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '|'))
        .filter(|token| {
            token.len() > 1
                && !token.chars().all(|c| c.is_ascii_digit())
                && !starts_with_day_abbrev(token)
        })
}

fn starts_with_day_abbrev(token: &str) -> bool {
    let token = token.to_lowercase();
    Weekday::ALL
        .iter()
        .any(|day| token.starts_with(&day.abbrev().to_lowercase()))
}

fn looks_like_row(tag: &str, class: &str, role: &str) -> bool {
    tag == "tr" || role == "row" || {
        let class = class.to_lowercase();
        class.contains("row") || class.contains("employee") || class.contains("staff")
    }
}

impl ElementLocator {
    /// Find the schedule row for `name`, or `None` when no strategy
    /// matched anywhere. A miss is a result, not an error; the caller
    /// records the employee as missing and moves on.
    pub async fn find_employee_row(&self, name: &str) -> Option<ResolvedElement> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        for (index, strategy) in RowStrategy::ALL.iter().enumerate() {
            if let Some(node) = self.try_row_strategy(*strategy, name).await {
                debug!(name, strategy = ?strategy, "resolved employee row");
                return Some(ResolvedElement::new(node, index));
            }
        }
        debug!(name, "no row strategy matched");
        None
    }

    async fn try_row_strategy(&self, strategy: RowStrategy, name: &str) -> Option<DomNode> {
        match strategy {
            RowStrategy::ExactText => self.row_by_exact_text(name).await,
            RowStrategy::SimilarName => self.row_by_similar_name(name).await,
            RowStrategy::TokenContainment => self.row_by_token(name).await,
        }
    }

    async fn row_by_exact_text(&self, name: &str) -> Option<DomNode> {
        let needle = name.to_lowercase();
        for context in self.search_contexts().await {
            let rows = match self.dom().query(context, &row_query()).await {
                Ok(rows) => rows,
                Err(_) => continue,
            };
            for row in rows {
                if self.text_of(&row).await.to_lowercase().contains(&needle) {
                    return Some(row);
                }
            }
        }
        None
    }

    async fn row_by_similar_name(&self, name: &str) -> Option<DomNode> {
        for context in self.search_contexts().await {
            let rows = match self.dom().query(context, &row_query()).await {
                Ok(rows) => rows,
                Err(_) => continue,
            };
            for row in rows {
                if looks_like_header(&self.attr_of(&row, "class").await) {
                    continue;
                }
                let text = self.text_of(&row).await;
                if text.trim().is_empty() {
                    continue;
                }
                if self.resolver().similar(&text, name)
                    || name_candidates(&text).any(|token| self.resolver().similar(token, name))
                {
                    return Some(row);
                }
            }
        }
        None
    }

    async fn row_by_token(&self, name: &str) -> Option<DomNode> {
        let tokens: Vec<String> = name
            .split_whitespace()
            .filter(|t| t.len() > 1)
            .map(str::to_lowercase)
            .collect();
        if tokens.is_empty() {
            return None;
        }

        for context in self.search_contexts().await {
            let candidates = match self.dom().query(context, &fragment_query()).await {
                Ok(nodes) => nodes,
                Err(_) => continue,
            };
            let mut first_hit: Option<DomNode> = None;
            for node in candidates {
                let text = self.text_of(&node).await.to_lowercase();
                if !tokens.iter().any(|token| text.contains(token.as_str())) {
                    continue;
                }
                let tag = self.dom().tag_name(&node).await.unwrap_or_default();
                let class = self.attr_of(&node, "class").await;
                let role = self.attr_of(&node, "role").await;
                if looks_like_row(&tag, &class, &role) {
                    trace!(?node, "token match on row-shaped element");
                    return Some(node);
                }
                first_hit.get_or_insert(node);
            }
            if let Some(node) = first_hit {
                trace!(?node, "token match on non-row element, low confidence");
                return Some(node);
            }
        }
        None
    }
}
