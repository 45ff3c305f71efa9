//! Day cell resolution within a resolved employee row.

use tracing::debug;

use crate::dom::{DomNode, Query, ResolvedElement, Selector};
use crate::model::Weekday;

use super::ElementLocator;

/// Ranked strategies for picking the cell for a given weekday out of a
/// row. Each positional strategy must yield at least `index + 1` cells
/// to be trusted; the ladder widens from purpose-tagged cells to
/// anything cell-shaped, with a text match on the day name as the
/// final resort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStrategy {
    /// Cells explicitly tagged or classed as day cells.
    Tagged,
    /// Direct `td` children of the row.
    DirectChildren,
    /// Cell-shaped descendants, minus ones that look like the
    /// employee-name or header cell.
    FilteredGeneric,
    /// Every cell-shaped descendant, unfiltered.
    AllCells,
    /// Any descendant whose text is exactly the weekday name.
    DayName,
}

impl CellStrategy {
    pub const ALL: [CellStrategy; 5] = [
        CellStrategy::Tagged,
        CellStrategy::DirectChildren,
        CellStrategy::FilteredGeneric,
        CellStrategy::AllCells,
        CellStrategy::DayName,
    ];
}

fn tagged_cell_query() -> Query {
    Query::new(vec![
        Selector::any().attr_contains("class", "day-cell"),
        Selector::tag("td").attr_contains("class", "day"),
        Selector::any().attr_contains("class", "shift-cell"),
        Selector::any().attr_eq("role", "gridcell"),
    ])
}

fn generic_cell_query() -> Query {
    Query::new(vec![
        Selector::tag("td"),
        Selector::any().attr_contains("class", "cell"),
    ])
}

/// Text longer than this is assumed to be a name/summary cell, not a
/// day cell.
const MAX_DAY_CELL_TEXT: usize = 40;

fn identifying_class(class: &str) -> bool {
    let class = class.to_lowercase();
    ["name", "employee", "staff", "header", "title", "total"]
        .iter()
        .any(|marker| class.contains(marker))
}

impl ElementLocator {
    /// Resolve the cell for `day` within `row`, or `None` when every
    /// strategy came up short. The caller records a cell-not-found
    /// failure for this shift only.
    pub async fn find_day_cell(&self, row: &ResolvedElement, day: Weekday) -> Option<ResolvedElement> {
        let index = day.index();
        for (strategy_index, strategy) in CellStrategy::ALL.iter().enumerate() {
            let cells = self.cells_for_strategy(*strategy, &row.node, day).await;
            if let Some(cell) = self.pick_cell(*strategy, cells, index) {
                debug!(%day, strategy = ?strategy, "resolved day cell");
                return Some(ResolvedElement::new(cell, strategy_index));
            }
        }
        debug!(%day, "no cell strategy matched");
        None
    }

    fn pick_cell(&self, strategy: CellStrategy, cells: Vec<DomNode>, index: usize) -> Option<DomNode> {
        match strategy {
            // The day-name strategy matches one cell directly.
            CellStrategy::DayName => cells.into_iter().next(),
            _ => {
                if cells.len() > index {
                    cells.into_iter().nth(index)
                } else {
                    None
                }
            }
        }
    }

    async fn cells_for_strategy(
        &self,
        strategy: CellStrategy,
        row: &DomNode,
        day: Weekday,
    ) -> Vec<DomNode> {
        match strategy {
            CellStrategy::Tagged => self
                .dom()
                .query_within(row, &tagged_cell_query())
                .await
                .unwrap_or_default(),
            CellStrategy::DirectChildren => {
                let mut cells = Vec::new();
                for child in self.dom().children(row).await.unwrap_or_default() {
                    if self.dom().tag_name(&child).await.unwrap_or_default() == "td" {
                        cells.push(child);
                    }
                }
                cells
            }
            CellStrategy::FilteredGeneric => {
                let candidates = self
                    .dom()
                    .query_within(row, &generic_cell_query())
                    .await
                    .unwrap_or_default();
                let mut cells = Vec::new();
                for node in candidates {
                    if identifying_class(&self.attr_of(&node, "class").await) {
                        continue;
                    }
                    if self.text_of(&node).await.trim().len() > MAX_DAY_CELL_TEXT {
                        continue;
                    }
                    cells.push(node);
                }
                cells
            }
            CellStrategy::AllCells => self
                .dom()
                .query_within(row, &generic_cell_query())
                .await
                .unwrap_or_default(),
            CellStrategy::DayName => {
                let candidates = self
                    .dom()
                    .query_within(row, &Query::all())
                    .await
                    .unwrap_or_default();
                let wanted = day.name().to_lowercase();
                let mut matched = Vec::new();
                for node in candidates {
                    if self.text_of(&node).await.trim().to_lowercase() == wanted {
                        matched.push(node);
                        break;
                    }
                }
                matched
            }
        }
    }
}
