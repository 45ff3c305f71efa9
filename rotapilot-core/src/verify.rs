//! Post-save verification.
//!
//! The portal exposes no transactional acknowledgment, so all this can
//! do is wait for loading indicators to clear and look for error
//! banners. A `true` means "likely saved", never "confirmed".

use std::sync::Arc;

use tracing::debug;

use crate::config::TimingConfig;
use crate::dom::{ContextId, DomBackend, Query, Selector};
use crate::wait::{await_condition, sleep_ms};

fn spinner_query() -> Query {
    Query::new(vec![
        Selector::any().attr_contains("class", "loading"),
        Selector::any().attr_contains("class", "spinner"),
        Selector::any().attr_contains("class", "progress"),
    ])
}

fn error_query() -> Query {
    Query::new(vec![
        Selector::any().attr_contains("class", "error"),
        Selector::any().attr_contains("class", "alert"),
        Selector::any().attr_contains("class", "validation"),
        Selector::any().attr_eq("role", "alert"),
    ])
}

pub struct SaveVerifier {
    dom: Arc<dyn DomBackend>,
    timing: TimingConfig,
}

impl SaveVerifier {
    pub fn new(dom: Arc<dyn DomBackend>, timing: TimingConfig) -> Self {
        Self { dom, timing }
    }

    /// Report whether the save that was just clicked looks to have
    /// gone through. Never errors: a driver failure mid-check reads as
    /// "nothing alarming visible" and the optimistic answer stands.
    pub async fn confirm(&self, context: ContextId) -> bool {
        sleep_ms(self.timing.save_start_ms).await;

        let settled = await_condition(
            self.timing.save_poll_interval_ms,
            self.timing.save_poll_attempts,
            || self.no_visible_spinner(context),
        )
        .await;
        if !settled {
            // Budget exhausted with a spinner still up. Not fatal on
            // its own; the error scan below has the final word.
            debug!("loading indicator never cleared within budget");
        }

        if self.visible_error(context).await {
            debug!("error element visible after save");
            return false;
        }

        sleep_ms(self.timing.post_save_settle_ms).await;
        true
    }

    async fn no_visible_spinner(&self, context: ContextId) -> bool {
        let spinners = match self.dom.query(context, &spinner_query()).await {
            Ok(nodes) => nodes,
            Err(_) => return true,
        };
        for node in spinners {
            if self.dom.is_displayed(&node).await.unwrap_or(false) {
                return false;
            }
        }
        true
    }

    async fn visible_error(&self, context: ContextId) -> bool {
        let banners = match self.dom.query(context, &error_query()).await {
            Ok(nodes) => nodes,
            Err(_) => return false,
        };
        for node in banners {
            if !self.dom.is_displayed(&node).await.unwrap_or(false) {
                continue;
            }
            let text = self.dom.text(&node).await.unwrap_or_default();
            if !text.trim().is_empty() {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{el, MockDom};

    fn verifier(dom: Arc<MockDom>) -> SaveVerifier {
        SaveVerifier::new(dom, TimingConfig::instant())
    }

    #[tokio::test]
    async fn test_clean_page_confirms() {
        let dom = Arc::new(MockDom::with_body([el("div").text("Schedule")]));
        assert!(verifier(dom).confirm(ContextId::PRIMARY).await);
    }

    #[tokio::test]
    async fn test_visible_error_banner_fails() {
        let dom = Arc::new(MockDom::with_body([el("div")
            .attr("class", "error-message")
            .text("Shift overlaps an existing entry")]));
        assert!(!verifier(dom).confirm(ContextId::PRIMARY).await);
    }

    #[tokio::test]
    async fn test_hidden_error_banner_is_ignored() {
        let dom = Arc::new(MockDom::with_body([el("div")
            .attr("class", "error-message")
            .text("stale template error")
            .hidden()]));
        assert!(verifier(dom).confirm(ContextId::PRIMARY).await);
    }

    #[tokio::test]
    async fn test_empty_error_element_is_ignored() {
        let dom = Arc::new(MockDom::with_body([el("div").attr("class", "error")]));
        assert!(verifier(dom).confirm(ContextId::PRIMARY).await);
    }

    #[tokio::test]
    async fn test_persistent_spinner_alone_does_not_fail() {
        let dom = Arc::new(MockDom::with_body([el("div")
            .attr("class", "spinner")
            .text("...")]));
        assert!(verifier(dom).confirm(ContextId::PRIMARY).await);
    }
}
