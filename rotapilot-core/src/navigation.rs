//! Portal page-state detection and navigation.
//!
//! Detection is disjunctive best-effort: a false "on the scheduling
//! page" only costs failed lookups downstream, never a wrong write,
//! so broad signals are acceptable. Navigation tries a ranked ladder
//! of ways to reach the scheduling screen and re-checks after each.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{TimingConfig, WebDriverConfig};
use crate::dom::{ContextId, DomBackend, DomNode, Query, Selector};
use crate::error::{RotaError, RotaResult};
use crate::wait::{await_condition, sleep_ms, CancelHandle};

/// Ranked ways of getting to the scheduling screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMethod {
    /// Click a menu item whose text mentions scheduling.
    MenuItem,
    /// Click a header module element.
    HeaderModule,
    /// Open a burger menu, then click a scheduling item inside it.
    BurgerMenu,
    /// Rewrite the content frame's URL directly.
    FrameUrl,
    /// Click any link or button mentioning schedule, rota, or shift.
    LinkText,
}

impl NavMethod {
    pub const ALL: [NavMethod; 5] = [
        NavMethod::MenuItem,
        NavMethod::HeaderModule,
        NavMethod::BurgerMenu,
        NavMethod::FrameUrl,
        NavMethod::LinkText,
    ];
}

fn login_form_query() -> Query {
    Query::new(vec![
        Selector::tag("form").attr_contains("name", "login"),
        Selector::tag("form").attr_contains("id", "login"),
        Selector::tag("form").attr_contains("class", "login"),
    ])
}

fn schedule_container_query() -> Query {
    Query::new(vec![
        Selector::any().attr_contains("class", "schedule"),
        Selector::any().attr_contains("class", "rota"),
        Selector::any().attr_contains("id", "schedule"),
    ])
}

fn employee_row_query() -> Query {
    Query::new(vec![
        Selector::any().attr_contains("class", "employee-row"),
        Selector::tag("tr").attr_contains("class", "employee"),
        Selector::tag("tr").attr_contains("class", "staff"),
    ])
}

fn day_header_query() -> Query {
    Query::new(vec![
        Selector::any().attr_contains("class", "day-header"),
        Selector::any().attr_contains("class", "day-column"),
        Selector::tag("th").attr_contains("class", "day"),
    ])
}

fn header_text_query() -> Query {
    Query::new(vec![
        Selector::any().attr_contains("class", "header"),
        Selector::any().attr_contains("class", "module-title"),
        Selector::tag("h1"),
        Selector::tag("h2"),
    ])
}

fn menu_item_query() -> Query {
    Query::new(vec![
        Selector::tag("a"),
        Selector::tag("li"),
        Selector::any().attr_eq("role", "menuitem"),
        Selector::any().attr_contains("class", "menu-item"),
    ])
}

fn header_module_query() -> Query {
    Query::new(vec![
        Selector::any().attr_contains("class", "header-module"),
        Selector::any().attr_contains("class", "module-nav"),
        Selector::any().attr_contains("id", "module"),
    ])
}

fn burger_query() -> Query {
    Query::new(vec![
        Selector::any().attr_contains("class", "burger"),
        Selector::any().attr_contains("class", "hamburger"),
        Selector::any().attr_contains("class", "menu-toggle"),
    ])
}

fn broad_link_query() -> Query {
    Query::new(vec![
        Selector::tag("a"),
        Selector::tag("button"),
        Selector::tag("li"),
        Selector::tag("span"),
        Selector::any().attr_eq("role", "button"),
    ])
}

const SCHEDULE_WORDS: [&str; 3] = ["schedule", "rota", "shift"];

pub struct NavigationController {
    dom: Arc<dyn DomBackend>,
    timing: TimingConfig,
    portal: WebDriverConfig,
}

impl NavigationController {
    pub fn new(dom: Arc<dyn DomBackend>, timing: TimingConfig, portal: WebDriverConfig) -> Self {
        Self {
            dom,
            timing,
            portal,
        }
    }

    async fn contexts(&self) -> Vec<ContextId> {
        self.dom
            .contexts()
            .await
            .unwrap_or_else(|_| vec![ContextId::PRIMARY])
    }

    async fn count_matches(&self, query: &Query) -> usize {
        let mut count = 0;
        for context in self.contexts().await {
            count += self
                .dom
                .query(context, query)
                .await
                .map(|nodes| nodes.len())
                .unwrap_or(0);
        }
        count
    }

    /// A login-named form is visible somewhere.
    pub async fn is_login_page(&self) -> bool {
        self.count_matches(&login_form_query()).await > 0
    }

    /// Any of several scheduling-screen signals fires. Checked
    /// broadest-first so the common cases short-circuit early.
    pub async fn is_scheduling_page(&self) -> bool {
        if self.count_matches(&schedule_container_query()).await > 0 {
            return true;
        }
        if self.count_matches(&employee_row_query()).await > 0 {
            return true;
        }
        if self.count_matches(&day_header_query()).await >= 7 {
            return true;
        }
        for context in self.contexts().await {
            let headers = self
                .dom
                .query(context, &header_text_query())
                .await
                .unwrap_or_default();
            for node in headers {
                let text = self.dom.text(&node).await.unwrap_or_default();
                if text.to_lowercase().contains("scheduling") {
                    return true;
                }
            }
        }
        // Weakest signal: a content frame exists at all. Last resort
        // on a frameset-era portal where the grid lives in a frame.
        self.contexts().await.len() > 1
    }

    /// Block until the login form goes away. Unbounded on purpose; a
    /// human has to type the credentials. Cancellation is the only
    /// exit besides success.
    pub async fn wait_for_login(&self, cancel: &CancelHandle) -> RotaResult<()> {
        info!("waiting for manual login");
        while self.is_login_page().await {
            if cancel.is_cancelled() {
                return Err(RotaError::Cancelled);
            }
            sleep_ms(self.timing.login_poll_interval_ms).await;
        }
        info!("login form gone, continuing");
        Ok(())
    }

    /// Work down the navigation ladder until the scheduling page is
    /// detected. Exhausting every method is a navigation failure; the
    /// orchestrator treats that as advisory, not fatal.
    pub async fn navigate_to_scheduling_page(&self) -> RotaResult<()> {
        for method in NavMethod::ALL {
            debug!(?method, "trying navigation method");
            if !self.try_method(method).await {
                continue;
            }
            let confirmed = await_condition(
                self.timing.nav_poll_interval_ms,
                self.timing.nav_poll_attempts,
                || self.is_scheduling_page(),
            )
            .await;
            if confirmed {
                info!(?method, "scheduling page reached");
                return Ok(());
            }
        }
        Err(RotaError::NavigationFailed(
            "every navigation method was exhausted".to_string(),
        ))
    }

    /// Run one method's action. Returns whether anything was actually
    /// done; a method whose target elements are absent is skipped.
    async fn try_method(&self, method: NavMethod) -> bool {
        match method {
            NavMethod::MenuItem => {
                self.click_by_text(&menu_item_query(), &["scheduling"]).await
            }
            NavMethod::HeaderModule => {
                let modules = self.query_all_contexts(&header_module_query()).await;
                match modules.into_iter().next() {
                    Some(node) => self.click_and_settle(&node).await,
                    None => false,
                }
            }
            NavMethod::BurgerMenu => {
                let burgers = self.query_all_contexts(&burger_query()).await;
                let Some(burger) = burgers.into_iter().next() else {
                    return false;
                };
                if self.dom.click(&burger).await.is_err() {
                    return false;
                }
                sleep_ms(self.timing.menu_open_ms).await;
                self.click_by_text(&menu_item_query(), &["scheduling"]).await
            }
            NavMethod::FrameUrl => {
                let contexts = self.contexts().await;
                let Some(frame) = contexts.into_iter().find(|c| !c.is_primary()) else {
                    return false;
                };
                if self
                    .dom
                    .set_frame_url(frame, &self.portal.schedule_frame_url)
                    .await
                    .is_err()
                {
                    return false;
                }
                sleep_ms(self.timing.frame_nav_settle_ms).await;
                true
            }
            NavMethod::LinkText => {
                self.click_by_text(&broad_link_query(), &SCHEDULE_WORDS).await
            }
        }
    }

    /// Last-ditch fallback used after the ladder fails: click anything
    /// mentioning schedule, rota, or shift and hope.
    pub async fn broad_fallback_click(&self) -> bool {
        let clicked = self.click_by_text(&broad_link_query(), &SCHEDULE_WORDS).await;
        if !clicked {
            warn!("broad fallback found nothing to click");
        }
        clicked
    }

    async fn query_all_contexts(&self, query: &Query) -> Vec<DomNode> {
        let mut all = Vec::new();
        for context in self.contexts().await {
            all.extend(self.dom.query(context, query).await.unwrap_or_default());
        }
        all
    }

    async fn click_by_text(&self, query: &Query, words: &[&str]) -> bool {
        for node in self.query_all_contexts(query).await {
            let text = self.dom.text(&node).await.unwrap_or_default().to_lowercase();
            if words.iter().any(|w| text.contains(w)) {
                return self.click_and_settle(&node).await;
            }
        }
        false
    }

    async fn click_and_settle(&self, node: &DomNode) -> bool {
        if self.dom.click(node).await.is_err() {
            return false;
        }
        sleep_ms(self.timing.nav_click_settle_ms).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{el, MockDom};

    fn controller(dom: Arc<MockDom>) -> NavigationController {
        NavigationController::new(dom, TimingConfig::instant(), WebDriverConfig::default())
    }

    #[tokio::test]
    async fn test_login_form_detected() {
        let dom = Arc::new(MockDom::with_body([el("form").attr("name", "loginForm")]));
        assert!(controller(dom).is_login_page().await);
    }

    #[tokio::test]
    async fn test_plain_page_is_not_login() {
        let dom = Arc::new(MockDom::with_body([el("form").attr("name", "search")]));
        assert!(!controller(dom).is_login_page().await);
    }

    #[tokio::test]
    async fn test_schedule_container_detected() {
        let dom = Arc::new(MockDom::with_body([el("div")
            .attr("class", "schedule-grid")]));
        assert!(controller(dom).is_scheduling_page().await);
    }

    #[tokio::test]
    async fn test_seven_day_headers_detected() {
        let headers =
            (0..7).map(|_| el("th").attr("class", "day-header"));
        let dom = Arc::new(MockDom::with_body(headers));
        assert!(controller(dom).is_scheduling_page().await);
    }

    #[tokio::test]
    async fn test_blank_single_document_is_not_scheduling() {
        let dom = Arc::new(MockDom::with_body([el("div").text("welcome")]));
        assert!(!controller(dom).is_scheduling_page().await);
    }

    #[tokio::test]
    async fn test_menu_navigation_clicks_scheduling_item() {
        // The menu link is present but the page never changes, so the
        // ladder exhausts; what matters is the click fired.
        let dom = Arc::new(MockDom::with_body([
            el("a").text("Home"),
            el("a").text("Scheduling"),
        ]));
        let nav = controller(dom.clone());
        let result = nav.navigate_to_scheduling_page().await;
        assert!(matches!(result, Err(RotaError::NavigationFailed(_))));
        assert!(!dom.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_navigation_succeeds_when_grid_present() {
        let dom = Arc::new(MockDom::with_body([
            el("a").text("Scheduling"),
            el("div").attr("class", "schedule-grid"),
        ]));
        let nav = controller(dom);
        nav.navigate_to_scheduling_page().await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_login_wait_errors() {
        let dom = Arc::new(MockDom::with_body([el("form").attr("name", "login")]));
        let cancel = CancelHandle::new();
        cancel.request_cancel();
        let err = controller(dom).wait_for_login(&cancel).await.unwrap_err();
        assert!(matches!(err, RotaError::Cancelled));
    }
}
