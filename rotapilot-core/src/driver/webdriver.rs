//! W3C WebDriver backend.
//!
//! Drives a real browser through a WebDriver endpoint (chromedriver,
//! geckodriver, a Selenium grid) speaking the JSON-over-HTTP wire
//! protocol directly. Frame handling is the fiddly part: WebDriver
//! frame focus is session state, so every context-scoped call
//! re-establishes focus from the top document before acting, and a
//! frame that refuses the switch is treated as inaccessible and
//! silently skipped.

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::dom::{ContextId, DomBackend, DomNode, Query};
use crate::error::{RotaError, RotaResult};

/// W3C element identifier key in wire payloads.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const SET_VALUE_SCRIPT: &str = "const el = arguments[0]; el.value = arguments[1]; \
     el.dispatchEvent(new Event('input', { bubbles: true })); \
     el.dispatchEvent(new Event('change', { bubbles: true }));";

const CHILDREN_SCRIPT: &str = "return Array.from(arguments[0].children);";

const SET_FRAME_SRC_SCRIPT: &str = "arguments[0].src = arguments[1];";

#[derive(Debug)]
struct FrameState {
    /// Context the session is currently focused on.
    current: ContextId,
}

/// DOM backend over a live WebDriver session.
#[derive(Debug)]
pub struct WebDriverBackend {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
    state: Mutex<FrameState>,
}

impl WebDriverBackend {
    /// Open a fresh session against a WebDriver endpoint.
    pub async fn new_session(base_url: &str) -> RotaResult<Self> {
        let http = reqwest::Client::new();
        let response = http
            .post(format!("{}/session", base_url.trim_end_matches('/')))
            .json(&json!({ "capabilities": { "alwaysMatch": {} } }))
            .send()
            .await?;
        let body: Value = response.json().await?;

        let session_id = body["value"]["sessionId"]
            .as_str()
            .ok_or_else(|| {
                RotaError::DriverProtocol(format!("no sessionId in response: {body}"))
            })?
            .to_string();

        debug!(session_id, "opened webdriver session");
        Ok(Self::attach_with_client(http, base_url, &session_id))
    }

    /// Attach to an already-running session, e.g. one the user logged
    /// in with by hand.
    pub fn attach(base_url: &str, session_id: &str) -> Self {
        Self::attach_with_client(reqwest::Client::new(), base_url, session_id)
    }

    fn attach_with_client(http: reqwest::Client, base_url: &str, session_id: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: session_id.to_string(),
            state: Mutex::new(FrameState {
                current: ContextId::PRIMARY,
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Navigate the browser to a URL.
    pub async fn goto(&self, url: &str) -> RotaResult<()> {
        let mut state = self.state.lock().await;
        state.current = ContextId::PRIMARY;
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    /// End the session.
    pub async fn quit(&self) -> RotaResult<()> {
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        self.http.delete(url).send().await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, path)
    }

    async fn post(&self, path: &str, body: Value) -> RotaResult<Value> {
        let response = self.http.post(self.endpoint(path)).json(&body).send().await?;
        Self::unwrap_value(response).await
    }

    async fn get(&self, path: &str) -> RotaResult<Value> {
        let response = self.http.get(self.endpoint(path)).send().await?;
        Self::unwrap_value(response).await
    }

    async fn unwrap_value(response: reqwest::Response) -> RotaResult<Value> {
        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            let error = body["value"]["error"].as_str().unwrap_or("unknown");
            let message = body["value"]["message"].as_str().unwrap_or("");
            if error == "stale element reference" {
                return Err(RotaError::StaleElement(message.to_string()));
            }
            return Err(RotaError::DriverProtocol(format!("{error}: {message}")));
        }
        Ok(body["value"].clone())
    }

    fn element_ref(id: &str) -> Value {
        json!({ ELEMENT_KEY: id })
    }

    fn parse_element(value: &Value) -> Option<String> {
        value[ELEMENT_KEY].as_str().map(str::to_string)
    }

    fn parse_element_list(value: &Value) -> Vec<String> {
        value
            .as_array()
            .map(|items| items.iter().filter_map(Self::parse_element).collect())
            .unwrap_or_default()
    }

    /// Switch session focus back to the top document.
    async fn switch_to_top(&self) -> RotaResult<()> {
        self.post("/frame", json!({ "id": null })).await?;
        Ok(())
    }

    /// Element handles for every frame in the top document, in
    /// document order. Looks at both `iframe` and legacy `frame` tags;
    /// the portal is frameset-era markup.
    async fn top_frame_elements(&self) -> RotaResult<Vec<String>> {
        let found = self
            .post(
                "/elements",
                json!({ "using": "css selector", "value": "iframe, frame" }),
            )
            .await?;
        Ok(Self::parse_element_list(&found))
    }

    /// Re-establish focus on `context`, starting from the top document.
    /// Frame element references go stale across navigations, so frames
    /// are re-enumerated on every switch.
    async fn focus(&self, state: &mut FrameState, context: ContextId) -> RotaResult<()> {
        if state.current == context {
            return Ok(());
        }
        self.switch_to_top().await?;
        state.current = ContextId::PRIMARY;

        if !context.is_primary() {
            let frames = self.top_frame_elements().await?;
            let frame_id = frames.get(context.0 - 1).ok_or_else(|| {
                RotaError::StaleElement(format!("frame context {} disappeared", context.0))
            })?;
            self.post("/frame", json!({ "id": Self::element_ref(frame_id) }))
                .await?;
            state.current = context;
        }
        Ok(())
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> RotaResult<Value> {
        self.post("/execute/sync", json!({ "script": script, "args": args }))
            .await
    }
}

#[async_trait]
impl DomBackend for WebDriverBackend {
    async fn contexts(&self) -> RotaResult<Vec<ContextId>> {
        let mut state = self.state.lock().await;
        self.switch_to_top().await?;
        state.current = ContextId::PRIMARY;

        let mut contexts = vec![ContextId::PRIMARY];
        let frames = self.top_frame_elements().await?;
        for (i, frame_id) in frames.iter().enumerate() {
            let context = ContextId(i + 1);
            // Probe accessibility: cross-origin frames refuse the switch.
            match self
                .post("/frame", json!({ "id": Self::element_ref(frame_id) }))
                .await
            {
                Ok(_) => {
                    contexts.push(context);
                    self.switch_to_top().await?;
                }
                Err(err) => {
                    warn!(frame = context.0, %err, "skipping inaccessible frame");
                }
            }
        }
        Ok(contexts)
    }

    async fn query(&self, context: ContextId, query: &Query) -> RotaResult<Vec<DomNode>> {
        let mut state = self.state.lock().await;
        self.focus(&mut state, context).await?;
        let found = self
            .post(
                "/elements",
                json!({ "using": "css selector", "value": query.to_css() }),
            )
            .await?;
        Ok(Self::parse_element_list(&found)
            .into_iter()
            .map(|id| DomNode::new(context, id))
            .collect())
    }

    async fn query_within(&self, node: &DomNode, query: &Query) -> RotaResult<Vec<DomNode>> {
        let mut state = self.state.lock().await;
        self.focus(&mut state, node.context).await?;
        let found = self
            .post(
                &format!("/element/{}/elements", node.handle),
                json!({ "using": "css selector", "value": query.to_css() }),
            )
            .await?;
        Ok(Self::parse_element_list(&found)
            .into_iter()
            .map(|id| DomNode::new(node.context, id))
            .collect())
    }

    async fn children(&self, node: &DomNode) -> RotaResult<Vec<DomNode>> {
        let mut state = self.state.lock().await;
        self.focus(&mut state, node.context).await?;
        let found = self
            .execute(CHILDREN_SCRIPT, vec![Self::element_ref(&node.handle)])
            .await?;
        Ok(Self::parse_element_list(&found)
            .into_iter()
            .map(|id| DomNode::new(node.context, id))
            .collect())
    }

    async fn text(&self, node: &DomNode) -> RotaResult<String> {
        let mut state = self.state.lock().await;
        self.focus(&mut state, node.context).await?;
        let value = self.get(&format!("/element/{}/text", node.handle)).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn tag_name(&self, node: &DomNode) -> RotaResult<String> {
        let mut state = self.state.lock().await;
        self.focus(&mut state, node.context).await?;
        let value = self.get(&format!("/element/{}/name", node.handle)).await?;
        Ok(value.as_str().unwrap_or_default().to_lowercase())
    }

    async fn attr(&self, node: &DomNode, name: &str) -> RotaResult<Option<String>> {
        let mut state = self.state.lock().await;
        self.focus(&mut state, node.context).await?;
        let value = self
            .get(&format!("/element/{}/attribute/{}", node.handle, name))
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn is_displayed(&self, node: &DomNode) -> RotaResult<bool> {
        let mut state = self.state.lock().await;
        self.focus(&mut state, node.context).await?;
        let value = self
            .get(&format!("/element/{}/displayed", node.handle))
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn click(&self, node: &DomNode) -> RotaResult<()> {
        let mut state = self.state.lock().await;
        self.focus(&mut state, node.context).await?;
        self.post(&format!("/element/{}/click", node.handle), json!({}))
            .await?;
        Ok(())
    }

    async fn set_value(&self, node: &DomNode, value: &str) -> RotaResult<()> {
        let mut state = self.state.lock().await;
        self.focus(&mut state, node.context).await?;
        self.execute(
            SET_VALUE_SCRIPT,
            vec![Self::element_ref(&node.handle), json!(value)],
        )
        .await?;
        Ok(())
    }

    async fn set_frame_url(&self, context: ContextId, url: &str) -> RotaResult<()> {
        if context.is_primary() {
            return Err(RotaError::DriverProtocol(
                "cannot rewrite the primary document's URL as a frame".to_string(),
            ));
        }
        let mut state = self.state.lock().await;
        // The frame element lives in the top document.
        self.switch_to_top().await?;
        state.current = ContextId::PRIMARY;

        let frames = self.top_frame_elements().await?;
        let frame_id = frames.get(context.0 - 1).ok_or_else(|| {
            RotaError::StaleElement(format!("frame context {} disappeared", context.0))
        })?;
        self.execute(
            SET_FRAME_SRC_SCRIPT,
            vec![Self::element_ref(frame_id), json!(url)],
        )
        .await?;
        Ok(())
    }
}
