//! Wire-protocol coverage for the WebDriver backend against a stubbed
//! endpoint.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rotapilot_core::driver::WebDriverBackend;
use rotapilot_core::{ContextId, DomBackend, DomNode, Query, RotaError, Selector};

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

fn element_ref(id: &str) -> serde_json::Value {
    json!({ ELEMENT_KEY: id })
}

#[tokio::test]
async fn test_new_session_extracts_session_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { "sessionId": "abc123", "capabilities": {} }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = WebDriverBackend::new_session(&server.uri()).await.unwrap();
    assert_eq!(backend.session_id(), "abc123");
}

#[tokio::test]
async fn test_new_session_without_id_is_a_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": {} })))
        .mount(&server)
        .await;

    let err = WebDriverBackend::new_session(&server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, RotaError::DriverProtocol(_)));
}

#[tokio::test]
async fn test_query_compiles_to_css_and_parses_elements() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/s1/elements"))
        .and(body_partial_json(json!({
            "using": "css selector",
            "value": "tr[class*=\"employee\"]"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [element_ref("e1"), element_ref("e2")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = WebDriverBackend::attach(&server.uri(), "s1");
    let query = Query::one(Selector::tag("tr").attr_contains("class", "employee"));
    let found = backend.query(ContextId::PRIMARY, &query).await.unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].handle, "e1");
    assert_eq!(found[0].context, ContextId::PRIMARY);
}

#[tokio::test]
async fn test_click_posts_to_element_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/s1/element/e9/click"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = WebDriverBackend::attach(&server.uri(), "s1");
    let node = DomNode::new(ContextId::PRIMARY, "e9");
    backend.click(&node).await.unwrap();
}

#[tokio::test]
async fn test_set_value_runs_script_with_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/s1/execute/sync"))
        .and(body_partial_json(json!({ "args": [element_ref("e2"), "09:00"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = WebDriverBackend::attach(&server.uri(), "s1");
    let node = DomNode::new(ContextId::PRIMARY, "e2");
    backend.set_value(&node, "09:00").await.unwrap();
}

#[tokio::test]
async fn test_stale_element_error_is_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/e1/text"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "value": { "error": "stale element reference", "message": "gone" }
        })))
        .mount(&server)
        .await;

    let backend = WebDriverBackend::attach(&server.uri(), "s1");
    let node = DomNode::new(ContextId::PRIMARY, "e1");
    let err = backend.text(&node).await.unwrap_err();
    assert!(matches!(err, RotaError::StaleElement(_)));
}

#[tokio::test]
async fn test_missing_attribute_reads_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/e1/attribute/class"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .mount(&server)
        .await;

    let backend = WebDriverBackend::attach(&server.uri(), "s1");
    let node = DomNode::new(ContextId::PRIMARY, "e1");
    assert_eq!(backend.attr(&node, "class").await.unwrap(), None);
}

#[tokio::test]
async fn test_contexts_probes_frames() {
    let server = MockServer::start().await;
    // Top switch, one frame found, frame switch probe, switch back.
    Mock::given(method("POST"))
        .and(path("/session/s1/frame"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/elements"))
        .and(body_partial_json(json!({ "value": "iframe, frame" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [element_ref("f1")]
        })))
        .mount(&server)
        .await;

    let backend = WebDriverBackend::attach(&server.uri(), "s1");
    let contexts = backend.contexts().await.unwrap();
    assert_eq!(contexts, vec![ContextId::PRIMARY, ContextId(1)]);
}
