//! End-to-end tests for the DocuSign node.
//!
//! Every test runs `DocuSignNode::execute` against the `nodes::mock`
//! doubles, so requests are observed exactly as the host would send them.

use std::collections::HashMap;
use std::time::Duration;

use nodes::mock::{context, MemoryBinary, MockTransport, StaticParameters};
use nodes::{ExecutableNode, HttpMethod, HttpResponse, NodeError, TransportError};
use serde_json::{json, Value};

use crate::{DocuSignNode, NodeConfig};

const ACCOUNT_URL: &str = "https://demo.docusign.net/restapi/v2.1/accounts/acc-1";
const ENVELOPE_ID: &str = "6d3b1c52-9d1f-4a5e-8f0b-2c7e4a1d9b30";

fn secrets() -> HashMap<String, String> {
    HashMap::from([
        ("environment".to_owned(), "demo".to_owned()),
        ("accountId".to_owned(), "acc-1".to_owned()),
    ])
}

async fn run(
    node: &DocuSignNode,
    params: StaticParameters,
    transport: &MockTransport,
) -> Result<Vec<nodes::OutputRecord>, NodeError> {
    let binary = MemoryBinary::new();
    let ctx = context(&params, transport, &binary, secrets());
    node.execute(&ctx).await
}

fn fatal_message(result: Result<Vec<nodes::OutputRecord>, NodeError>) -> String {
    match result {
        Err(NodeError::Fatal(message)) => message,
        other => panic!("expected a fatal error, got {other:?}"),
    }
}

/// Serves `total` envelopes, honouring `start_position`/`count`.
fn envelope_source(total: usize) -> MockTransport {
    MockTransport::responding(move |req| {
        let start: usize = req.query_param("start_position").unwrap_or("0").parse().unwrap();
        let count: usize = req.query_param("count").unwrap_or("100").parse().unwrap();
        let end = (start + count).min(total);
        let envelopes: Vec<Value> = (start..end).map(|i| json!({ "envelopeId": format!("env-{i}") })).collect();
        Ok(HttpResponse::json_body(&json!({
            "envelopes": envelopes,
            "resultSetSize": (end - start).to_string(),
            "totalSetSize": total.to_string(),
        })))
    })
}

// ============================================================
// Validation happens before any request
// ============================================================

#[tokio::test]
async fn blank_account_custom_field_name_sends_nothing() {
    let transport = MockTransport::new();
    let params = StaticParameters::single(json!({
        "resource": "accountCustomField",
        "operation": "create",
        "fieldName": "",
    }));

    let message = fatal_message(run(&DocuSignNode::new(), params, &transport).await);
    assert!(message.contains("fieldName is required"));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn chunked_upload_with_zero_total_size_is_rejected() {
    let transport = MockTransport::new();
    let params = StaticParameters::single(json!({
        "resource": "chunkedUpload",
        "operation": "initiate",
        "totalSize": 0,
        "data": "aGVsbG8=",
    }));

    let message = fatal_message(run(&DocuSignNode::new(), params, &transport).await);
    assert!(message.contains("positive number"));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn connect_config_pointing_at_metadata_service_is_rejected() {
    let transport = MockTransport::new();
    let params = StaticParameters::single(json!({
        "resource": "connectConfig",
        "operation": "create",
        "name": "events",
        "urlToPublishTo": "http://169.254.169.254/metadata",
    }));

    let message = fatal_message(run(&DocuSignNode::new(), params, &transport).await);
    assert!(message.contains("valid URL"));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn unknown_resource_operation_pair_is_rejected() {
    let transport = MockTransport::new();
    for (resource, operation) in [("envelope", "shred"), ("hologram", "get"), ("folder", "delete")] {
        let params = StaticParameters::single(json!({ "resource": resource, "operation": operation }));
        let message = fatal_message(run(&DocuSignNode::new(), params, &transport).await);
        assert!(message.contains("Unknown operation"), "{message}");
        assert!(message.contains(resource));
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn update_without_fields_is_rejected_for_every_updatable_resource() {
    let transport = MockTransport::new();
    let cases = [
        json!({ "resource": "envelope", "operation": "update", "envelopeId": ENVELOPE_ID }),
        json!({ "resource": "template", "operation": "update", "templateId": ENVELOPE_ID, "updateFields": {} }),
        json!({ "resource": "user", "operation": "update", "userId": ENVELOPE_ID, "updateFields": {} }),
        json!({ "resource": "group", "operation": "update", "groupId": "12", "updateFields": {} }),
        json!({ "resource": "recipient", "operation": "update", "envelopeId": ENVELOPE_ID, "recipientId": "1", "updateFields": {} }),
    ];
    for case in cases {
        let params = StaticParameters::single(case);
        let message = fatal_message(run(&DocuSignNode::new(), params, &transport).await);
        assert!(message.contains("At least one update field"), "{message}");
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn missing_account_id_is_fatal() {
    let transport = MockTransport::new();
    let params = StaticParameters::single(json!({ "resource": "account", "operation": "get" }));
    let binary = MemoryBinary::new();
    let ctx = context(&params, &transport, &binary, HashMap::new());

    let message = fatal_message(DocuSignNode::new().execute(&ctx).await);
    assert!(message.contains("accountId is required"));
}

// ============================================================
// Requests and normalised output
// ============================================================

#[tokio::test]
async fn create_envelope_posts_to_account_url() {
    let transport = MockTransport::new().push_json(json!({ "envelopeId": ENVELOPE_ID, "status": "sent" }));
    let params = StaticParameters::single(json!({
        "resource": "envelope",
        "operation": "create",
        "emailSubject": "Please sign",
        "signerEmail": "ada@example.com",
        "signerName": "Ada Lovelace",
        "document": "JVBERi0xLjc=",
        "documentName": "contract.pdf",
        "additionalFields": { "routingOrder": 2 },
    }));

    let out = run(&DocuSignNode::new(), params, &transport).await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].json["envelopeId"], ENVELOPE_ID);

    let requests = transport.requests();
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].url, format!("{ACCOUNT_URL}/envelopes"));
    let body = requests[0].body.as_ref().unwrap();
    assert_eq!(body["recipients"]["signers"][0]["routingOrder"], json!("2"));
}

#[tokio::test]
async fn recipients_are_flattened_and_tagged() {
    let transport = MockTransport::new().push_json(json!({
        "signers": [{ "recipientId": "1", "email": "a@example.com" }],
        "carbonCopies": [{ "recipientId": "2", "email": "b@example.com" }],
        "certifiedDeliveries": [],
        "recipientCount": "2",
    }));
    let params = StaticParameters::single(json!({
        "resource": "recipient",
        "operation": "getAll",
        "envelopeId": ENVELOPE_ID,
        "returnAll": true,
    }));

    let out = run(&DocuSignNode::new(), params, &transport).await.unwrap();
    let types: Vec<&str> = out.iter().map(|r| r.json["recipientType"].as_str().unwrap()).collect();
    assert_eq!(types, ["signer", "carbonCopy"]);
    assert_eq!(transport.requests()[0].url, format!("{ACCOUNT_URL}/envelopes/{ENVELOPE_ID}/recipients"));
}

#[tokio::test]
async fn custom_fields_are_flattened_across_text_and_list() {
    let transport = MockTransport::new().push_json(json!({
        "textCustomFields": [{ "fieldId": "1", "name": "PO" }],
        "listCustomFields": [{ "fieldId": "2", "name": "Region", "listItems": ["EU"] }],
    }));
    let params = StaticParameters::single(json!({
        "resource": "accountCustomField",
        "operation": "getAll",
        "returnAll": true,
    }));

    let out = run(&DocuSignNode::new(), params, &transport).await.unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].json["fieldType"], "text");
    assert_eq!(out[1].json["fieldType"], "list");
}

#[tokio::test]
async fn envelope_listing_stops_at_limit() {
    let transport = envelope_source(25);
    let params = StaticParameters::single(json!({
        "resource": "envelope",
        "operation": "getAll",
        "limit": 10,
    }));

    let out = run(&DocuSignNode::new(), params, &transport).await.unwrap();
    assert_eq!(out.len(), 10);
    assert_eq!(transport.call_count(), 1);
    let request = &transport.requests()[0];
    assert_eq!(request.query_param("count"), Some("10"));
    assert!(request.query_param("from_date").is_some());
}

#[tokio::test]
async fn envelope_listing_return_all_walks_every_page() {
    let transport = envelope_source(25);
    let node = DocuSignNode::with_config(NodeConfig {
        page_size: 10,
        ..NodeConfig::default()
    });
    let params = StaticParameters::single(json!({
        "resource": "envelope",
        "operation": "getAll",
        "returnAll": true,
    }));

    let out = run(&node, params, &transport).await.unwrap();
    assert_eq!(out.len(), 25);
    assert_eq!(out[24].json["envelopeId"], "env-24");
    let offsets: Vec<String> = transport
        .requests()
        .iter()
        .map(|r| r.query_param("start_position").unwrap().to_owned())
        .collect();
    assert_eq!(offsets, ["0", "10", "20"]);
}

#[tokio::test]
async fn folder_items_are_read_from_each_folder() {
    let transport = MockTransport::new().push_json(json!({
        "resultSetSize": "2",
        "startPosition": "0",
        "endPosition": "1",
        "totalRows": "2",
        "folders": [{
            "folderId": "inbox-1",
            "folderItems": [
                { "envelopeId": "env-a", "subject": "NDA" },
                { "envelopeId": "env-b", "subject": "MSA" },
            ],
        }],
    }));
    let params = StaticParameters::single(json!({
        "resource": "folder",
        "operation": "getItems",
        "folderId": "inbox-1",
        "returnAll": true,
    }));

    let out = run(&DocuSignNode::new(), params, &transport).await.unwrap();
    let ids: Vec<&str> = out.iter().map(|r| r.json["envelopeId"].as_str().unwrap()).collect();
    assert_eq!(ids, ["env-a", "env-b"]);
    // totalRows says the listing is complete after one page.
    assert_eq!(transport.call_count(), 1);
    assert_eq!(transport.requests()[0].url, format!("{ACCOUNT_URL}/folders/inbox-1"));
}

#[tokio::test]
async fn document_download_produces_binary_record() {
    let transport = MockTransport::new().push(Ok(HttpResponse::bytes(b"%PDF-1.7".to_vec(), "application/pdf")));
    let params = StaticParameters::single(json!({
        "resource": "document",
        "operation": "download",
        "envelopeId": ENVELOPE_ID,
        "documentId": "1",
        "additionalFields": { "fileName": "signed.pdf" },
    }));

    let out = run(&DocuSignNode::new(), params, &transport).await.unwrap();
    let binary = out[0].binary.as_ref().unwrap();
    assert_eq!(binary.data, "JVBERi0xLjc=");
    assert_eq!(binary.file_name, "signed.pdf");
    assert_eq!(binary.mime_type, "application/pdf");
    assert_eq!(out[0].json["fileSize"], 8);
    assert_eq!(transport.requests()[0].url, format!("{ACCOUNT_URL}/envelopes/{ENVELOPE_ID}/documents/1"));
}

#[tokio::test]
async fn delete_emits_success_record_with_ids() {
    let transport = MockTransport::new().push(Ok(HttpResponse {
        status: 200,
        ..Default::default()
    }));
    let params = StaticParameters::single(json!({
        "resource": "recipient",
        "operation": "delete",
        "envelopeId": ENVELOPE_ID,
        "recipientId": "2",
    }));

    let out = run(&DocuSignNode::new(), params, &transport).await.unwrap();
    assert_eq!(
        out[0].json,
        json!({ "success": true, "envelopeId": ENVELOPE_ID, "recipientId": "2" })
    );
    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Delete);
    assert_eq!(request.url, format!("{ACCOUNT_URL}/envelopes/{ENVELOPE_ID}/recipients/2"));
}

#[tokio::test]
async fn envelope_lock_delete_carries_token_header() {
    let transport = MockTransport::new();
    let params = StaticParameters::single(json!({
        "resource": "envelopeLock",
        "operation": "delete",
        "envelopeId": ENVELOPE_ID,
        "lockToken": "lock-123",
    }));

    run(&DocuSignNode::new(), params, &transport).await.unwrap();
    let request = &transport.requests()[0];
    let (name, value) = &request.headers[0];
    assert_eq!(name, "X-DocuSign-Edit");
    assert!(value.contains("lock-123"));
}

// ============================================================
// Per-item failures
// ============================================================

#[tokio::test]
async fn continue_on_fail_captures_errors_per_item() {
    let transport = MockTransport::new()
        .push_json(json!({ "envelopeId": ENVELOPE_ID, "status": "sent" }))
        .push_error(TransportError::http(404, "ENVELOPE_DOES_NOT_EXIST"));
    let params = StaticParameters::items(vec![
        json!({ "resource": "envelope", "operation": "get", "envelopeId": ENVELOPE_ID }),
        json!({ "resource": "envelope", "operation": "get", "envelopeId": "not-a-uuid" }),
        json!({ "resource": "envelope", "operation": "get", "envelopeId": ENVELOPE_ID }),
    ]);
    let binary = MemoryBinary::new();
    let mut ctx = context(&params, &transport, &binary, secrets());
    ctx.continue_on_fail = true;

    let out = DocuSignNode::new().execute(&ctx).await.unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].json["status"], "sent");
    assert_eq!(out[1].error_message(), Some("envelopeId must be a valid UUID"));
    assert_eq!(out[1].paired_item, 1);
    assert!(out[2].error_message().unwrap().contains("ENVELOPE_DOES_NOT_EXIST"));
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn first_failure_aborts_batch_without_continue_on_fail() {
    let transport = MockTransport::new();
    let params = StaticParameters::items(vec![
        json!({ "resource": "envelope", "operation": "get" }),
        json!({ "resource": "envelope", "operation": "get", "envelopeId": ENVELOPE_ID }),
    ]);

    let message = fatal_message(run(&DocuSignNode::new(), params, &transport).await);
    assert!(message.contains("envelopeId is required"));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn rate_limit_is_retryable_with_retry_after() {
    let transport = MockTransport::new().push_error(
        TransportError::http(429, "HOURLY_APIINVOCATION_LIMIT_EXCEEDED").with_header("Retry-After", "42"),
    );
    let params = StaticParameters::single(json!({ "resource": "account", "operation": "get" }));

    match run(&DocuSignNode::new(), params, &transport).await {
        Err(NodeError::Retryable(message)) => assert!(message.contains("retry after 42s"), "{message}"),
        other => panic!("expected retryable error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retryable_and_client_errors_fatal() {
    let transport = MockTransport::new()
        .push_error(TransportError::http(503, "unavailable"))
        .push_error(TransportError::http(400, "INVALID_REQUEST_PARAMETER"));
    let params = StaticParameters::single(json!({ "resource": "billing", "operation": "getPlan" }));
    let node = DocuSignNode::with_config(NodeConfig {
        retry_after_fallback: Duration::from_secs(7),
        ..NodeConfig::default()
    });

    assert!(matches!(
        run(&node, params.clone(), &transport).await,
        Err(NodeError::Retryable(_))
    ));
    assert!(matches!(
        run(&node, params, &transport).await,
        Err(NodeError::Fatal(_))
    ));
}
