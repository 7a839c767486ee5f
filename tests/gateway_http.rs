use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use msgbatch::api::BatchApi;
use msgbatch::config::BatchConfig;
use msgbatch::error::BatchError;
use msgbatch::gateway::http::HttpGateway;
use msgbatch::gateway::BatchGateway;
use msgbatch::model::{BatchItem, Draft, ProcessingStatus, TrackedStatus};
use serde_json::json;

fn gateway(server: &MockServer) -> HttpGateway {
    let config = BatchConfig::new("sk-test").with_base_url(server.url("/v1"));
    HttpGateway::new(&config).unwrap()
}

fn batch_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": "message_batch",
        "processing_status": status,
        "request_counts": {
            "processing": 1,
            "succeeded": 2,
            "errored": 0,
            "canceled": 0,
            "expired": 0
        },
        "created_at": "2024-09-24T18:37:24.100435Z",
        "ended_at": null,
        "expires_at": "2024-09-25T18:37:24.100435Z",
        "results_url": null
    })
}

#[test]
fn create_batch_posts_requests_with_headers() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/messages/batches")
            .header("x-api-key", "sk-test")
            .header("anthropic-version", "2023-06-01")
            .header("anthropic-beta", "message-batches-2024-09-24")
            .header("content-type", "application/json")
            .body_includes("\"custom_id\":\"q1\"")
            .body_includes("\"role\":\"user\"")
            .body_includes("\"max_tokens\":64");
        then.status(200).json_body(batch_json("msgbatch_01", "in_progress"));
    });

    let items = vec![BatchItem::new("q1", "claude-3-haiku", 64, "Hello").unwrap()];
    let handle = gateway(&server).create_batch(&items).unwrap();
    mock.assert();
    assert_eq!(handle.id, "msgbatch_01");
    assert_eq!(handle.created_at.to_rfc3339().get(..10), Some("2024-09-24"));
}

#[test]
fn create_batch_without_id_is_malformed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/messages/batches");
        then.status(200).json_body(json!({ "type": "message_batch" }));
    });

    let items = vec![BatchItem::new("q1", "m", 1, "x").unwrap()];
    let err = gateway(&server).create_batch(&items).unwrap_err();
    match err {
        BatchError::MalformedResponse(msg) => assert!(msg.contains("batch ID")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn non_success_status_carries_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/messages/batches/missing");
        then.status(404)
            .body(r#"{"type":"error","error":{"type":"not_found_error","message":"nope"}}"#);
    });

    let err = gateway(&server).get_batch_status("missing").unwrap_err();
    match err {
        BatchError::Api { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("not_found_error"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn status_decodes_snapshot() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/messages/batches/msgbatch_01");
        then.status(200).json_body(batch_json("msgbatch_01", "ended"));
    });

    let snapshot = gateway(&server).get_batch_status("msgbatch_01").unwrap();
    assert_eq!(snapshot.processing_status, ProcessingStatus::Ended);
    assert_eq!(snapshot.request_counts.total(), 3);
    assert!(snapshot.ended_at.is_none());
    assert!(snapshot.expires_at.is_some());
}

#[test]
fn list_passes_limit_and_reads_data() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/messages/batches")
            .query_param("limit", "5");
        then.status(200).json_body(json!({
            "data": [batch_json("b2", "in_progress"), batch_json("b1", "ended")],
            "has_more": false
        }));
    });

    let batches = gateway(&server).list_batches(5).unwrap();
    mock.assert();
    let ids: Vec<&str> = batches.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["b2", "b1"]);
}

#[test]
fn cancel_returns_new_status() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/messages/batches/b1/cancel");
        then.status(200).json_body(batch_json("b1", "canceling"));
    });

    let api = BatchApi::new(gateway(&server));
    let result = api.cancel("b1").unwrap();
    mock.assert();
    assert!(result.cancel_accepted);
}

#[test]
fn results_stream_stops_at_malformed_line() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/messages/batches/b1/results");
        then.status(200).body(concat!(
            r#"{"custom_id":"a","result":{"type":"succeeded","message":{"content":[{"type":"text","text":"Hi"}]}}}"#,
            "\n\n",
            "not json\n",
            r#"{"custom_id":"c","result":{"type":"expired"}}"#,
            "\n"
        ));
    });

    let mut stream = gateway(&server).get_batch_results("b1").unwrap();
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.custom_id, "a");
    assert_eq!(first.content, "Hi");
    assert!(matches!(
        stream.next(),
        Some(Err(BatchError::MalformedResponse(_)))
    ));
    assert!(stream.next().is_none());
}

#[test]
fn api_submit_track_refresh_and_fetch_results() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/messages/batches");
        then.status(200).json_body(batch_json("msgbatch_01", "in_progress"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/messages/batches/msgbatch_01");
        then.status(200).json_body(batch_json("msgbatch_01", "ended"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/messages/batches/msgbatch_01/results");
        then.status(200).body(concat!(
            r#"{"custom_id":"q1","result":{"type":"errored","error":{"type":"error","error":{"type":"invalid_request_error","message":"bad model"}}}}"#,
            "\n"
        ));
    });

    let mut api = BatchApi::new(gateway(&server));
    let mut draft = Draft::new();
    api.add_item(&mut draft, "q1".into(), "m".into(), 10, "Hello".into())
        .unwrap();

    let handle = api.submit(&draft).unwrap().handle.unwrap();
    api.add_batch(&handle.id).unwrap();
    assert_eq!(api.status_of(&handle.id).status, TrackedStatus::Added);

    api.update_all().unwrap();
    assert_eq!(
        api.status_of(&handle.id).status,
        TrackedStatus::Remote(ProcessingStatus::Ended)
    );

    let results = api.retrieve_results(&handle.id).unwrap();
    let items: Vec<_> = results.items.map(|r| r.unwrap()).collect();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].status, "errored");
    assert_eq!(items[0].content, "bad model");
}

#[test]
fn unreachable_server_is_a_connection_failure() {
    let config = BatchConfig::new("sk-test").with_base_url("http://127.0.0.1:9/v1");
    let gateway = HttpGateway::new(&config).unwrap();
    let err = gateway.get_batch_status("b1").unwrap_err();
    assert!(err.is_connection());
}

#[test]
fn path_characters_in_batch_id_do_not_retarget_request() {
    let server = MockServer::start();
    let other_cancel = server.mock(|when, then| {
        when.method(POST).path("/v1/messages/batches/b2/cancel");
        then.status(200).json_body(batch_json("b2", "canceling"));
    });
    let b1_status = server.mock(|when, then| {
        when.method(GET).path("/v1/messages/batches/b1");
        then.status(200).json_body(batch_json("b1", "in_progress"));
    });

    let gw = gateway(&server);
    let err = gw.cancel_batch("b1/../b2").unwrap_err();
    assert!(matches!(err, BatchError::Api { status: 404, .. }));
    other_cancel.assert_hits(0);

    assert!(gw.get_batch_status("b1#zzz").is_err());
    assert!(gw.get_batch_status("b1?x=1").is_err());
    b1_status.assert_hits(0);

    assert!(matches!(
        gw.cancel_batch(".."),
        Err(BatchError::Validation(_))
    ));
}
