//! Every interception emits one tracing event, whatever the conversion.

use std::io::Write;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use must_core::{
    recover, recover_with, Abort, AbortResult, Fault, Handler, HttpRequest, HttpResponse, Recover,
    RequestHead,
};
use serde_json::Value;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn abort_events(&self) -> Vec<Value> {
        let raw = self.0.lock().unwrap().clone();
        String::from_utf8(raw)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).unwrap())
            .filter(|event| {
                event["fields"]["message"]
                    .as_str()
                    .is_some_and(|m| m.starts_with("request aborted"))
            })
            .collect()
    }
}

async fn fails_with_dup(_req: HttpRequest) -> AbortResult<HttpResponse> {
    Err(Fault::new(StatusCode::CONFLICT, "dup").into())
}

fn get(path: &str) -> HttpRequest {
    Request::builder().uri(path).body(Bytes::new()).unwrap()
}

async fn events_for<H: Handler>(handler: &H, path: &str) -> Vec<Value> {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);
    handler.call(get(path)).await.unwrap();
    captured.abort_events()
}

fn assert_one_event(events: &[Value], status: u64, kind: &str, path: &str) {
    assert_eq!(events.len(), 1, "{events:?}");
    let fields = &events[0]["fields"];
    assert_eq!(fields["status"], status);
    assert_eq!(fields["kind"], kind);
    assert_eq!(fields["path"], path);
    assert_eq!(fields["method"], "GET");
}

#[tokio::test]
async fn json_boundary_logs_interception() {
    let events = events_for(&recover(fails_with_dup), "/users").await;
    assert_one_event(&events, 409, "fault", "/users");
    assert_eq!(events[0]["level"], "WARN");
}

#[tokio::test]
async fn custom_boundary_logs_interception() {
    let boundary = recover_with(fails_with_dup, |_abort: Abort, _head: &RequestHead| {
        Response::new(Full::new(Bytes::from_static(b"custom")))
    });
    let events = events_for(&boundary, "/orders").await;
    assert_one_event(&events, 409, "fault", "/orders");
}

#[tokio::test]
async fn plain_boundary_logs_interception() {
    let boundary = Recover::plain(|_req: HttpRequest| async move {
        Err::<HttpResponse, _>(Abort::message("boom"))
    });
    let events = events_for(&boundary, "/").await;
    assert_one_event(&events, 500, "message", "/");
    assert_eq!(events[0]["level"], "ERROR");
}

#[tokio::test]
async fn completed_requests_log_nothing() {
    let boundary = recover(|_req: HttpRequest| async move {
        Ok::<_, Abort>(Response::new(Full::new(Bytes::new())))
    });
    assert!(events_for(&boundary, "/").await.is_empty());
}
