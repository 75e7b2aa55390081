//! Failure injection tests for the lookup gateway.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde_json::Value;

mod common;

fn assert_fallback(body: &Value, code: &str) {
    assert_eq!(body["cep"], code);
    assert_eq!(body["logradouro"], "Indisponível");
    assert_eq!(body["bairro"], "Indisponível");
    assert_eq!(body["localidade"], "Indisponível");
    assert_eq!(body["uf"], "NA");
    for field in ["complemento", "ibge", "gia", "ddd", "siafi"] {
        assert!(body[field].is_null(), "{field} should be unset");
    }
}

async fn lookup(client: &reqwest::Client, gateway: std::net::SocketAddr, code: &str) -> Value {
    let res = client
        .get(format!("http://{}/infocep/{}", gateway, code))
        .send()
        .await
        .expect("gateway unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

async fn breaker_status(client: &reqwest::Client, gateway: std::net::SocketAddr) -> Value {
    let res = client
        .get(format!("http://{}/status", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["breaker"].clone()
}

#[tokio::test]
async fn test_success_is_returned_verbatim() {
    let seen_path = Arc::new(Mutex::new(String::new()));
    let sp = seen_path.clone();
    let upstream = common::start_programmable_upstream(move |path| {
        *sp.lock().unwrap() = path;
        async move { (200, common::PAULISTA_JSON.to_string()) }
    })
    .await;

    let (gateway, shutdown) = common::start_gateway(common::test_config(upstream)).await;
    let body = lookup(&common::client(), gateway, "01310100").await;

    let expected: Value = serde_json::from_str(common::PAULISTA_JSON).unwrap();
    assert_eq!(body, expected);
    assert_eq!(*seen_path.lock().unwrap(), "/ws/01310100/json/");

    shutdown.trigger();
}

#[tokio::test]
async fn test_server_error_yields_fallback() {
    let upstream = common::start_programmable_upstream(|_| async {
        (500, "Internal Server Error".to_string())
    })
    .await;

    let (gateway, shutdown) = common::start_gateway(common::test_config(upstream)).await;
    let body = lookup(&common::client(), gateway, "01310100").await;
    assert_fallback(&body, "01310100");

    shutdown.trigger();
}

#[tokio::test]
async fn test_client_error_yields_fallback() {
    let upstream = common::start_programmable_upstream(|_| async {
        (400, "<h1>Bad Request</h1>".to_string())
    })
    .await;

    let (gateway, shutdown) = common::start_gateway(common::test_config(upstream)).await;
    let body = lookup(&common::client(), gateway, "INVALIDO").await;
    assert_fallback(&body, "INVALIDO");

    shutdown.trigger();
}

#[tokio::test]
async fn test_timeout_yields_fallback() {
    let upstream = common::start_programmable_upstream(|_| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, common::PAULISTA_JSON.to_string())
    })
    .await;

    let (gateway, shutdown) = common::start_gateway(common::test_config(upstream)).await;

    let started = Instant::now();
    let body = lookup(&common::client(), gateway, "01310100").await;
    assert!(started.elapsed() < Duration::from_secs(2), "timeout not enforced");
    assert_fallback(&body, "01310100");

    shutdown.trigger();
}

#[tokio::test]
async fn test_tightest_inbound_deadline_still_serves_fallback() {
    let upstream = common::start_programmable_upstream(|_| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, common::PAULISTA_JSON.to_string())
    })
    .await;

    let mut config = common::test_config(upstream);
    config.timeouts.request_secs = 1;
    config.upstream.request_timeout_ms = 700;
    let (gateway, shutdown) = common::start_gateway(config).await;

    let body = lookup(&common::client(), gateway, "01310100").await;
    assert_fallback(&body, "01310100");

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_body_yields_fallback() {
    let upstream = common::start_programmable_upstream(|_| async {
        (200, "<html>maintenance</html>".to_string())
    })
    .await;

    let (gateway, shutdown) = common::start_gateway(common::test_config(upstream)).await;
    let body = lookup(&common::client(), gateway, "01310100").await;
    assert_fallback(&body, "01310100");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_yields_fallback() {
    let dead = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let (gateway, shutdown) = common::start_gateway(common::test_config(dead)).await;
    let body = lookup(&common::client(), gateway, "20040020").await;
    assert_fallback(&body, "20040020");

    shutdown.trigger();
}

#[tokio::test]
async fn test_open_breaker_stops_upstream_calls() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let upstream = common::start_programmable_upstream(move |_| {
        cc.fetch_add(1, Ordering::SeqCst);
        async { (503, "Service Unavailable".to_string()) }
    })
    .await;

    let (gateway, shutdown) = common::start_gateway(common::test_config(upstream)).await;
    let client = common::client();

    for _ in 0..4 {
        assert_fallback(&lookup(&client, gateway, "01310100").await, "01310100");
    }
    assert_eq!(call_count.load(Ordering::SeqCst), 4);
    assert_eq!(breaker_status(&client, gateway).await["state"], "OPEN");

    for _ in 0..6 {
        assert_fallback(&lookup(&client, gateway, "01310100").await, "01310100");
    }
    assert_eq!(
        call_count.load(Ordering::SeqCst),
        4,
        "no upstream call while the breaker is open"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_breaker_recovers_after_cooldown() {
    let healthy = Arc::new(AtomicBool::new(false));
    let call_count = Arc::new(AtomicU32::new(0));
    let (h, cc) = (healthy.clone(), call_count.clone());
    let upstream = common::start_programmable_upstream(move |_| {
        cc.fetch_add(1, Ordering::SeqCst);
        let up = h.load(Ordering::SeqCst);
        async move {
            if up {
                (200, common::PAULISTA_JSON.to_string())
            } else {
                (502, "Bad Gateway".to_string())
            }
        }
    })
    .await;

    let mut config = common::test_config(upstream);
    config.breaker.open_cooldown_ms = 300;
    let (gateway, shutdown) = common::start_gateway(config).await;
    let client = common::client();

    for _ in 0..4 {
        lookup(&client, gateway, "01310100").await;
    }
    assert_eq!(breaker_status(&client, gateway).await["state"], "OPEN");

    // Failed trial: back to Open, cool-down restarts.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_fallback(&lookup(&client, gateway, "01310100").await, "01310100");
    assert_eq!(call_count.load(Ordering::SeqCst), 5);
    assert_eq!(breaker_status(&client, gateway).await["state"], "OPEN");
    assert_fallback(&lookup(&client, gateway, "01310100").await, "01310100");
    assert_eq!(call_count.load(Ordering::SeqCst), 5);

    // Successful trial closes the circuit.
    healthy.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(400)).await;
    let body = lookup(&client, gateway, "01310100").await;
    assert_eq!(body["logradouro"], "Avenida Paulista");
    assert_eq!(call_count.load(Ordering::SeqCst), 6);

    let status = breaker_status(&client, gateway).await;
    assert_eq!(status["state"], "CLOSED");
    assert_eq!(status["buffered_calls"], 0);
    assert_eq!(status["times_opened"], 2);

    shutdown.trigger();
}

#[tokio::test]
async fn test_strict_validation_rejects_malformed_codes() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let upstream = common::start_programmable_upstream(move |_| {
        cc.fetch_add(1, Ordering::SeqCst);
        async { (200, common::PAULISTA_JSON.to_string()) }
    })
    .await;

    let mut config = common::test_config(upstream);
    config.validation.strict = true;
    let (gateway, shutdown) = common::start_gateway(config).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/infocep/abc", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(call_count.load(Ordering::SeqCst), 0);

    let body = lookup(&client, gateway, "01310-100").await;
    assert_eq!(body["uf"], "SP");
    assert_eq!(call_count.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_is_assigned_and_propagated() {
    let upstream = common::start_programmable_upstream(|_| async {
        (200, common::PAULISTA_JSON.to_string())
    })
    .await;

    let (gateway, shutdown) = common::start_gateway(common::test_config(upstream)).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/health", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let generated = res.headers().get("x-request-id").expect("request id set");
    let generated = generated.to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok(), "not a uuid: {generated}");

    let res = client
        .get(format!("http://{}/infocep/01310100", gateway))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), "trace-me");

    shutdown.trigger();
}
