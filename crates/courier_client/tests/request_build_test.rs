//! Tests for request construction and client configuration.

mod test_utils;

use courier_client::Client;
use courier_client::options::{with_form, with_header, with_headers, with_query};
use courier_error::{CourierErrorKind, RequestBuildErrorKind};
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{MockBehavior, MockTransport, builder_with};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Serialize)]
struct NewFact {
    fact: String,
}

#[derive(Debug, Serialize)]
struct Page {
    page: u32,
    limit: u32,
}

fn ok_transport() -> Arc<MockTransport> {
    Arc::new(MockTransport::always(MockBehavior::status(200, "")))
}

#[tokio::test]
async fn test_path_joins_below_base_path() {
    let transport = ok_transport();
    let client = builder_with(&transport).build().unwrap();

    client
        .get::<()>("/breeds")
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap();
    client
        .get::<()>("facts/random")
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].url().as_str(), "https://api.example.com/v1/breeds");
    assert_eq!(
        requests[1].url().as_str(),
        "https://api.example.com/v1/facts/random"
    );
}

#[tokio::test]
async fn test_absolute_path_without_base() {
    let transport = ok_transport();
    let client = Client::builder()
        .transport(Arc::clone(&transport) as Arc<dyn courier_client::HttpTransport>)
        .build()
        .unwrap();

    client
        .get::<()>("https://catfact.ninja/fact")
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        transport.requests()[0].url().as_str(),
        "https://catfact.ninja/fact"
    );

    let err = client
        .get::<()>("/fact")
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap_err();
    match err.kind() {
        CourierErrorKind::RequestBuild(e) => {
            assert!(matches!(e.kind(), RequestBuildErrorKind::InvalidUrl(_)))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_payload_is_encoded_with_content_type() {
    let transport = ok_transport();
    let client = builder_with(&transport)
        .header("x-api-key", "secret")
        .build()
        .unwrap();

    client
        .put::<_, ()>(
            "/facts/1",
            NewFact {
                fact: "cats can jump".to_string(),
            },
        )
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.method(), &Method::PUT);
    assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(request.headers()["x-api-key"], "secret");
    assert_eq!(
        request.body().map(|b| b.as_ref()),
        Some(br#"{"fact":"cats can jump"}"#.as_slice())
    );
}

#[tokio::test]
async fn test_default_content_type_is_kept() {
    let transport = ok_transport();
    let client = builder_with(&transport)
        .header("content-type", "application/vnd.cats+json")
        .build()
        .unwrap();

    client
        .post::<_, ()>("/facts", NewFact { fact: "meow".to_string() })
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        transport.requests()[0].headers()[CONTENT_TYPE],
        "application/vnd.cats+json"
    );
}

#[tokio::test]
async fn test_get_never_sends_payload() {
    let transport = ok_transport();
    let client = builder_with(&transport).build().unwrap();

    client
        .request::<_, ()>(
            Method::GET,
            "/facts",
            Some(NewFact {
                fact: "ignored".to_string(),
            }),
        )
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert!(request.body().is_none());
    assert!(request.headers().get(CONTENT_TYPE).is_none());
}

#[tokio::test]
async fn test_options_apply_in_order() {
    let transport = ok_transport();
    let client = builder_with(&transport)
        .header("accept", "text/plain")
        .build()
        .unwrap();

    client
        .get::<()>("/facts?max_length=40")
        .option(with_query(&Page { page: 2, limit: 5 }))
        .option(with_header("accept", "application/json"))
        .option(with_headers([("x-trace", "abc"), ("x-user", "tom")]))
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.url().query(), Some("max_length=40&page=2&limit=5"));
    assert_eq!(request.headers()["accept"], "application/json");
    assert_eq!(request.headers()["x-trace"], "abc");
    assert_eq!(request.headers()["x-user"], "tom");
}

#[tokio::test]
async fn test_repeated_default_header_sends_every_value() {
    let transport = ok_transport();
    let client = builder_with(&transport)
        .header("accept", "application/json")
        .header("accept", "text/plain")
        .build()
        .unwrap();

    client
        .get::<()>("/facts")
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap();

    let request = &transport.requests()[0];
    let values: Vec<_> = request
        .headers()
        .get_all("accept")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(values, vec!["application/json", "text/plain"]);
}

#[tokio::test]
async fn test_form_option_replaces_body() {
    let transport = ok_transport();
    let client = builder_with(&transport).build().unwrap();

    client
        .post::<_, ()>("/login", NewFact { fact: "json".to_string() })
        .option(with_form(&[("user", "tom"), ("pass", "s3cr3t")]))
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(
        request.headers()[CONTENT_TYPE],
        "application/x-www-form-urlencoded"
    );
    assert_eq!(
        request.body().map(|b| b.as_ref()),
        Some(b"user=tom&pass=s3cr3t".as_slice())
    );
}

#[tokio::test]
async fn test_unencodable_query_fails_option() {
    let transport = ok_transport();
    let client = builder_with(&transport).build().unwrap();
    let nested = serde_json::json!({ "filter": { "breed": "siamese" } });

    let err = client
        .get::<()>("/facts")
        .option(with_query(&nested))
        .execute_discarding_body(&CancellationToken::new())
        .await
        .unwrap_err();

    match err.kind() {
        CourierErrorKind::OptionApply(e) => assert_eq!(e.option, "with_query"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let transport = ok_transport();

    let bad_url = Client::builder().base_url("not a url").build();
    assert!(matches!(
        bad_url.unwrap_err().kind(),
        CourierErrorKind::Config(_)
    ));

    let zero_rate = builder_with(&transport)
        .rate_limit(0, 1, Duration::from_secs(1))
        .build();
    assert!(zero_rate.is_err());

    let zero_window = builder_with(&transport)
        .rate_limit(1, 1, Duration::ZERO)
        .build();
    assert!(zero_window.is_err());

    let bad_header = builder_with(&transport).header("bad header", "x").build();
    assert!(bad_header.is_err());

    let no_attempts = builder_with(&transport)
        .retry(courier_resilience::RetryPolicy::new(
            0,
            Duration::from_millis(1),
            Duration::from_millis(1),
        ))
        .build();
    assert!(no_attempts.is_err());
}

#[test]
fn test_base_url_gets_trailing_slash() {
    let transport = ok_transport();
    let client = builder_with(&transport).build().unwrap();
    assert_eq!(
        client.config().base_url().as_ref().map(|u| u.as_str()),
        Some("https://api.example.com/v1/")
    );
}
