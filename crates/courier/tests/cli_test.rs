//! Tests for command-line parsing and settings wiring.

use clap::Parser;
use courier::cli::{Cli, Commands, build_client, request_args};
use std::io::Write;

#[test]
fn test_get_with_headers_and_query() {
    let cli = Cli::try_parse_from([
        "courier",
        "get",
        "/breeds",
        "-H",
        "accept: application/json",
        "--query",
        "limit=5",
        "-q",
        "page=2",
        "-v",
    ])
    .unwrap();

    assert!(cli.verbose);
    let Commands::Get { request } = &cli.command else {
        panic!("expected get, got {:?}", cli.command);
    };
    assert_eq!(request.path, "/breeds");
    assert_eq!(request.headers, vec!["accept: application/json"]);
    assert_eq!(request.query, vec!["limit=5", "page=2"]);
    assert!(!request.include_headers);
}

#[test]
fn test_post_requires_json() {
    assert!(Cli::try_parse_from(["courier", "post", "/facts"]).is_err());

    let cli = Cli::try_parse_from([
        "courier",
        "--base-url",
        "https://catfact.ninja",
        "post",
        "/facts",
        "--json",
        r#"{"fact":"meow"}"#,
        "-i",
    ])
    .unwrap();

    assert_eq!(cli.base_url.as_deref(), Some("https://catfact.ninja"));
    match &cli.command {
        Commands::Post { request, json } => {
            assert_eq!(request.path, "/facts");
            assert_eq!(json, r#"{"fact":"meow"}"#);
        }
        other => panic!("expected post, got {other:?}"),
    }
    assert!(request_args(&cli.command).include_headers);
}

#[test]
fn test_missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["courier"]).is_err());
}

#[test]
fn test_build_client_from_config_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(
        br#"
base_url = "https://example.invalid"

[retry]
max_attempts = 2
min_wait_ms = 10
max_wait_ms = 20
retry_on_status = [503]
"#,
    )
    .unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let cli = Cli::try_parse_from([
        "courier",
        "--config",
        path.as_str(),
        "--base-url",
        "https://catfact.ninja/api",
        "delete",
        "/facts/1",
    ])
    .unwrap();
    let client = build_client(&cli).unwrap();

    assert_eq!(
        client.config().base_url().as_ref().map(|u| u.as_str()),
        Some("https://catfact.ninja/api/")
    );
    assert_eq!(client.config().retry().as_ref().map(|r| r.max_attempts()), Some(2));
}
