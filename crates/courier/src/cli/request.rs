//! Request command handlers.

use super::{Cli, Commands, RequestArgs};
use courier_client::options::{with_header, with_query};
use courier_client::{Client, ClientSettings, RequestBuilder};
use courier_core::ApiResponse;
use courier_error::{ConfigError, CourierResult};
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Build a client from the settings named on the command line.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded or describe an invalid
/// client.
#[instrument(skip(cli), fields(config = ?cli.config))]
pub fn build_client(cli: &Cli) -> CourierResult<Client> {
    let mut settings = match &cli.config {
        Some(path) => ClientSettings::from_file(path)?,
        None => ClientSettings::load()?,
    };
    if let Some(base_url) = &cli.base_url {
        settings.base_url = Some(base_url.clone());
    }
    debug!(base_url = ?settings.base_url, "Settings loaded");
    settings.into_builder()?.build()
}

/// Run the request command and return the response.
///
/// # Errors
///
/// Returns an error for malformed arguments or a failed call.
#[instrument(skip_all)]
pub async fn run_request(
    client: &Client,
    command: &Commands,
    cancel: &CancellationToken,
) -> CourierResult<ApiResponse> {
    let (method, args, body) = match command {
        Commands::Get { request } => (Method::GET, request, None),
        Commands::Post { request, json } => {
            let body: serde_json::Value = serde_json::from_str(json)
                .map_err(|e| ConfigError::new(format!("--json is not valid JSON: {}", e)))?;
            (Method::POST, request, Some(body))
        }
        Commands::Delete { request } => (Method::DELETE, request, None),
    };

    let mut builder: RequestBuilder<'_, serde_json::Value, ()> = RequestBuilder::method(
        client,
        method.clone(),
        args.path.clone(),
        body,
    );
    for header in &args.headers {
        let (name, value) = split_pair(header, ':', "--header")?;
        builder = builder.option(with_header(name.trim(), value.trim()));
    }
    let query = args
        .query
        .iter()
        .map(|pair| split_pair(pair, '=', "--query"))
        .collect::<CourierResult<Vec<_>>>()?;
    if !query.is_empty() {
        builder = builder.option(with_query(&query));
    }

    info!(%method, path = %args.path, "Sending request");
    builder.execute_discarding_body(cancel).await
}

fn split_pair<'a>(raw: &'a str, separator: char, flag: &str) -> CourierResult<(&'a str, &'a str)> {
    raw.split_once(separator).ok_or_else(|| {
        ConfigError::new(format!(
            "{} expects `a{}b`, got '{}'",
            flag, separator, raw
        ))
        .into()
    })
}

/// The request arguments of a command.
pub fn request_args(command: &Commands) -> &RequestArgs {
    match command {
        Commands::Get { request }
        | Commands::Post { request, .. }
        | Commands::Delete { request } => request,
    }
}
