//! Courier CLI.

use clap::Parser;
use courier::cli::{Cli, build_client, request_args, run_request};
use courier::{CourierResult, deadline, init_console_telemetry};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> CourierResult<()> {
    let cli = Cli::parse();
    init_console_telemetry(cli.verbose, cli.json_logs);

    let client = build_client(&cli)?;

    let cancel = match cli.timeout {
        Some(secs) => deadline(Duration::from_secs(secs)),
        None => CancellationToken::new(),
    };
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling request");
            on_interrupt.cancel();
        }
    });

    let response = run_request(&client, &cli.command, &cancel).await?;

    println!("{}", response.status());
    if request_args(&cli.command).include_headers {
        for (name, value) in response.headers() {
            println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
        println!();
    }
    println!("{}", response.text());
    Ok(())
}
