//! Fetch cat facts concurrently through a rate-limited, retrying,
//! breaker-protected client.
//!
//! ```sh
//! cargo run -p courier --example cat_facts
//! ```

use courier::prelude::*;
use courier::init_console_telemetry;
use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Debug, Deserialize)]
struct Fact {
    fact: String,
    length: usize,
}

#[tokio::main]
async fn main() -> CourierResult<()> {
    init_console_telemetry(false, false);

    let client = Client::builder()
        .base_url("https://catfact.ninja")
        .header("accept", "application/json")
        .rate_limit(5, 1, Duration::from_secs(1))
        .retry(
            RetryPolicy::new(3, Duration::from_millis(250), Duration::from_secs(2))
                .condition(on_status(StatusCode::TOO_MANY_REQUESTS))
                .condition(on_server_error())
                .condition(on_transport_error()),
        )
        .circuit_breaker(
            courier::BreakerSettingsBuilder::default()
                .name("cat-facts")
                .consecutive_failures(5u32)
                .open_timeout(Duration::from_secs(10))
                .build()?,
        )
        .build()?;

    let cancel = deadline(Duration::from_secs(30));
    let started = Instant::now();

    let calls = (0..20).map(|i| {
        let client = client.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let result = client
                .get::<Fact>("/fact")
                .option(with_query(&[("max_length", "140")]))
                .execute_decoding(&cancel)
                .await;
            (i, result)
        })
    });

    for call in calls.collect::<Vec<_>>() {
        let Ok((i, result)) = call.await else {
            continue;
        };
        match result {
            Ok((_, fact)) => println!(
                "[{:>5.2}s] #{:02} ({} chars) {}",
                started.elapsed().as_secs_f64(),
                i,
                fact.length,
                fact.fact
            ),
            Err(e) => eprintln!("#{:02} failed: {}", i, e),
        }
    }
    Ok(())
}
