//! Test utilities for Courier client tests.
//!
//! This module provides a scripted transport and client helpers.

pub mod mock_transport;

#[allow(unused_imports)]
pub use mock_transport::{MockBehavior, MockTransport};

use courier_client::{Client, ClientBuilder};
use std::sync::Arc;

/// Builder pointed at a fake base address, sending through `transport`.
#[allow(dead_code)]
pub fn builder_with(transport: &Arc<MockTransport>) -> ClientBuilder {
    Client::builder()
        .base_url("https://api.example.com/v1")
        .transport(Arc::clone(transport) as Arc<dyn courier_client::HttpTransport>)
}
