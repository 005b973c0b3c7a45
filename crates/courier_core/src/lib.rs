//! Core data types for Courier.
//!
//! - [`ApiResponse`] - a fully buffered HTTP response, the raw half of every
//!   successful outcome
//! - [`Codec`] - symmetric payload encoding for request and response bodies
//! - [`JsonCodec`] - the default codec

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod response;

pub use codec::{Codec, JsonCodec};
pub use response::ApiResponse;
