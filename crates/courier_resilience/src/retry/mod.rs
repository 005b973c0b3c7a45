//! Backoff retry.
//!
//! A [`RetryPolicy`] is the client-level template: attempt bounds, the delay
//! function and the conditions that make a result worth retrying. Each
//! retry sequence draws delays from a [`BackoffRetryController`], either its
//! own or one shared by the whole client depending on [`RetryScope`].

pub mod conditions;
mod controller;
mod policy;

pub use controller::{Backoff, BackoffRetryController, DelayFn, exponential_backoff};
pub use policy::{RetryCondition, RetryPolicy, RetryScope};
