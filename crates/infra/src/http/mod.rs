//! Shared HTTP plumbing for the integrations

mod client;

pub use client::{HttpClient, HttpClientBuilder};
