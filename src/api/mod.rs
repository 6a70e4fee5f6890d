//! The HTTP boundary to the personal finance REST API.
//!
//! This module contains:
//! - The [ApiClient] used to fetch a user's transactions
//! - The wire types for the list endpoints and label lookups

mod client;
mod models;

pub use client::ApiClient;
