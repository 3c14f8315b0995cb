// Portal backend REST client.

pub mod alerts;
pub mod auth;
pub mod client;
pub mod contacts;
pub mod models;
pub mod system;

pub use client::BackendClient;
