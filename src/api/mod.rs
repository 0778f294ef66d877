pub mod auth;
pub mod categories;
pub mod client;
pub mod products;

pub use client::ApiClient;
