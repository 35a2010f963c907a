//! Webby server integration
//!
//! The server supplies chapter lists and chapter text and stores one reading
//! position per book.

pub mod client;
pub mod error;
pub mod models;

pub use client::ApiClient;
pub use error::ApiError;
pub use models::Book;
