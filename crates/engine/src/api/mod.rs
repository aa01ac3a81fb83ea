//! HTTP and WebSocket entry points.

pub mod error;
pub mod http;
pub mod websocket;

pub use error::ApiError;
