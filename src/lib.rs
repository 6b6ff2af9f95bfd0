//! comply-gateway - Edge reverse proxy for the compliance backend.
//!
//! The gateway sits between the browser client and the backend origin so
//! that the service credential never reaches the browser. It exposes a
//! single wildcard surface (`/api/proxy/{*path}`) and relays traffic in
//! three transfer modes without corrupting any of them:
//!
//! - **JSON**: parsed and re-serialized with the backend's status code.
//! - **Binary**: file downloads streamed through unbuffered, with
//!   `Content-Disposition` relayed when the backend set one.
//! - **Event stream**: live SSE passthrough, first byte before stream
//!   completion, with proxy-buffering disabled.
//!
//! The gateway is stateless: every request is an independent exchange with
//! no retries, no caching, and no shared mutable state beyond the pooled
//! upstream client.

pub mod config;
pub mod error;
pub mod logging_layer;
pub mod proxy;
pub mod relay;
pub mod server;
pub mod upstream;
