//! Kiach: a video streaming server that proxies HTTP byte ranges.
//!
//! Clients request `/stream/{id}` with an optional `Range` header; the
//! server opens the stored media (remote URL or local file), validates the
//! range against its length and copies exactly the requested bytes through
//! a fixed-size buffer.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod storage;
pub mod streamer;
