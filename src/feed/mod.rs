//! Network access: JSON feeds and raw tile bytes over HTTP

pub mod client;

pub use client::{FeedClient, FeedEvent, FeedKind, FeedPayload, FeedTransport, HttpTransport};
