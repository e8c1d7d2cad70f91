//! Vellum: the security and freshness core of a small blog.
//!
//! Signed session cookies, salted password records and a cache-aside layer
//! that reports how stale every read is. HTTP, templates and persistence stay
//! outside; they plug in through the repository and store traits.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod security;
