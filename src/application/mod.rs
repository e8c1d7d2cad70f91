//! Application services: sessions, accounts and posts over repository traits.

pub mod accounts;
pub mod context;
pub mod error;
pub mod posts;
pub mod repos;
pub mod sessions;
