//! Relational store access over its REST surface.

mod client;
pub mod query;

pub use client::{QueryResult, RestClient, TableStore};
pub use query::{Order, Query};

#[cfg(any(test, feature = "test-utils"))]
pub use client::MockTableStore;
