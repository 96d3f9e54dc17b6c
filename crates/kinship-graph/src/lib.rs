//! Kinship Graph: idempotent mutation of the people graph.
//!
//! This crate is the single mutation point for the graph store. Every write
//! goes through [`GraphMutator::commit_batch`], which applies a batch of
//! entity and relation upserts atomically against any [`GraphStore`]: the
//! Neo4j-backed [`GraphClient`] or the in-process [`MemoryStore`].

pub mod client;
pub mod memory;
pub mod mutations;
pub mod mutator;
pub mod queries;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use memory::MemoryStore;
pub use mutator::{BatchReport, GraphMutator};
pub use store::{GraphStore, WriteTxn};
