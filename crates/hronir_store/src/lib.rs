//! hronir_store — the ACID-compliant embedded relational store. Owns schema management and row-level CRUD; knows nothing about
//! Elo, qualification thresholds, or the canonical cascade — that belongs to
//! `hronir_rating` and `hronir_engine`.

#![forbid(unsafe_code)]

pub mod dao;
mod schema;
mod store;

pub use store::{Store, StoreError, StoreResult};
