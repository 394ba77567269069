//! Purpose: Shared library crate used by the Socium platform microservices.
//! Exports: `models` (the JSON data model), `core` (validation, merge, errors),
//! `api` (typed sibling-service clients).
//! Role: Common contract layer; owns no persistence and ships no server.
//! Invariants: Models serialize to the platform's JSON wire contract.
//! Invariants: Referential checks reach sibling services only through `api`.
pub mod api;
pub mod core;
pub mod models;
