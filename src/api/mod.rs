// src/api/mod.rs
//! HTTP surface of the recognition service.
pub mod recognize_handlers;
pub mod routes;
