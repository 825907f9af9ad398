// src/web/mod.rs
pub mod auth_handlers;
pub mod context;
pub mod flash;
pub mod mw_auth;
pub mod page_handlers;
pub mod routes;
pub mod teacher_handlers;
