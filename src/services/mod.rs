// src/services/mod.rs
pub mod attendance_log;
pub mod auth_service;
pub mod identity;
pub mod uploads;
pub mod user_service;
