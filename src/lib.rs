//! Library exports for giftsync, shared between the binary and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod router;
pub mod services;
pub mod startup;
pub mod state;
pub mod storage;
pub mod store;
pub mod utils;
