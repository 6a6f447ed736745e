// src/lib.rs
//! Question pool API with stateless, identity-bound CSRF tokens.

pub mod app;
pub mod config;
pub mod csrf;
pub mod handlers;
pub mod identity;
pub mod logging;
pub mod middleware;
pub mod poolparse;
pub mod pools;
