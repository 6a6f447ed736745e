// src/handlers/mod.rs
pub mod csrf;
pub mod me;
pub mod pools;
