//! Request handlers

pub mod health;
pub mod ratings;
pub mod tables;
