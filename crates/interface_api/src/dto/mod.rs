//! Request and response bodies

pub mod ratings;
pub mod tables;
