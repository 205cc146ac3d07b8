//! Database entities

pub mod comment;
pub mod discussion;
pub mod user;
