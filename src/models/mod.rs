// src/models/mod.rs

pub mod comment;
pub mod id;
pub mod post;
pub mod profile;
pub mod response;
