//! HTTP handlers

pub mod health;
pub mod photos;
pub mod upload;
