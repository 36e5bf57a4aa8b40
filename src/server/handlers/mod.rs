//! HTTP handlers

pub mod domain;
pub mod system;
