//! # filetree-entity
//!
//! Domain entity models for Filetree. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.

pub mod edit;
pub mod entity;
