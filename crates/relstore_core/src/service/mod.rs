//! Use-case services layered over repositories.
//!
//! # Responsibility
//! - Translate repository results into consumer-level answers.
//! - Stay storage-agnostic; all SQL lives in `repo`.

pub mod cluster_service;
