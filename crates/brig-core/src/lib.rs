//! # brig-core
//!
//! Core types, domain events, and error types for Brig.
//!
//! This crate provides the foundational types shared across all Brig crates:
//! - Entity structs for all domain records (users, projects, materials, etc.)
//! - Enums for audit actions, notification levels, and entity kinds
//! - The `Tracked` trait and `DomainEvent` emitted by every entity mutation
//! - Explicit on-delete reference policies between entity kinds
//! - Cross-cutting error types
//! - API response envelopes

pub mod actor;
pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod events;
pub mod references;
pub mod responses;
