//! Lookup helpers over the in-memory booking list.
//!
//! # Responsibility
//! - Normalize free-form lookup input before matching records.
//! - Keep matching rules in core so every caller agrees on them.

pub mod phone;
