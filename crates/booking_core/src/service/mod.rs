//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and notifications into use-case APIs.
//! - Keep CLI and other callers decoupled from storage details.

pub mod booking_service;
pub mod cleanup;
