// src/models/mod.rs

//! Domain models for the resolver.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod content;
mod platform;

// Re-export all public types
pub use config::{Config, HttpConfig, ProviderConfig, ProviderKind, ResolverConfig, ServerConfig};
pub use content::{
    ApiResponse, ContentItem, ContentReference, DEFAULT_TITLE, MediaFields, MediaKind,
    ReferenceKind,
};
pub use platform::Platform;
