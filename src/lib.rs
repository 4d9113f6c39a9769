// src/lib.rs

//! Short-video share link resolver.
//!
//! Turns pasted share text from Douyin, Kuaishou, Xiaohongshu or TikTok
//! into a directly playable [`models::ContentItem`], and optionally serves
//! the resolver and a media proxy over HTTP.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
#[cfg(feature = "server")]
pub mod server;
pub mod services;
pub mod utils;
