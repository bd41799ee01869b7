//! Event thumbnail tooling for the SIMG research-group website.
//!
//! The crate reads event frontmatter (or CLI flags), picks a visual theme,
//! wraps the title, and writes a 1280x720 event card. A remote image
//! generation backend is tried first when credentials are configured; every
//! failure there falls back to a deterministic SVG rendered locally.

pub mod batch;
pub mod config;
pub mod error_codes;
pub mod event;
pub mod frontmatter;
pub mod image_backend;
pub mod markup;
pub mod panel;
pub mod sink;
pub mod slug;
pub mod text_layout;
pub mod theme;
pub mod thumbnail;
