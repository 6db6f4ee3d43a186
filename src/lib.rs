//! Draft Desk - editing core for AI-generated administrative documents
//!
//! This crate implements the draft/template editing workflow: a rich-text
//! editing surface, the session lifecycle around it, template recovery from a
//! local cache, persistence against a REST document store, clipboard export
//! and template extraction by redaction.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod i18n;
pub mod ports;
