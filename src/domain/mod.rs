//! Domain layer containing the editing core's types and pure logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, session state, errors)
//! - `richtext` - Rich-text tree, canonical HTML form and the editable surface
//! - `document` - Drafts, templates, titles and template extraction

pub mod document;
pub mod foundation;
pub mod richtext;
