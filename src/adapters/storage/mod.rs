//! Storage Adapters
//!
//! Local persistence for the template cache.
//!
//! ## Usage
//!
//! ```ignore
//! use draft_desk::adapters::storage::FileTemplateCache;
//! use draft_desk::adapters::memory::InMemoryTemplateCache;
//!
//! // Survives restarts
//! let cache = FileTemplateCache::new("./data/cache.json");
//!
//! // Testing: in-memory cache
//! let cache = InMemoryTemplateCache::new();
//! ```

mod file_template_cache;

pub use file_template_cache::FileTemplateCache;
