//! Extraction and population engine.
//!
//! Extraction walks each source tree ([`walker`]), classifies every string
//! leaf ([`classify`]), moves the text into a [`dictionary::Dictionary`]
//! (deduplicated by [`interner`]) and leaves a placeholder behind.
//! Population renders those placeholders against one or more locale
//! dictionaries ([`render`], [`populate`]).

pub mod classify;
pub mod dictionary;
pub mod emit;
pub mod extract;
pub mod interner;
pub mod placeholder;
pub mod populate;
pub mod reference;
pub mod render;
pub mod sources;
pub mod walker;

pub use dictionary::Dictionary;
pub use extract::{ExtractReport, ExtractionSession, extract_dir};
pub use populate::{LocaleSet, PopulateReport, load_locales, populate_dir};
