//! Lexis - localization extraction for JSON datasets
//!
//! Lexis pulls the human-readable text out of a directory of JSON data files,
//! leaving templates with `{{ path }}` placeholders behind and collecting the
//! text into a source-locale dictionary. Translated dictionaries can then be
//! rendered back into the templates, one locale or several merged side by side.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (extract, populate, init)
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction and population engine
//! - `issues`: Issue type definitions and reporting
//! - `utils`: Shared text helpers (key sanitizing, variable names, list joining)

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
