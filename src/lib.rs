//! Lingua - translation capture and reconciliation for templated sites
//!
//! Lingua is a CLI tool and library that extracts translatable strings from
//! Twig templates and form definitions, deduplicates them by content hash,
//! and reconciles them into a per-locale record store with a small status
//! lifecycle (pending, translated, approved, unused).
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (user-facing commands)
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction, reconciliation, usage checking, scan orchestration
//! - `parsers`: Twig template lexer/parser and form-definition loader
//! - `report`: Human-readable output formatting
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod parsers;
pub mod report;
pub mod utils;
