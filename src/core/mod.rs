//! Capture and reconciliation engine.
//!
//! `extract` turns parsed sources into captured strings, `reconcile` aligns
//! them with stored per-locale records, `usage` runs the liveness pass, and
//! `scan` orchestrates a full repository sweep over both.

pub mod extract;
pub mod hash;
pub mod locale;
pub mod reconcile;
pub mod record;
pub mod scan;
pub mod store;
pub mod usage;
