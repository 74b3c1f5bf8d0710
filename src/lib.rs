//! Lead Quality & Recipe Engine
//!
//! Turns raw audience-provider contacts into scored, filtered, compliance-checked
//! leads plus counts-only diagnostics, and serves the pipeline over HTTP.
//!
//! # Modules
//!
//! - `api`: HTTP-facing namespace.
//! - `core`: Lead pipeline namespace.
//! - `integrations`: External provider namespace.
//! - `audience_cache`: Checksum-validated cache of provider pulls.
//! - `compliance`: Call suppression by state.
//! - `config`: Configuration management.
//! - `coverage`: Field coverage percentages.
//! - `errors`: Error handling types.
//! - `field_access`: Ordered lookup across provider field containers.
//! - `handlers`: HTTP request handlers.
//! - `identity`: Name, address and email resolution.
//! - `lead_mapper`: Canonical lead record construction.
//! - `match_accuracy`: Match tier classification.
//! - `models`: Core data models.
//! - `phones`: Phone normalization and categorization.
//! - `pipeline`: End-to-end orchestration.
//! - `provider_client`: Audience provider HTTP client.
//! - `quality`: Quality scoring and statistics.
//! - `quality_gate`: Tier thresholds and the quality report.
//! - `recipe`: Per-contact accept/reject rules.

pub mod api;
pub mod core;
pub mod integrations;

pub mod audience_cache;
pub mod compliance;
pub mod config;
pub mod coverage;
pub mod errors;
pub mod field_access;
pub mod handlers;
pub mod identity;
pub mod lead_mapper;
pub mod match_accuracy;
pub mod models;
pub mod phones;
pub mod pipeline;
pub mod provider_client;
pub mod quality;
pub mod quality_gate;
pub mod recipe;
