//! Credit Score API Library
//!
//! Aggregates the KATM credit-history report and the E-GOV civil-registry
//! report for a verified subject into one credit score, rating tier and set
//! of recommendations, and keeps the latest result per subject.
//!
//! # Modules
//!
//! - `cache_validator`: Checksummed entries for the in-process report store.
//! - `config`: Configuration management.
//! - `db`: Database connection and schema setup.
//! - `errors`: Error handling types.
//! - `export`: Downloadable JSON rendering of a report.
//! - `handlers`: HTTP request handlers.
//! - `identity`: PINFL and access-token validation.
//! - `models`: Source and aggregated report models.
//! - `openapi`: OpenAPI document.
//! - `report_store`: Latest report per subject (memory or PostgreSQL).
//! - `scoring`: Score, rating and recommendation rules.
//! - `services`: Report source clients and the concurrent fetch.

pub mod cache_validator;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod openapi;
pub mod report_store;
pub mod scoring;
pub mod services;
