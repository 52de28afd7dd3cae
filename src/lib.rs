//! Storefront navigation menu service.
//!
//! Serves the catalog menu tree (groups → sections → categories) from an
//! in-process TTL cache in front of a Postgres record source.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
