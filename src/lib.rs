//! Storefront backend: catalog browsing, normalized search, order submission
//! with email/spreadsheet notification, and token authentication.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod repositories;
pub mod services;
pub mod state;
pub mod util;
pub mod web;
