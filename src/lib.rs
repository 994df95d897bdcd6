//! nutriboard: client for a nutrition-tracking backend.
//!
//! The library holds everything the `nutriboard` binary and the local web
//! dashboard share: configuration and environment resolution, the session
//! store, the HTTP client, the feature modules (auth, meals, food search,
//! goals, insights, dashboard) and HTML rendering.

pub mod activity;
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod food;
pub mod goals;
pub mod insights;
pub mod meals;
pub mod render;
pub mod session;
pub mod storage;
pub mod web;
