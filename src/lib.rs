//! Attendance ledger and wage balance engine for small-business staff.
//!
//! Staff append Start/End events; wages earned, payments and the amount due
//! are always recomputed from that history.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod ledger;
pub mod model;
pub mod models;
pub mod money;
pub mod routes;
pub mod utils;
