//! GroupDesk - Project workspace backend for supervised student groups
//!
//! This crate implements the membership directory, the authorization gate,
//! complaint routing with per-viewer read status, and the daily chat
//! activity aggregator behind a bearer-authenticated HTTP API.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
