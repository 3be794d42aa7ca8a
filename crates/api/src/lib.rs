//! HTTP API: module routing, response envelope, and process wiring.

pub mod app;
