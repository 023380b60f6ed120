//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod aip_server;
pub mod pdf_fixtures;
pub mod socket_guard;
