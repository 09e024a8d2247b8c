//! Tests for the HTTP transport

pub mod server_tests;
