//! Integration tests for barrio-scout
//!
//! These tests stand up wiremock servers for the pending-work feed, the
//! worker trigger and the results feed, and drive full discovery sessions
//! against them.

mod common;
mod dispatch_tests;
mod feed_tests;
