//! Integration tests for hn-harvest
//!
//! These tests use wiremock to stand in for the news site and the item API,
//! and a recording renderer in place of the external PDF tool.

mod listing_tests;
mod support;
