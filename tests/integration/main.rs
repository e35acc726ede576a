//! Integration test modules.

mod config_test;
mod content_mock;
mod content_store_test;
mod journey_flow_test;
