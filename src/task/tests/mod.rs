//! Unit and service tests for the task lifecycle engine.

mod domain_tests;
mod service_tests;
