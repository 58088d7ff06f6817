//! Unit and service tests for template management.

mod domain_tests;
mod service_tests;
