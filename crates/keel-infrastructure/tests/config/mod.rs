//! Configuration loading tests

mod loader_test;
