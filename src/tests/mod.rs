//! Engine test suite.

mod support;

mod engine_test;
