//! Tests for configuration loading
