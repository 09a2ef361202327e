//! Property-based tests for the status policy.
