//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Error, Identifier, EntityKind, and Timestamp.
