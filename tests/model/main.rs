//! Integration tests for Layer 1: Model
//!
//! Tests for the project document, component property schemas, scene element
//! order, and the navigation tree.

mod document;
mod schema;
