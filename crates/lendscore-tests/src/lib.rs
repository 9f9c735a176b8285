//! End-to-end test suite for lendscore.
//!
//! Tests write subgraph-style JSON chunks to temp directories, run the full
//! pipeline and check the written tables against hand-computed scores.

pub mod helpers;
