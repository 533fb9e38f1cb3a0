//! Index integration tests.
//!
//! Bulk loading, level order and the on-disk page format, checked through
//! the public API only.

mod persistence_test;
mod str_build_test;
