//! Tree join integration tests.

mod tree_join_test;
