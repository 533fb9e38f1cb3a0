pub mod data_gen;
pub mod test_util;
