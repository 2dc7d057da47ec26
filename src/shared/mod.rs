pub mod config;
pub mod path;
pub mod storage_header;

#[cfg(test)]
pub mod storage_header_tests;
