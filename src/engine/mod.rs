pub mod cache;
pub mod errors;
pub mod extract;
pub mod fragment;
pub mod index;
pub mod resolve;
pub mod service;
pub mod types;

pub use errors::*;
pub use service::RetraceService;

#[cfg(test)]
mod service_test;
