pub mod reference_extractor;

pub use reference_extractor::ReferenceExtractor;

#[cfg(test)]
mod reference_extractor_test;
