pub mod index_builder;
pub mod index_entry;
pub mod mapping_index;

pub use index_builder::IndexBuilder;
pub use index_entry::IndexEntry;
pub use mapping_index::Index;
