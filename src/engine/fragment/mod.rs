pub mod fragment;
pub mod fragment_store;

pub use fragment::Fragment;
pub use fragment_store::{DEFAULT_MAX_FRAGMENTS, FragmentStore};
