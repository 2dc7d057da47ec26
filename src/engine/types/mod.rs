pub mod version_key;

pub use version_key::VersionKey;
