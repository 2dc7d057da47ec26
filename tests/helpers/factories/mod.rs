pub mod mapping_file_factory;

pub use mapping_file_factory::MappingFileFactory;

#[cfg(test)]
mod mapping_file_factory_test;
