pub use super::factories::MappingFileFactory;

pub struct Factory;

impl Factory {
    pub fn mapping_file() -> MappingFileFactory {
        MappingFileFactory::new()
    }

    pub fn sample_mapping() -> MappingFileFactory {
        MappingFileFactory::sample()
    }
}
