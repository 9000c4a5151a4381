pub mod digest;
pub mod file;

pub use file::FileService;
