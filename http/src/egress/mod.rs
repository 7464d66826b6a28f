pub mod file_sd;

pub use file_sd::FileSdWriter;
