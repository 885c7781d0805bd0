pub mod image_directory;

pub use image_directory::ImageDirectoryFrameSource;
