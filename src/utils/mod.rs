pub mod error;
pub mod formats;
pub mod fs;

pub use error::{CompressorError, CompressorResult, ErrorKind, GENERIC_FAILURE_MESSAGE};
pub use formats::{
    ImageFormat,
    ACCEPTED_MEDIA_TYPES,
    JPEG_MEDIA_TYPE,
    compressed_file_name,
    is_image_media_type,
    media_type_from_path,
};
pub use fs::{extract_filename, read_bytes, write_file};
