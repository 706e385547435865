use std::path::{Path, PathBuf};
use tokio::fs;
use crate::utils::{CompressorError, CompressorResult};

/// Final path component as a display name, falling back to the whole path.
pub fn extract_filename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

/// Read a whole file, reporting failures as a read error for `name`
pub async fn read_bytes(path: impl AsRef<Path>, name: &str) -> CompressorResult<Vec<u8>> {
    fs::read(path.as_ref())
        .await
        .map_err(|e| CompressorError::read(name, e))
}

/// Write `bytes` to `dir/file_name`, creating `dir` when missing
pub async fn write_file(dir: impl AsRef<Path>, file_name: &str, bytes: &[u8]) -> CompressorResult<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .await
        .map_err(|e| CompressorError::io(dir, e))?;

    let path = dir.join(file_name);
    fs::write(&path, bytes)
        .await
        .map_err(|e| CompressorError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ErrorKind;

    #[test]
    fn filename_is_last_component() {
        assert_eq!(extract_filename("/tmp/pics/photo.png"), "photo.png");
        assert_eq!(extract_filename("photo.png"), "photo.png");
    }

    #[tokio::test]
    async fn missing_file_is_a_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_bytes(dir.path().join("gone.png"), "gone.png").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadFailure);
        assert!(err.to_string().contains("gone.png"));
    }

    #[tokio::test]
    async fn write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a/b");
        let path = write_file(&out, "x_compressed.jpg", b"data").await.unwrap();
        assert_eq!(path, out.join("x_compressed.jpg"));
        assert_eq!(read_bytes(&path, "x").await.unwrap(), b"data");
    }
}
