//! Image folder enumeration.
//!
//! Batch jobs take a folder of stills (stitched panoramas or frames
//! extracted from a video) and process them in file-name order.
//!
//! ```rust,ignore
//! use pano_io::folder::list_images;
//!
//! // frame_00000.jpg, frame_00001.jpg, ...
//! let frames = list_images("shots/3900001419".as_ref(), None)?;
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::IoResult;

/// Extensions picked up by [`list_images`] (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Returns true if the path has one of the [`IMAGE_EXTENSIONS`].
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Lists image files in `dir`, sorted by file name.
///
/// Subdirectories and files with other extensions are skipped. When
/// `max_images` is set, only the first `max_images` entries (after sorting)
/// are returned.
///
/// # Errors
///
/// Returns [`IoError::Io`](crate::IoError::Io) if `dir` cannot be read.
pub fn list_images(dir: &Path, max_images: Option<usize>) -> IoResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_path(path))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if let Some(max) = max_images {
        files.truncate(max);
    }

    debug!(dir = %dir.display(), count = files.len(), "list_images");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IoError;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "frame_00002.jpg");
        touch(dir.path(), "frame_00000.JPG");
        touch(dir.path(), "frame_00001.png");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "scan.bmp");
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let names: Vec<String> = list_images(dir.path(), None)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec!["frame_00000.JPG", "frame_00001.png", "frame_00002.jpg", "scan.bmp"]
        );
    }

    #[test]
    fn test_max_images() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..6 {
            touch(dir.path(), &format!("img_{i}.jpeg"));
        }

        let files = list_images(dir.path(), Some(4)).unwrap();
        assert_eq!(files.len(), 4);
        assert!(files[3].ends_with("img_3.jpeg"));
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_images(&dir.path().join("missing"), None).unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("a/b.Jpeg")));
        assert!(!is_image_path(Path::new("a/b.mp4")));
        assert!(!is_image_path(Path::new("a/b")));
    }
}
