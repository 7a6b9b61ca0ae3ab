use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::domain::capture_error::PickError;
use crate::capture::domain::gallery_picker::{GalleryPicker, PickedImage};
use crate::capture::infrastructure::image_file_loader::{is_image, load_image};

/// Picker over a list of file paths chosen elsewhere (argv, a file dialog).
///
/// The selection is handed out once; later calls return nothing, the same
/// as a user dismissing the picker.
pub struct PathGalleryPicker {
    paths: Vec<PathBuf>,
}

impl PathGalleryPicker {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// All image files directly inside `dir`, in file-name order.
    ///
    /// Only the listing is read here; files are decoded by `pick_many`.
    pub fn from_directory(dir: &Path) -> std::io::Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image(p))
            .collect();
        paths.sort();
        Ok(Self::new(paths))
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }

    /// The selection as paths, without loading any file.
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

impl GalleryPicker for PathGalleryPicker {
    fn pick_many(&mut self) -> Vec<Result<PickedImage, PickError>> {
        std::mem::take(&mut self.paths)
            .into_iter()
            .enumerate()
            .map(|(index, path)| {
                load_image(&path, index).map(|image| PickedImage { path, image })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::new(8, 8).save(&path).unwrap();
        path
    }

    #[test]
    fn test_bad_item_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        let good_a = write_png(dir.path(), "a.png");
        let bad = dir.path().join("b.png");
        std::fs::write(&bad, b"garbage").unwrap();
        let good_c = write_png(dir.path(), "c.png");

        let mut picker = PathGalleryPicker::new(vec![good_a.clone(), bad, good_c.clone()]);
        let results = picker.pick_many();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().path, good_a);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().path, good_c);
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut picker = PathGalleryPicker::new(vec![]);
        assert!(picker.pick_many().is_empty());
    }

    #[test]
    fn test_selection_is_consumed_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png");
        let mut picker = PathGalleryPicker::new(vec![path]);

        assert_eq!(picker.pick_many().len(), 1);
        assert_eq!(picker.remaining(), 0);
        assert!(picker.pick_many().is_empty());
    }

    #[test]
    fn test_from_directory_lists_sorted_images_only() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png");
        write_png(dir.path(), "a.png");
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();

        let picker = PathGalleryPicker::from_directory(dir.path()).unwrap();

        let names: Vec<_> = picker
            .into_paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_directory_listing_does_not_decode_files() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png");
        std::fs::write(dir.path().join("b.jpg"), b"not really a jpeg").unwrap();

        let paths = PathGalleryPicker::from_directory(dir.path())
            .unwrap()
            .into_paths();
        assert_eq!(paths.len(), 2);

        // The broken file only fails once it is actually picked.
        let results = PathGalleryPicker::new(paths).pick_many();
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
