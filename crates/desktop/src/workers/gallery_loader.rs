use std::path::PathBuf;
use std::thread;

use crossbeam_channel::Receiver;

use facecheck_core::capture::domain::capture_error::PickError;
use facecheck_core::capture::domain::gallery_picker::{GalleryPicker, PickedImage};
use facecheck_core::capture::infrastructure::path_gallery_picker::PathGalleryPicker;

pub type LoadedItems = Vec<Result<PickedImage, PickError>>;

/// Decodes the picked files on a worker thread.
///
/// The receiver yields exactly one batch, in the order the paths were given.
pub fn spawn(paths: Vec<PathBuf>) -> Receiver<LoadedItems> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let count = paths.len();
        let items = PathGalleryPicker::new(paths).pick_many();
        log::debug!("Decoded {count} picked file(s)");
        let _ = tx.send(items);
    });
    rx
}

/// A batch that is already decoded, handed to the session as a picker.
pub struct LoadedSelection(LoadedItems);

impl LoadedSelection {
    pub fn new(items: LoadedItems) -> Self {
        Self(items)
    }
}

impl GalleryPicker for LoadedSelection {
    fn pick_many(&mut self) -> LoadedItems {
        std::mem::take(&mut self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::new(8, 8).save(&path).unwrap();
        path
    }

    #[test]
    fn test_loads_in_background_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png");
        let broken = dir.path().join("b.png");
        std::fs::write(&broken, b"garbage").unwrap();
        let c = write_png(dir.path(), "c.png");

        let rx = spawn(vec![a.clone(), broken, c.clone()]);
        let items = rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().path, a);
        assert!(items[1].is_err());
        assert_eq!(items[2].as_ref().unwrap().path, c);
    }

    #[test]
    fn test_loaded_selection_is_consumed_once() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png");
        let items = spawn(vec![a]).recv_timeout(Duration::from_secs(5)).unwrap();

        let mut selection = LoadedSelection::new(items);
        assert_eq!(selection.pick_many().len(), 1);
        assert!(selection.pick_many().is_empty());
    }
}
