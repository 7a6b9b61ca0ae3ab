use std::sync::Arc;

use crate::gallery::domain::image_record::{ImageId, ImageRecord, ImageSource, ImageStatus};
use crate::shared::frame::Frame;

/// What face screening concluded for one accepted image.
#[derive(Clone, Debug, PartialEq)]
pub enum ScreeningVerdict {
    FaceFound { abnormalities: Vec<String> },
    Rejected { reason: String },
}

/// The only ways the gallery can change.
#[derive(Clone, Debug)]
pub enum GalleryCommand {
    Append {
        image: Arc<Frame>,
        source: ImageSource,
    },
    Resolve {
        id: ImageId,
        verdict: ScreeningVerdict,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandEffect {
    Appended(ImageId),
    Resolved(ImageId),
    /// The target was unknown or already resolved; nothing changed.
    Ignored(ImageId),
}

impl CommandEffect {
    pub fn id(&self) -> ImageId {
        match *self {
            CommandEffect::Appended(id)
            | CommandEffect::Resolved(id)
            | CommandEffect::Ignored(id) => id,
        }
    }
}

/// Single-owner, append-only list of accepted images in display order.
///
/// Mutated only through [`GalleryStore::apply`]; everything else reads a
/// [`GallerySnapshot`].
#[derive(Debug, Default)]
pub struct GalleryStore {
    records: Vec<ImageRecord>,
    next_id: u64,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, command: GalleryCommand) -> CommandEffect {
        match command {
            GalleryCommand::Append { image, source } => {
                let id = ImageId(self.next_id);
                self.next_id += 1;
                self.records.push(ImageRecord::new(id, image, source));
                CommandEffect::Appended(id)
            }
            GalleryCommand::Resolve { id, verdict } => {
                let Some(record) = self
                    .records
                    .iter_mut()
                    .find(|r| r.id == id && r.is_processing())
                else {
                    return CommandEffect::Ignored(id);
                };
                match verdict {
                    ScreeningVerdict::FaceFound { abnormalities } => {
                        record.status = ImageStatus::Processed;
                        record.abnormalities = Some(abnormalities);
                    }
                    ScreeningVerdict::Rejected { reason } => {
                        record.status = ImageStatus::Invalid(reason);
                        record.abnormalities = None;
                    }
                }
                CommandEffect::Resolved(id)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn pending(&self) -> usize {
        self.records.iter().filter(|r| r.is_processing()).count()
    }

    pub fn snapshot(&self) -> GallerySnapshot {
        GallerySnapshot {
            records: self.records.clone(),
        }
    }
}

/// Read-only copy of the gallery handed to presentation code.
///
/// Pixel data is shared with the store, so snapshots are cheap.
#[derive(Clone, Debug, Default)]
pub struct GallerySnapshot {
    records: Vec<ImageRecord>,
}

impl GallerySnapshot {
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn processed(&self) -> usize {
        self.count(|s| *s == ImageStatus::Processed)
    }

    pub fn invalid(&self) -> usize {
        self.count(|s| matches!(s, ImageStatus::Invalid(_)))
    }

    pub fn processing(&self) -> usize {
        self.count(|s| *s == ImageStatus::Processing)
    }

    fn count(&self, pred: impl Fn(&ImageStatus) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn append(store: &mut GalleryStore) -> ImageId {
        let image = Arc::new(Frame::new(vec![0; 3], 1, 1, 3, 0));
        match store.apply(GalleryCommand::Append {
            image,
            source: ImageSource::Gallery(PathBuf::from("a.png")),
        }) {
            CommandEffect::Appended(id) => id,
            other => panic!("unexpected effect {other:?}"),
        }
    }

    fn face() -> ScreeningVerdict {
        ScreeningVerdict::FaceFound {
            abnormalities: vec!["x".into()],
        }
    }

    #[test]
    fn test_append_assigns_unique_ids_in_order() {
        let mut store = GalleryStore::new();
        let ids: Vec<ImageId> = (0..5).map(|_| append(&mut store)).collect();

        assert_eq!(store.len(), 5);
        let snapshot_ids: Vec<ImageId> = store.snapshot().records().iter().map(|r| r.id).collect();
        assert_eq!(snapshot_ids, ids);
        let mut dedup = ids.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), ids.len());
    }

    #[test]
    fn test_resolve_with_face_attaches_labels() {
        let mut store = GalleryStore::new();
        let id = append(&mut store);

        assert_eq!(
            store.apply(GalleryCommand::Resolve { id, verdict: face() }),
            CommandEffect::Resolved(id)
        );
        let record = store.get(id).unwrap();
        assert_eq!(record.status, ImageStatus::Processed);
        assert_eq!(record.abnormalities, Some(vec!["x".to_string()]));
    }

    #[test]
    fn test_resolve_rejected_has_no_labels() {
        let mut store = GalleryStore::new();
        let id = append(&mut store);
        store.apply(GalleryCommand::Resolve {
            id,
            verdict: ScreeningVerdict::Rejected {
                reason: "No face detected".into(),
            },
        });
        let record = store.get(id).unwrap();
        assert_eq!(record.status, ImageStatus::Invalid("No face detected".into()));
        assert!(record.abnormalities.is_none());
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let mut store = GalleryStore::new();
        append(&mut store);
        let effect = store.apply(GalleryCommand::Resolve {
            id: ImageId(99),
            verdict: face(),
        });
        assert_eq!(effect, CommandEffect::Ignored(ImageId(99)));
        assert_eq!(store.pending(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_record_is_resolved_only_once() {
        let mut store = GalleryStore::new();
        let id = append(&mut store);
        store.apply(GalleryCommand::Resolve { id, verdict: face() });
        let second = store.apply(GalleryCommand::Resolve {
            id,
            verdict: ScreeningVerdict::Rejected { reason: "late".into() },
        });
        assert_eq!(second, CommandEffect::Ignored(id));
        assert_eq!(store.get(id).unwrap().status, ImageStatus::Processed);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_changes() {
        let mut store = GalleryStore::new();
        let id = append(&mut store);
        let before = store.snapshot();
        store.apply(GalleryCommand::Resolve { id, verdict: face() });
        append(&mut store);

        assert_eq!(before.len(), 1);
        assert_eq!(before.processing(), 1);
        let after = store.snapshot();
        assert_eq!(after.len(), 2);
        assert_eq!(after.processed(), 1);
        assert_eq!(after.processing(), 1);
        assert_eq!(after.invalid(), 0);
    }
}
