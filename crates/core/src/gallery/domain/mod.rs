pub mod gallery_store;
pub mod image_record;
pub mod navigation_trigger;
