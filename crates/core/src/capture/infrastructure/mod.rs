pub mod ffmpeg_capture_session;
pub mod image_file_loader;
pub mod path_gallery_picker;
