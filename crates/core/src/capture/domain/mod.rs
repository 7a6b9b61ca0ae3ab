pub mod capture_error;
pub mod capture_session;
pub mod gallery_picker;
