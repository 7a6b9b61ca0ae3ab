pub mod face_check_session;
pub mod presentation;
pub mod session_config;
