pub mod image_intake;
pub mod infrastructure;
pub mod screening;
pub mod screening_executor;
pub mod session_logger;
