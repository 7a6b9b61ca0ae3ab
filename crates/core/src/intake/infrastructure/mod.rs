pub mod inline_screening_executor;
pub mod threaded_screening_executor;
