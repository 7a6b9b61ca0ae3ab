pub mod placeholder_analyzer;
