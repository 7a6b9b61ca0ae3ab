pub mod abnormality_analyzer;
