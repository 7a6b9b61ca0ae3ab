pub mod gallery_loader;
pub mod model_cache;
