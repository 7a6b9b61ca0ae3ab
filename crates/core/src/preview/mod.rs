pub mod live_preview;
