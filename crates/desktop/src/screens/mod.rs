pub mod alert;
pub mod result_screen;
pub mod selection_screen;
pub mod settings_screen;
pub mod thumbnail;
