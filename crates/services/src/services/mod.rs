pub mod api;
pub mod config;
pub mod engine_path;
pub mod profile_editor;
pub mod profile_import;
pub mod profiles;
