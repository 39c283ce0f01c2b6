pub mod app;
pub mod csv_export;
pub mod logging;
pub mod render;
pub mod settings;
pub mod state;
pub mod summarizer;
pub mod utils;
