//! HTTP handlers for moodlog-web

pub mod analyze;
pub mod health;
pub mod logs;
pub mod pages;
pub mod ui;

pub use analyze::analyze_image;
pub use health::health_routes;
pub use logs::view_logs;
pub use ui::serve_index;
