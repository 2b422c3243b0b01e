mod config_gen;
mod migrate;
mod report;

pub use config_gen::config_generate;
pub use migrate::run_migrations;
pub use report::{render_report, show_report};
