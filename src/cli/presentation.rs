//! CLI presentation: text and json formatters per command family.

mod config;
mod plan;
mod run;

pub use config::{format_config_show, format_config_validation};
pub use plan::format_plan_json;
pub use run::{format_run_json, format_run_text};
