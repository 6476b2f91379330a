//! CLI domain: parse, route, input, output, and presentation only.
//! No workflow logic; a single route table dispatches to the orchestrator.

mod input;
mod output;
mod parse;
mod presentation;
mod route;

pub use input::{load_notes, load_transcript};
pub use output::{map_error, CliError};
pub use parse::{Cli, Commands, ConfigCommands};
pub use presentation::{
    format_config_show, format_config_validation, format_plan_json, format_run_json,
    format_run_text,
};
pub use route::RunContext;
