//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; a single route table dispatches to domain
//! services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ContextCommands};
pub use presentation::{
    format_context_list_text, format_context_show_text, format_report_json, format_report_text,
    format_status_json, format_status_text,
};
pub use route::RunContext;
