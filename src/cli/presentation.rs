//! CLI presentation: verification report, status, and context formatters.

use crate::config::StratumConfig;
use crate::context::{Context, ContextKind, ContextState};
use crate::error::{ProvisionError, StoreError};
use crate::pipeline::VerificationReport;
use crate::store::ContextRecord;
use comfy_table::{presets, Table};
use owo_colors::OwoColorize;

fn state_label(state: ContextState) -> String {
    match state {
        ContextState::Verified => state.to_string().green().to_string(),
        ContextState::Failed => state.to_string().red().to_string(),
        _ => state.to_string().yellow().to_string(),
    }
}

pub fn format_report_text(report: &VerificationReport) -> String {
    let mut out = String::new();

    for context in &report.contexts {
        out.push_str(&format!(
            "{} ({}): {}\n",
            context.name.bold(),
            context.kind,
            state_label(context.state)
        ));

        for error in &context.errors {
            out.push_str(&format!("  ! {}\n", error));
        }

        if !context.tasks.is_empty() {
            let mut table = Table::new();
            table.load_preset(presets::UTF8_FULL);
            table.set_header(vec!["Task", "Status", "Message"]);
            for task in &context.tasks {
                table.add_row(vec![
                    task.id.clone(),
                    task.status.to_string(),
                    task.message.clone(),
                ]);
            }
            out.push_str(&format!("{}\n", table));
        }
        out.push('\n');
    }

    if report.dry_run {
        out.push_str(&format!(
            "{} context(s) planned (dry run)\n",
            report.contexts.len()
        ));
    } else {
        let verified = report.contexts.iter().filter(|c| c.is_verified()).count();
        let failed = report.contexts.len() - verified;
        out.push_str(&format!(
            "{} context(s) verified, {} failed\n",
            verified, failed
        ));
    }
    out
}

pub fn format_report_json(report: &VerificationReport) -> Result<String, ProvisionError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| ProvisionError::StoreError(StoreError::Encoding(e.to_string())))
}

pub fn format_status_text(records: &[ContextRecord]) -> String {
    if records.is_empty() {
        return "No contexts have been verified yet.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec!["Context", "Kind", "State", "Updated", "Detail"]);
    for record in records {
        let detail = record
            .last_report
            .as_ref()
            .and_then(|r| r.failed_task())
            .map(|t| format!("{}: {}", t.id, t.message))
            .unwrap_or_default();
        table.add_row(vec![
            record.name.clone(),
            record.kind.to_string(),
            record.state.to_string(),
            record.updated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            detail,
        ]);
    }
    table.to_string()
}

pub fn format_status_json(records: &[ContextRecord]) -> Result<String, ProvisionError> {
    serde_json::to_string_pretty(records)
        .map_err(|e| ProvisionError::StoreError(StoreError::Encoding(e.to_string())))
}

pub fn format_context_list_text(config: &StratumConfig) -> String {
    if config.contexts.is_empty() {
        return "No contexts declared.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec!["Context", "Kind", "Requires"]);
    for (name, decl) in &config.contexts {
        let requires = decl
            .kind
            .parse::<ContextKind>()
            .map(|kind| kind.required_capabilities().join(", "))
            .unwrap_or_else(|_| "?".to_string());
        table.add_row(vec![name.clone(), decl.kind.clone(), requires]);
    }
    table.to_string()
}

pub fn format_context_show_text(context: &Context, errors: &[ProvisionError]) -> String {
    let mut out = format!(
        "{} ({}): {}\n",
        context.name.bold(),
        context.kind,
        state_label(context.state())
    );

    if !context.required_capabilities().is_empty() {
        out.push_str(&format!(
            "Requires: {}\n",
            context.required_capabilities().join(", ")
        ));
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec!["Property", "Value"]);
    for (name, value) in context.properties().iter() {
        table.add_row(vec![name.clone(), value.to_string()]);
    }
    out.push_str(&table.to_string());

    if !errors.is_empty() {
        out.push_str(&format!("\n\nErrors ({}):", errors.len()));
        for error in errors {
            out.push_str(&format!("\n  - {}", error));
        }
    }
    out
}
