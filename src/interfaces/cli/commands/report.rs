//! Print the analytics report

use colored::Colorize;

use crate::analytics::{AnalyticsReport, AnalyticsService, CountEntry, ReportOptions, TrailingWindow};
use crate::interfaces::cli::CliError;
use crate::storage::StorageFactory;

pub async fn show_report(days: u32, json: bool) -> Result<(), CliError> {
    let window = TrailingWindow::try_from(days)?;
    let config = crate::config::get_config();

    let store = StorageFactory::create(&config.database).await?;
    let service = AnalyticsService::new(
        store,
        ReportOptions {
            event_sample_limit: config.analytics.event_sample_limit,
            top_n: config.analytics.top_n,
        },
    );
    let report = service.report(window).await?;

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        println!("{}", out);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

fn render_table(out: &mut String, title: &str, entries: &[CountEntry]) {
    out.push_str(&format!("\n{}\n", title.bold()));
    if entries.is_empty() {
        out.push_str(&format!("  {}\n", "(none)".dimmed()));
        return;
    }
    for entry in entries {
        out.push_str(&format!("  {:>6}  {}\n", entry.count, entry.name));
    }
}

/// Human-readable report
pub fn render_report(report: &AnalyticsReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} (since {})\n",
        "Analytics report".cyan().bold(),
        report.window,
        report.since.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!(
        "  Unique sessions:     {}\n",
        report.unique_sessions
    ));
    out.push_str(&format!(
        "  Unique fingerprints: {}\n",
        report.unique_fingerprints
    ));
    out.push_str(&format!("  Total visits:        {}\n", report.total_visits));
    out.push_str(&format!(
        "  Avg time on page:    {}s\n",
        report.avg_time_on_page
    ));
    out.push_str(&format!(
        "  Avg scroll depth:    {}%\n",
        report.avg_scroll_depth
    ));
    out.push_str(&format!(
        "  Devices:             desktop {} / tablet {} / mobile {}\n",
        report.devices.desktop, report.devices.tablet, report.devices.mobile
    ));

    render_table(&mut out, "Top pages", &report.top_pages);
    render_table(&mut out, "Top events", &report.top_event_types);
    render_table(&mut out, "Top categories", &report.top_categories);

    if report.event_sample_truncated {
        out.push_str(&format!(
            "\n{}\n",
            format!(
                "Event tables use the {} most recent events only",
                report.event_sample_size
            )
            .yellow()
        ));
    }
    out
}
