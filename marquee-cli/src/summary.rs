//! Progress display and the end-of-run summary.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use marquee_core::PipelineReport;
use tabled::{builder::Builder, settings::Style};

/// Create a spinner for progress display.
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Render the report as a status line, a row-count table and the artifact
/// paths.
pub fn render(report: &PipelineReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} Similarity artifacts built in {}ms\n",
        "SUCCESS:".green().bold(),
        report.duration_ms.to_string().yellow()
    ));

    let mut builder = Builder::default();
    builder.push_record(["Stage", "Rows"]);
    let counts = [
        ("movies loaded", report.movies_loaded),
        ("credits loaded", report.credits_loaded),
        ("merged", report.merged_rows),
        ("dropped (nulls)", report.null_rows_dropped),
        ("dropped (duplicates)", report.duplicate_rows_dropped),
        ("movies tagged", report.movies),
        ("vocabulary terms", report.vocabulary_size),
    ];
    for (label, count) in counts {
        builder.push_record([label.to_string(), count.to_string()]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    output.push_str(&format!("\n{}\n", table));

    output.push_str(&format!("\n{}\n", "Artifacts".cyan().bold()));
    output.push_str(&format!(
        "  Movie list:  {}\n",
        report.movie_list_path.display()
    ));
    output.push_str(&format!(
        "  Similarity:  {} ({}x{})\n",
        report.similarity_path.display(),
        report.similarity_size,
        report.similarity_size
    ));
    output.push_str(&format!("  Report:      {}", report.report_path.display()));
    output
}
