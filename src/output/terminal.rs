//! Markdown table output with colored stability markers.

use colored::Colorize;

use crate::result::BenchResult;

/// Format a group of results as a markdown table headed by `title`.
///
/// The relative column is shown only when a `baseline` is given. Failed
/// (empty) results get a row carrying their error message instead of
/// numbers.
///
/// A table is meant for one unit, taken from the first result. Rows in a
/// different unit are still printed, tagged with `[per <unit>]` after the
/// name so their numbers are not read in the header's unit.
///
/// ```text
/// | relative |               ns/op |                op/s |    err% | benchmark
/// |---------:|--------------------:|--------------------:|--------:|:----------
/// |   100.0% |                5.63 |      177,553,749.61 |    0.0% | `atomic add`
/// ```
pub fn format_results(title: &str, results: &[BenchResult], baseline: Option<&BenchResult>) -> String {
    let unit = results.first().map_or("op", BenchResult::unit);
    let mut output = String::new();

    output.push_str(&format!("## {}\n\n", title));
    output.push_str(&header(unit, baseline.is_some()));
    for result in results {
        output.push_str(&row(result, baseline, unit));
    }
    output
}

/// Format a single result as a one-row table.
pub fn format_result(result: &BenchResult) -> String {
    let mut output = header(result.unit(), false);
    output.push_str(&row(result, None, result.unit()));
    output
}

fn header(unit: &str, relative: bool) -> String {
    let mut line = String::from("|");
    let mut rule = String::from("|");
    if relative {
        line.push_str(" relative |");
        rule.push_str("---------:|");
    }
    line.push_str(&format!(
        " {:>19} | {:>19} | {:>7} | benchmark\n",
        format!("ns/{}", unit),
        format!("{}/s", unit),
        "err%"
    ));
    rule.push_str("--------------------:|--------------------:|--------:|:----------\n");
    line + &rule
}

fn row(result: &BenchResult, baseline: Option<&BenchResult>, header_unit: &str) -> String {
    let mut line = String::from("|");

    if result.is_empty() {
        if baseline.is_some() {
            line.push_str(&format!(" {:>8} |", "-"));
        }
        let error = result.error().unwrap_or("no measurements");
        line.push_str(&format!(
            " {:>19} | {:>19} | {:>7} | `{}` {}\n",
            "-",
            "-",
            "-",
            result.name(),
            format!("failed: {}", error).red().bold()
        ));
        return line;
    }

    if let Some(baseline) = baseline {
        let relative = result
            .relative_to(baseline)
            .map_or_else(|| "-".to_string(), |r| format!("{:.1}%", r));
        line.push_str(&format!(" {:>8} |", relative));
    }

    line.push_str(&format!(
        " {:>19} | {:>19} | {:>6.1}% | `{}`",
        format_number(result.median() * 1e9, 2),
        format_number(result.units_per_second(), 2),
        result.median_ape() * 100.0,
        result.name()
    ));
    if result.unit() != header_unit {
        line.push_str(&format!(" [per {}]", result.unit()));
    }
    if result.is_unstable() {
        line.push_str(&format!(" {}", "(unstable)".yellow()));
    }
    line.push('\n');
    line
}

/// Format `value` with `decimals` fraction digits and comma-separated thousands.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 2);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
