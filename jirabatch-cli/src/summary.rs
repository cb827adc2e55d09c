//! Terminal rendering of run summaries and dry-run plans.

use jirabatch_core::executor::{PlannedRecord, RecordState};
use jirabatch_core::output::{
  format_command, format_issue_key, format_record_state, print_error, print_info, print_success, print_warning,
};
use jirabatch_core::report::BatchSummary;
use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct FailureRow {
  #[tabled(rename = "#")]
  record: usize,
  #[tabled(rename = "Record")]
  key: String,
  #[tabled(rename = "State")]
  state: String,
  #[tabled(rename = "Reason")]
  reason: String,
  #[tabled(rename = "Not applied")]
  skipped: String,
}

#[derive(Tabled)]
struct PlanRow {
  #[tabled(rename = "#")]
  record: usize,
  #[tabled(rename = "Record")]
  key: String,
  #[tabled(rename = "Operations")]
  operations: String,
}

/// Print counts, created issues and a table of records that need attention.
pub fn print_summary(summary: &BatchSummary) {
  println!(
    "\n{} {} records: {} succeeded, {} partially failed, {} failed, {} rejected",
    "Summary:".blue().bold(),
    summary.total,
    summary.succeeded,
    summary.partially_failed,
    summary.failed,
    summary.rejected,
  );

  if !summary.created.is_empty() {
    let created: Vec<String> = summary.created.iter().map(|key| format_issue_key(key)).collect();
    println!("Created: {}", created.join(", "));
  }

  if summary.failures.is_empty() {
    print_success("All records applied");
    return;
  }

  let rows: Vec<FailureRow> = summary
    .failures
    .iter()
    .map(|line| FailureRow {
      record: line.record,
      key: line.key.clone(),
      state: format_record_state(line.state),
      reason: line.reason.clone(),
      skipped: line.skipped.join(", "),
    })
    .collect();
  println!("\n{}", Table::new(rows).with(Style::sharp()));

  let partial = summary
    .failures
    .iter()
    .filter(|line| line.state == RecordState::PartiallyFailed)
    .count();
  if partial > 0 {
    print_warning(&format!(
      "{partial} record(s) were partially applied; re-running them repeats the operations that already succeeded"
    ));
  }

  let invalid = summary.validation_failures();
  if invalid > 0 {
    print_info(&format!(
      "{invalid} record(s) failed validation; {} checks a file without contacting Jira",
      format_command("jirabatch validate")
    ));
  }
}

/// Print the operations each record would produce. Returns the number of
/// records that could not be planned.
pub fn print_plan(plans: &[PlannedRecord]) -> usize {
  let mut problems = 0;
  let rows: Vec<PlanRow> = plans
    .iter()
    .map(|planned| {
      let operations = match &planned.plan {
        Ok(ops) if ops.is_empty() => "(nothing to do)".bright_black().to_string(),
        Ok(ops) => ops.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"),
        Err(e) => {
          problems += 1;
          format!("{} {}", e.kind().to_string().red(), e)
        }
      };
      PlanRow {
        record: planned.index + 1,
        key: planned.key.clone(),
        operations,
      }
    })
    .collect();

  println!("{}", Table::new(rows).with(Style::sharp()));

  if problems == 0 {
    print_success(&format!("{} record(s) are ready to apply", plans.len()));
  } else {
    print_error(&format!("{problems} of {} record(s) cannot be applied", plans.len()));
  }
  problems
}
