//! `jirabatch apply`

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use jirabatch_core::attachment::AttachmentResolver;
use jirabatch_core::executor::{BatchExecutor, RecordOutcome};
use jirabatch_core::followup::{build_followups, default_followup_path, followup_only_fields, write_followups};
use jirabatch_core::mapper::PayloadMapper;
use jirabatch_core::output::{format_path, print_error, print_header, print_info};
use jirabatch_core::record::load_records;
use jirabatch_core::report::BatchSummary;
use serde::Serialize;
use tracing::{info, warn};

use super::BatchArgs;
use crate::clients::create_runtime_and_tracker;
use crate::settings::Settings;
use crate::summary::print_summary;

#[derive(Args, Debug)]
pub struct ApplyArgs {
  #[command(flatten)]
  pub batch: BatchArgs,

  /// Where to write follow-up update records for created issues
  #[arg(long, value_name = "PATH", conflicts_with = "no_followup")]
  pub followup: Option<PathBuf>,

  /// Do not write a follow-up file
  #[arg(long)]
  pub no_followup: bool,

  /// Print the summary as JSON on stdout
  #[arg(long)]
  pub json: bool,
}

#[derive(Serialize)]
struct ApplyReport<'a> {
  #[serde(flatten)]
  summary: &'a BatchSummary,
  followup: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  followup_error: Option<String>,
}

pub fn handle_apply_command(args: &ApplyArgs) -> Result<ExitCode> {
  let file = &args.batch.file;
  let records = load_records(file)?;
  let settings = Settings::load(&args.batch.overrides())?;
  let resolver = settings.resolver(&records)?;
  let mapper = PayloadMapper::new(
    settings.mapper_options(),
    resolver.as_ref().map(|r| r as &dyn AttachmentResolver),
  );

  if !args.json {
    print_header(&format!(
      "Applying {} record(s) from {}",
      records.len(),
      format_path(&file.display().to_string())
    ));
  }

  let (rt, mut tracker) = create_runtime_and_tracker(&settings)?;
  let outcomes = rt.block_on(async {
    let mut executor = BatchExecutor::new(&mut tracker, &mapper);
    executor.run(&records).await
  });

  let summary = BatchSummary::from_outcomes(&outcomes);

  let mut followup = None;
  let mut followup_error = None;
  let entries = build_followups(&outcomes, &settings.followup_status);
  if settings.write_followup && !args.no_followup {
    if !entries.is_empty() {
      let path = args.followup.clone().unwrap_or_else(|| default_followup_path(file));
      match write_followups(&path, &entries) {
        Ok(()) => {
          info!("Wrote {} follow-up record(s) to {}", entries.len(), path.display());
          followup = Some(path);
        }
        Err(e) => followup_error = Some(format!("{e:#}")),
      }
    }
  } else {
    warn_dropped_followup_fields(&outcomes);
  }

  if args.json {
    let report = ApplyReport {
      summary: &summary,
      followup,
      followup_error: followup_error.clone(),
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize summary")?;
    println!("{json}");
  } else {
    print_summary(&summary);
    if let Some(path) = &followup {
      print_info(&format!(
        "Follow-up updates for {} created issue(s) written to {}",
        entries.len(),
        format_path(&path.display().to_string())
      ));
    }
  }

  if let Some(error) = &followup_error {
    print_error(&format!("Follow-up records were not written: {error}"));
    return Ok(ExitCode::FAILURE);
  }

  if summary.all_succeeded() {
    Ok(ExitCode::SUCCESS)
  } else {
    Ok(ExitCode::FAILURE)
  }
}

/// Created issues whose status, comment, points or attachment would only have
/// been applied through the follow-up file.
fn warn_dropped_followup_fields(outcomes: &[RecordOutcome]) {
  for outcome in outcomes {
    let (Some(issue), Some(record)) = (outcome.created_issue(), &outcome.record) else {
      continue;
    };
    let fields = followup_only_fields(record);
    if !fields.is_empty() {
      warn!(
        "{issue}: follow-up file disabled; {} from the create record will not be applied",
        fields.join(", ")
      );
    }
  }
}
