//! `jirabatch validate`

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use jirabatch_core::attachment::AttachmentResolver;
use jirabatch_core::executor::plan_records;
use jirabatch_core::mapper::PayloadMapper;
use jirabatch_core::record::load_records;

use super::BatchArgs;
use crate::settings::Settings;
use crate::summary::print_plan;

#[derive(Args, Debug)]
pub struct ValidateArgs {
  #[command(flatten)]
  pub batch: BatchArgs,
}

/// Map every record offline and report what `apply` would send.
pub fn handle_validate_command(args: &ValidateArgs) -> Result<ExitCode> {
  let records = load_records(&args.batch.file)?;
  let settings = Settings::load(&args.batch.overrides())?;
  let resolver = settings.resolver(&records)?;
  let mapper = PayloadMapper::new(
    settings.mapper_options(),
    resolver.as_ref().map(|r| r as &dyn AttachmentResolver),
  );

  let plans = plan_records(&mapper, &records);
  if print_plan(&plans) == 0 {
    Ok(ExitCode::SUCCESS)
  } else {
    Ok(ExitCode::FAILURE)
  }
}
