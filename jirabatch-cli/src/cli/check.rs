//! `jirabatch check`

use anyhow::Result;
use jirabatch_core::output::print_success;

use crate::clients::create_runtime_and_client;
use crate::settings::{Overrides, Settings};

pub fn handle_check_command() -> Result<()> {
  let settings = Settings::load(&Overrides::default())?;
  let (rt, client) = create_runtime_and_client(&settings)?;

  let user = rt.block_on(client.get_myself())?;
  let name = user.display_name.as_deref().unwrap_or(&user.account_id);
  print_success(&format!(
    "Authenticated to {} as {} ({})",
    client.base_url(),
    name,
    user.account_id
  ));
  Ok(())
}
