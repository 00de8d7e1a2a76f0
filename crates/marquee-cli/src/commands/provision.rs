//! Provision command handler

use anyhow::{Context, Result};

use marquee_core::MovieTable;

use crate::output::Output;

/// Create the configured table if it does not exist
pub fn provision(table: &MovieTable, output: &Output) -> Result<()> {
    table.provision().context("Failed to provision table")?;

    let name = table.config().table_name.as_deref().unwrap_or_default();
    output.success(&format!(
        "Table '{}' ready in {}",
        name,
        table.config().sqlite_path().display()
    ));
    Ok(())
}
