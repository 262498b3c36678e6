use std::io::Write;
use std::path::Path;

use spikewire_core::ScanConfig;

use crate::error::CliError;

pub fn execute(path: &Path) -> Result<(), CliError> {
    let config = ScanConfig::load(path)?;
    let rendered = serde_json::to_string_pretty(&config)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
