//! CLI command implementations.

pub mod add;
pub mod inspect;
pub mod records;
pub mod verify;

use invoicedb_core::{Config, CoreResult, Database, InFileDatabase};
use invoicedb_storage::LineFile;

/// Opens the store named by `config`.
pub fn open(config: &Config) -> CoreResult<Box<dyn Database>> {
    invoicedb_core::open_database(config)
}

/// Opens an existing data file for inspection.
///
/// The data file is left exactly as found: nothing is created and a partial
/// last line is not repaired. Only the lock file is written.
pub fn open_file(config: &Config) -> Result<InFileDatabase, Box<dyn std::error::Error>> {
    if config.backend != invoicedb_core::Backend::InFile {
        return Err("this command requires the in-file backend".into());
    }
    if !LineFile::exists(&config.file_path) {
        return Err(format!("No data file found at {:?}", config.file_path).into());
    }
    let config = config.clone().create_dirs(false).repair_tail(false);
    Ok(InFileDatabase::open_with_config(&config)?)
}
