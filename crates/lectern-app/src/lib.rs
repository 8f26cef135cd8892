//! Lectern App Library
//!
//! Command line shell around the viewport and region capture engine.

pub mod cli;
pub mod commands;
pub mod error;
pub mod settings;

pub use cli::{Cli, Commands, RegionsCommand};
pub use commands::Session;
pub use error::AppError;
pub use settings::AppSettings;

use std::io::Write;

/// Load settings for `cli` and run its command.
pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<(), AppError> {
    let settings = AppSettings::load(&cli)?;
    log::debug!("Library: {}", settings.library.display());
    let mut session = Session::open(settings).await?;
    session.execute(cli.command, out).await
}
