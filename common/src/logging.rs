use std::str::FromStr;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{prelude::*, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initializes the global tracing subscriber.
///
/// Safe to call more than once (tests re-enter this); only the first call
/// installs a subscriber.
pub fn init(level: &str, json: bool) -> Result<()> {
    INITIALIZED.get_or_try_init(|| -> Result<()> {
        let env_filter = EnvFilter::from_str(level)?;

        let builder = tracing_subscriber::fmt()
            .with_line_number(true)
            .with_file(true)
            .with_env_filter(env_filter);

        if json {
            builder.json().finish().try_init()?;
        } else {
            builder.pretty().finish().try_init()?;
        }

        Ok(())
    })?;

    Ok(())
}
