use dirs::home_dir;
use std::{
    env,
    fs::OpenOptions,
    path::PathBuf,
    sync::{Mutex, Once},
};

use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, EnvFilter};

use crate::config::{ConfigError, LogConfig, LogFormat};

const DEFAULT_DIR_NAME: &str = ".vault_core";
const HISTORY_FILE: &str = "history.txt";
const DEFAULT_DIRECTIVE: &str = "vault_core=warn";

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber.
///
/// Without a configuration, `RUST_LOG` is honoured and warnings from this crate
/// go to stderr. Only the first call has any effect.
pub fn init_tracing(config: Option<&LogConfig>) -> Result<(), ConfigError> {
    let mut outcome = Ok(());
    TRACING_INIT.call_once(|| {
        outcome = install(config);
    });
    outcome
}

fn install(config: Option<&LogConfig>) -> Result<(), ConfigError> {
    let Some(config) = config else {
        let directive = DEFAULT_DIRECTIVE
            .parse()
            .map_err(|_| ConfigError::Filter(DEFAULT_DIRECTIVE.into()))?;
        let filter = EnvFilter::from_default_env().add_directive(directive);
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        return Ok(());
    };

    let directives = config.directives();
    let filter =
        EnvFilter::try_new(&directives).map_err(|_| ConfigError::Filter(directives.clone()))?;
    let writer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_writer(writer);
    let _ = match config.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    Ok(())
}

/// Directory for per-user state such as command history.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("VAULT_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn history_path() -> PathBuf {
    app_data_dir().join(HISTORY_FILE)
}
