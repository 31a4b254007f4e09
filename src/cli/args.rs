use std::path::PathBuf;

use clap::Parser;

/// Interactive console for an encrypted credential store
#[derive(Debug, Parser)]
#[command(name = "vault_core_cli")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the store file
    pub store: PathBuf,

    /// TOML file with a [logconfig] table
    #[arg(long, value_name = "FILE")]
    pub logcfg: Option<PathBuf>,

    /// Create a new, empty store at the path instead of opening one
    #[arg(long)]
    pub init: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_path_is_required() {
        assert!(CliArgs::try_parse_from(["vault_core_cli"]).is_err());
    }

    #[test]
    fn parses_store_and_log_config() {
        let args =
            CliArgs::try_parse_from(["vault_core_cli", "vault.store", "--logcfg", "log.toml"])
                .expect("parse");
        assert_eq!(args.store, PathBuf::from("vault.store"));
        assert_eq!(args.logcfg, Some(PathBuf::from("log.toml")));
        assert!(!args.init);
    }

    #[test]
    fn init_flag_is_optional() {
        let args = CliArgs::try_parse_from(["vault_core_cli", "--init", "new.store"]).expect("parse");
        assert!(args.init);
        assert_eq!(args.store, PathBuf::from("new.store"));
    }
}
