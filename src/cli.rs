//! Command-line flags.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "lifeline", version)]
#[command(about = "Run the server until it is stopped or fails", long_about = None)]
pub struct Cli {
    /// Config file to use
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse `args`, which exclude the program name.
    pub fn parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let argv = std::iter::once(OsString::from("lifeline")).chain(args.into_iter().map(Into::into));
        Self::try_parse_from(argv)
    }

    /// Config files in the order they should be applied.
    pub fn config_files(&self) -> Vec<PathBuf> {
        self.config.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags() {
        let cli = Cli::parse_args(Vec::<String>::new()).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.config_files().is_empty());
    }

    #[test]
    fn short_and_long_config_flag() {
        let short = Cli::parse_args(["-c", "a.toml"]).unwrap();
        assert_eq!(short.config_files(), vec![PathBuf::from("a.toml")]);

        let long = Cli::parse_args(["--config", "b.toml"]).unwrap();
        assert_eq!(long.config, Some(PathBuf::from("b.toml")));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let err = Cli::parse_args(["--bogus"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
