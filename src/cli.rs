//! Command-line arguments.
//!
//! The port flag is traditionally spelled with a single dash (`-port 8080`,
//! `-port=8080`). clap only understands single-dash short flags, so known long
//! flags given with one dash are rewritten to two before parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{LogFormat, DEFAULT_PORT};

/// Long flags that may be given with a single dash.
const SINGLE_DASH_FLAGS: &[&str] = &["port", "config", "log-level", "log-format"];

/// terrarium: readiness-gated REST service
#[derive(Parser, Debug)]
#[command(name = "terrarium", version, about)]
pub struct Args {
    /// Port number for the REST API server to listen to (1-65535)
    #[arg(short, long, default_value = DEFAULT_PORT, allow_hyphen_values = true)]
    pub port: String,

    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (e.g., "terrarium=debug,tower_http=info")
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Log output format, overrides the config file
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Args {
    /// Parse arguments, accepting single-dash long flags.
    pub fn parse_normalized<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_flags(args))
    }
}

/// Rewrite `-port`/`-port=..` style flags to `--port`/`--port=..`.
///
/// The program name and anything after a bare `--` are left alone.
pub fn normalize_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;

    for (i, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();
        if i == 0 || passthrough {
            out.push(arg);
            continue;
        }

        let rewritten = arg.to_str().and_then(|s| {
            if s == "--" {
                return None;
            }
            let rest = s.strip_prefix('-').filter(|r| !r.starts_with('-'))?;
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            SINGLE_DASH_FLAGS
                .contains(&name)
                .then(|| OsString::from(format!("-{}", s)))
        });

        if arg == "--" {
            passthrough = true;
        }
        out.push(rewritten.unwrap_or(arg));
    }

    out
}
