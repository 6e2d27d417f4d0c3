#![forbid(unsafe_code)]

//! Command-line argument parsing for the binding demo.
//!
//! Parses args by hand; the demo takes only a handful of flags.
//! Supports environment variable overrides via the `BINDWIRE_DEMO_*` prefix.
//! Arguments win over the environment.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Bindwire demo: a form kept in sync with its model across threads

USAGE:
    bindwire-demo [OPTIONS]

OPTIONS:
    --headless           Run without a UI thread (view updates are dropped)
    --edits=N            Background model edits to simulate (default: 3)
    --blocking           Background writers wait for each view update
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    BINDWIRE_DEMO_HEADLESS   Same as --headless (1/true/yes/on)
    BINDWIRE_DEMO_EDITS      Same as --edits
    BINDWIRE_DEMO_BLOCKING   Same as --blocking (1/true/yes/on)
    BINDWIRE_HEADLESS, BINDWIRE_BLOCKING_VIEW_UPDATES,
    BINDWIRE_BLOCKING_UI_CALLBACKS
                             Marshaller defaults, see bindwire-runtime
    RUST_LOG                 Log filter (default: info)";

const ENV_HEADLESS: &str = "BINDWIRE_DEMO_HEADLESS";
const ENV_EDITS: &str = "BINDWIRE_DEMO_EDITS";
const ENV_BLOCKING: &str = "BINDWIRE_DEMO_BLOCKING";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub headless: bool,
    pub edits: u32,
    pub blocking: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            headless: false,
            edits: 3,
            blocking: false,
        }
    }
}

#[derive(Debug)]
pub enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Opts {
    /// Parse process args and environment; prints and exits on help,
    /// version or bad input.
    pub fn parse() -> Self {
        match parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("bindwire-demo {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid value for {flag}: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }
}

fn env_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Opts, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: Fn(&str) -> Option<String>,
{
    let mut opts = Opts::default();

    if let Some(val) = get_env(ENV_HEADLESS) {
        opts.headless = env_flag(&val);
    }
    if let Some(val) = get_env(ENV_EDITS)
        && let Ok(n) = val.parse()
    {
        opts.edits = n;
    }
    if let Some(val) = get_env(ENV_BLOCKING) {
        opts.blocking = env_flag(&val);
    }

    for arg in args {
        let arg = arg.into();
        match arg.as_str() {
            "--help" | "-h" => return Err(ParseError::Help),
            "--version" | "-V" => return Err(ParseError::Version),
            "--headless" => opts.headless = true,
            "--blocking" => opts.blocking = true,
            other => {
                if let Some(val) = other.strip_prefix("--edits=") {
                    match val.parse() {
                        Ok(n) => opts.edits = n,
                        Err(_) => {
                            return Err(ParseError::InvalidValue {
                                flag: "--edits",
                                value: val.to_string(),
                            });
                        }
                    }
                } else {
                    return Err(ParseError::UnknownArg(other.to_string()));
                }
            }
        }
    }

    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_with_env<I, S>(args: I, env: &[(&str, &str)]) -> Result<Opts, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        parse_from_env_and_args(args, |key| {
            env.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        })
    }

    #[test]
    fn defaults() {
        let opts = parse_with_env(Vec::<String>::new(), &[]).expect("parse");
        assert_eq!(opts, Opts::default());
        assert_eq!(opts.edits, 3);
        assert!(!opts.headless);
        assert!(!opts.blocking);
    }

    #[test]
    fn version_string_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn help_text_lists_env_overrides() {
        for key in [ENV_HEADLESS, ENV_EDITS, ENV_BLOCKING] {
            assert!(HELP_TEXT.contains(key), "help text is missing {key}");
        }
    }

    #[test]
    fn flags_parse() {
        let opts = parse_with_env(["--headless", "--blocking", "--edits=7"], &[]).expect("parse");
        assert!(opts.headless);
        assert!(opts.blocking);
        assert_eq!(opts.edits, 7);
    }

    #[test]
    fn env_overrides_apply() {
        let env = [
            (ENV_HEADLESS, "yes"),
            (ENV_EDITS, "12"),
            (ENV_BLOCKING, "ON"),
        ];
        let opts = parse_with_env(Vec::<String>::new(), &env).expect("parse");
        assert!(opts.headless, "env={env:?} expected headless");
        assert_eq!(opts.edits, 12, "env={env:?} expected edits=12");
        assert!(opts.blocking, "env={env:?} expected blocking");
    }

    #[test]
    fn falsy_and_invalid_env_values_keep_defaults() {
        let env = [(ENV_HEADLESS, "0"), (ENV_EDITS, "many")];
        let opts = parse_with_env(Vec::<String>::new(), &env).expect("parse");
        assert!(!opts.headless);
        assert_eq!(opts.edits, 3);
    }

    #[test]
    fn args_override_env() {
        let env = [(ENV_EDITS, "12")];
        let opts = parse_with_env(["--edits=1"], &env).expect("parse");
        assert_eq!(opts.edits, 1);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert!(matches!(parse_with_env(["-h"], &[]), Err(ParseError::Help)));
        assert!(matches!(
            parse_with_env(["--version", "--bogus"], &[]),
            Err(ParseError::Version)
        ));
    }

    #[test]
    fn invalid_value_reports_flag() {
        let args = ["--edits=-4"];
        let err = parse_with_env(args, &[]);
        assert!(
            matches!(err, Err(ParseError::InvalidValue { flag: "--edits", ref value }) if value == "-4"),
            "args={args:?} expected InvalidValue for --edits, got {err:?}"
        );
    }

    #[test]
    fn unknown_arg_reports_error() {
        let args = ["--mystery-flag"];
        let err = parse_with_env(args, &[]);
        assert!(
            matches!(err, Err(ParseError::UnknownArg(ref arg)) if arg == "--mystery-flag"),
            "args={args:?} expected UnknownArg for --mystery-flag, got {err:?}"
        );
    }
}
