use clap::{ArgAction, Parser};
use converse_core::DEFAULT_PAYLOAD_FILE;
use std::ffi::OsString;
use std::path::PathBuf;

/// Converse: send a JSON conversation payload to the Bedrock Converse API and
/// print the reply with token usage.
///
/// AWS region and credentials are read from the environment or a local .env
/// file (AWS_REGION, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN,
/// AWS_BEARER_TOKEN_BEDROCK, AWS_PROFILE).
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Examples:\n  converse                    # Uses payload.json\n  converse my_payload.json    # Uses my_payload.json\n  converse data/test.json     # Uses data/test.json")]
pub struct Cli {
    /// Path to JSON payload file.
    #[arg(default_value = DEFAULT_PAYLOAD_FILE)]
    pub payload_file: PathBuf,

    /// Increase log verbosity.
    ///
    /// Specify multiple times for more verbose output:
    ///  -v:  INFO level
    ///  -vv: DEBUG level (includes request and response bodies)
    ///  -vvv: TRACE level (most verbose)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parses the process arguments, exiting on `--help` or a usage error.
    pub fn parse_args() -> Self {
        Self::parse_from(with_help_alias(std::env::args_os()))
    }
}

/// A bare `help` as the first argument asks for usage, like `--help`.
fn with_help_alias<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 1 && arg.as_os_str() == "help" {
                OsString::from("--help")
            } else {
                arg
            }
        })
        .collect()
}
