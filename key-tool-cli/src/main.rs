//! Key Tool CLI
//!
//! Derives HD wallet keys and addresses from a BIP39 secret phrase through
//! a small command shell, and can generate or check phrases.

mod config;
mod shell;

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use key_tool::account::{CurrencyRegistry, Session};
use key_tool::crypto::mnemonic::{self, normalize_phrase, Wordlist};

use config::{CliConfig, DEFAULT_LOG_FILTER};
use shell::Shell;

#[derive(Parser)]
#[command(name = "key-tool")]
#[command(about = "HD Wallet Key Tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Currency ticker to start with (overrides KEY_TOOL_CURRENCY)
    #[arg(short, long, global = true)]
    currency: Option<String>,

    /// Read everything from stdin without prompts
    #[arg(short = 'N', long, global = true)]
    non_interactive: bool,

    /// Read the secret phrase hidden, then run without prompts
    #[arg(short = 'S', long, global = true)]
    semi_interactive: bool,

    /// Ask for a BIP39 passphrase (overrides KEY_TOOL_PASSPHRASE_PROMPT)
    #[arg(short = 'P', long, global = true)]
    passphrase: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the key shell (default)
    Shell,
    /// Print a fresh random secret phrase
    Generate {
        /// Number of words: 12, 15, 18, 21 or 24
        #[arg(short, long, default_value_t = 12)]
        words: usize,
    },
    /// Check a secret phrase and print its decoding as JSON
    Check,
}

/// How the secret phrase and shell commands are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Interactive,
    SemiInteractive,
    NonInteractive,
}

impl InputMode {
    fn from_flags(non_interactive: bool, semi_interactive: bool) -> Self {
        if semi_interactive {
            Self::SemiInteractive
        } else if non_interactive {
            Self::NonInteractive
        } else {
            Self::Interactive
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_env();

    init_tracing(&config.effective_log_filter(cli.verbose));
    debug!(version = key_tool::VERSION, "key-tool starting");

    let mode = InputMode::from_flags(cli.non_interactive, cli.semi_interactive);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Generate { words } => {
            let phrase = Zeroizing::new(mnemonic::generate(words, &Wordlist::english())?.join(" "));
            println!("{}", phrase.as_str());
        }
        Commands::Check => {
            let phrase = read_secret_phrase(mode, &mut input)?;
            let report = mnemonic::validate(&phrase, &Wordlist::english())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Shell => {
            let ticker = cli.currency.as_deref().unwrap_or(&config.currency);
            let currency = CurrencyRegistry::default().lookup(ticker)?;

            let phrase = read_secret_phrase(mode, &mut input)?;
            check_phrase(&phrase, mode);
            let passphrase = if cli.passphrase || config.passphrase_prompt {
                Zeroizing::new(rpassword::prompt_password("Passphrase: ")?)
            } else {
                Zeroizing::new(String::new())
            };

            let mut session = Session::from_mnemonic(&phrase, &passphrase, currency)?;
            drop(phrase);
            drop(passphrase);

            let interactive = mode == InputMode::Interactive;
            Shell::new(input, io::stdout().lock(), io::stderr().lock(), interactive)
                .run(&mut session)
                .context("shell I/O failed")?;
        }
    }

    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read the secret phrase the way `mode` asks for, normalized
fn read_secret_phrase(mode: InputMode, input: &mut impl BufRead) -> Result<Zeroizing<String>> {
    let raw = match mode {
        InputMode::Interactive if io::stdin().is_terminal() => {
            let hidden = Zeroizing::new(rpassword::prompt_password(
                "Secret phrase (hit enter for visible input): ",
            )?);
            if hidden.is_empty() {
                eprintln!("Secret phrase:");
                read_visible_line(input)?
            } else {
                hidden
            }
        }
        InputMode::Interactive => {
            eprintln!("Secret phrase:");
            read_visible_line(input)?
        }
        InputMode::SemiInteractive => {
            let hidden = Zeroizing::new(rpassword::prompt_password("Secret phrase: ")?);
            if hidden.is_empty() {
                bail!("No secret phrase given.");
            }
            eprintln!("{}", hidden.as_str());
            hidden
        }
        InputMode::NonInteractive => read_visible_line(input)?,
    };

    Ok(Zeroizing::new(normalize_phrase(&raw)))
}

fn read_visible_line(input: &mut impl BufRead) -> Result<Zeroizing<String>> {
    io::stderr().flush()?;
    let mut line = Zeroizing::new(String::new());
    if input.read_line(&mut *line)? == 0 {
        bail!("No secret phrase given.");
    }
    Ok(line)
}

/// Warn about phrases that are not valid BIP39; they still derive keys
fn check_phrase(phrase: &str, mode: InputMode) {
    let problem = match mnemonic::validate(phrase, &Wordlist::english()) {
        Ok(report) if report.valid => return,
        Ok(_) => "checksum does not match".to_string(),
        Err(e) => e.to_string(),
    };
    warn!(%problem, "secret phrase is not valid BIP39");
    if mode == InputMode::Interactive {
        eprintln!("WARNING: secret phrase is not valid BIP39 ({})", problem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_input_mode_flags() {
        assert_eq!(InputMode::from_flags(false, false), InputMode::Interactive);
        assert_eq!(InputMode::from_flags(true, false), InputMode::NonInteractive);
        assert_eq!(InputMode::from_flags(true, true), InputMode::SemiInteractive);
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::parse_from(["key-tool", "generate", "--words", "24"]);
        assert!(matches!(cli.command, Some(Commands::Generate { words: 24 })));

        let cli = Cli::parse_from(["key-tool", "-N", "--currency", "btc"]);
        assert!(cli.command.is_none());
        assert!(cli.non_interactive);
        assert_eq!(cli.currency.as_deref(), Some("btc"));
    }

    #[test]
    fn test_read_non_interactive_phrase() {
        let mut input = io::Cursor::new("  Abandon, ABANDON\tabout \n");
        let phrase = read_secret_phrase(InputMode::NonInteractive, &mut input).unwrap();
        assert_eq!(phrase.as_str(), "abandon abandon about");

        let mut empty = io::Cursor::new("");
        assert!(read_secret_phrase(InputMode::NonInteractive, &mut empty).is_err());
    }
}
