//! Line-oriented command shell over a [`Session`]
//!
//! Results go to `out`; prompts, paths and error messages go to `err`, so
//! a non-interactive run prints nothing but the requested values.

use std::io::{self, BufRead, Write};

use key_tool::account::{PRESETS, Session};
use key_tool::{Error, KeyTree};
use zeroize::Zeroizing;

/// A shell command, named by its short keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Address,
    GetPath,
    SetCoin,
    Currency,
    SetAccount,
    IncrementAccount,
    DecrementAccount,
    External,
    Internal,
    SetIndex,
    IncrementIndex,
    DecrementIndex,
    SetPath,
    SetNetworkByte,
    SetWifByte,
    Xpub,
    Xprv,
    PublicKey,
    PrivateKey,
    Wif,
    Quit,
}

impl Command {
    pub fn parse(word: &str) -> Option<Self> {
        let command = match word {
            "q" => Self::Quit,
            "addr" => Self::Address,
            "gp" => Self::GetPath,
            "sc" => Self::SetCoin,
            "cur" => Self::Currency,
            "sa" => Self::SetAccount,
            "++a" => Self::IncrementAccount,
            "--a" => Self::DecrementAccount,
            "ext" => Self::External,
            "int" => Self::Internal,
            "si" => Self::SetIndex,
            "++i" => Self::IncrementIndex,
            "--i" => Self::DecrementIndex,
            "sp" => Self::SetPath,
            "snb" => Self::SetNetworkByte,
            "swb" => Self::SetWifByte,
            "xpub" => Self::Xpub,
            "xprv" => Self::Xprv,
            "pub" => Self::PublicKey,
            "prv" => Self::PrivateKey,
            "wif" => Self::Wif,
            other if matches!(other.to_ascii_lowercase().as_str(), "h" | "?" | "help") => Self::Help,
            _ => return None,
        };
        Some(command)
    }

    /// Prompt used to ask for a missing parameter
    fn parameter_prompt(self) -> Option<&'static str> {
        match self {
            Self::SetCoin => Some("Enter coin identifier: "),
            Self::SetAccount => Some("Enter account identifier: "),
            Self::SetIndex => Some("Enter address index: "),
            Self::SetPath => Some("Enter path (account/change/index): "),
            Self::SetNetworkByte => Some("Enter network byte: "),
            Self::SetWifByte => Some("Enter WIF byte: "),
            _ => None,
        }
    }
}

const HELP: &[(&str, &str)] = &[
    ("h", "help"),
    ("addr", "get address"),
    ("gp", "get path"),
    ("sc", "set coin"),
    ("cur", "show or select currency"),
    ("sa", "set account"),
    ("++a", "increment account"),
    ("--a", "decrement account"),
    ("ext", "set external (not change)"),
    ("int", "set internal (change)"),
    ("si", "set address index"),
    ("++i", "increment address index"),
    ("--i", "decrement address index"),
    ("sp", "set path"),
    ("snb", "set network byte"),
    ("swb", "set WIF byte"),
    ("xpub", "account extended public key"),
    ("xprv", "account extended private key"),
    ("pub", "hex public key"),
    ("prv", "hex private key"),
    ("wif", "wallet import format"),
    ("q", "quit"),
];

const RULE: &str = "---------------------------------------";

pub struct Shell<R, W, E> {
    input: R,
    out: W,
    err: E,
    interactive: bool,
}

impl<R: BufRead, W: Write, E: Write> Shell<R, W, E> {
    pub fn new(input: R, out: W, err: E, interactive: bool) -> Self {
        Self { input, out, err, interactive }
    }

    /// Read and run commands until `q` or end of input
    pub fn run<K: KeyTree>(&mut self, session: &mut Session<K>) -> io::Result<()> {
        self.show_path(session)?;

        loop {
            let Some(line) = self.read_line("Command: ")? else {
                if self.interactive {
                    writeln!(self.err)?;
                }
                break;
            };

            let mut parts = line.trim().splitn(2, char::is_whitespace);
            let word = parts.next().unwrap_or_default();
            if word.is_empty() {
                continue;
            }
            let param = parts.next().map(str::trim).filter(|p| !p.is_empty());

            let Some(command) = Command::parse(word) else {
                writeln!(self.err, "Command \"{}\" not recognized", word)?;
                continue;
            };
            if command == Command::Quit {
                break;
            }
            if !self.execute(session, command, param)? {
                break;
            }
        }

        if self.interactive {
            writeln!(self.err, "Quitting")?;
        }
        Ok(())
    }

    /// Run one command; `false` means input ran out while asking for a
    /// parameter
    fn execute<K: KeyTree>(
        &mut self,
        session: &mut Session<K>,
        command: Command,
        param: Option<&str>,
    ) -> io::Result<bool> {
        let param = match (param, command.parameter_prompt()) {
            (Some(param), _) => Some(param.to_string()),
            (None, Some(prompt)) => match self.read_prompted(prompt)? {
                Some(param) => Some(param),
                None => return Ok(false),
            },
            (None, None) => None,
        };
        let text = param.as_deref().unwrap_or_default();

        match command {
            Command::Help => self.print_help()?,
            Command::GetPath => writeln!(self.out, "{}", session.path())?,
            Command::Currency => match param.as_deref() {
                Some(ticker) => {
                    if self.report(session.select_currency(ticker).map(|_| ()))? {
                        self.show_path(session)?;
                    }
                }
                None => self.print_currencies(session)?,
            },
            Command::SetCoin => self.edit_path(session, |s| s.set_coin(text))?,
            Command::SetAccount => self.edit_path(session, |s| s.set_account(text))?,
            Command::IncrementAccount => self.edit_path(session, |s| s.increment_account())?,
            Command::DecrementAccount => {
                if session.path().account == 0 {
                    writeln!(self.err, "Account can't be decremented")?;
                } else {
                    self.edit_path(session, |s| s.decrement_account())?;
                }
            }
            Command::External => self.edit_path(session, |s| {
                s.set_external();
                Ok(())
            })?,
            Command::Internal => self.edit_path(session, |s| {
                s.set_internal();
                Ok(())
            })?,
            Command::SetIndex => self.edit_path(session, |s| s.set_index(text))?,
            Command::IncrementIndex => self.edit_path(session, |s| s.increment_index())?,
            Command::DecrementIndex => {
                if session.path().index == 0 {
                    writeln!(self.err, "Address index can't be decremented")?;
                } else {
                    self.edit_path(session, |s| s.decrement_index())?;
                }
            }
            Command::SetPath => self.edit_path(session, |s| s.set_path(text))?,
            Command::SetNetworkByte => {
                self.report(session.set_network_byte(text))?;
            }
            Command::SetWifByte => {
                self.report(session.set_wif_byte(text))?;
            }
            Command::Address => self.print_value(session.address().map(|a| a.address))?,
            Command::PublicKey => self.print_value(session.public_key_hex())?,
            Command::PrivateKey => self.print_secret(session.private_key_hex())?,
            Command::Wif => self.print_secret(session.wif())?,
            Command::Xpub => self.print_value(session.xpub())?,
            Command::Xprv => self.print_secret(session.xprv())?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn edit_path<K: KeyTree>(
        &mut self,
        session: &mut Session<K>,
        edit: impl FnOnce(&mut Session<K>) -> key_tool::Result<()>,
    ) -> io::Result<()> {
        if self.report(edit(session))? {
            self.show_path(session)?;
        }
        Ok(())
    }

    /// Print a library error to `err`; `true` when there was none
    fn report(&mut self, result: key_tool::Result<()>) -> io::Result<bool> {
        match result {
            Ok(()) => Ok(true),
            Err(e) => {
                self.print_error(&e)?;
                Ok(false)
            }
        }
    }

    fn print_value(&mut self, value: key_tool::Result<String>) -> io::Result<()> {
        match value {
            Ok(value) => writeln!(self.out, "{}", value),
            Err(e) => self.print_error(&e),
        }
    }

    fn print_secret(&mut self, value: key_tool::Result<Zeroizing<String>>) -> io::Result<()> {
        match value {
            Ok(value) => writeln!(self.out, "{}", value.as_str()),
            Err(e) => self.print_error(&e),
        }
    }

    fn print_error(&mut self, error: &Error) -> io::Result<()> {
        if !error.is_validation() {
            tracing::warn!(%error, "command failed");
        }
        writeln!(self.err, "{}", error)
    }

    fn show_path<K: KeyTree>(&mut self, session: &Session<K>) -> io::Result<()> {
        if self.interactive {
            writeln!(self.err, "{}", session.path())?;
        }
        Ok(())
    }

    fn print_help(&mut self) -> io::Result<()> {
        writeln!(self.err, "{}", RULE)?;
        writeln!(self.err, "                  HELP")?;
        writeln!(self.err, "{}", RULE)?;
        for (keyword, description) in HELP {
            writeln!(self.err, "{:>6}  - {}", keyword, description)?;
        }
        writeln!(self.err, "{}", RULE)
    }

    fn print_currencies<K: KeyTree>(&mut self, session: &Session<K>) -> io::Result<()> {
        let current = session.currency();
        writeln!(
            self.out,
            "{} address byte {} wif byte {}",
            current,
            current.address_byte(),
            current.wif_byte()
        )?;
        if self.interactive {
            let tickers: Vec<&str> = PRESETS.iter().map(|c| c.ticker()).collect();
            writeln!(self.err, "Available: {}", tickers.join(" "))?;
        }
        Ok(())
    }

    fn read_prompted(&mut self, prompt: &str) -> io::Result<Option<String>> {
        Ok(self.read_line(prompt)?.map(|line| line.trim().to_string()))
    }

    /// One line of input without its terminator; `None` at end of input
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if self.interactive {
            write!(self.err, "{}", prompt)?;
            self.err.flush()?;
        }

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
