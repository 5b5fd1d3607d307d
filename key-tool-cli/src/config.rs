//! Environment configuration for the shell

/// Default currency ticker when none is configured
pub const DEFAULT_CURRENCY: &str = "XST";

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings read from the environment; command-line flags override them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Ticker of the currency the session starts with
    pub currency: String,
    /// Ask for a BIP39 passphrase after the secret phrase
    pub passphrase_prompt: bool,
    pub log_filter: String,
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            currency: lookup("KEY_TOOL_CURRENCY")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            passphrase_prompt: lookup("KEY_TOOL_PASSPHRASE_PROMPT")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Filter to install, raised to `debug` for this tool when verbose
    pub fn effective_log_filter(&self, verbose: bool) -> String {
        if verbose {
            format!("{},key_tool=debug,key_tool_cli=debug", self.log_filter)
        } else {
            self.log_filter.clone()
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            passphrase_prompt: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
