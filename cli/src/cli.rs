use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ethcali_lib::SizeOption;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

/// Custom styles for CLI help output - green headers like our abridged help
fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
}

/// Output format for CLI commands.
///
/// - `Auto`: Automatically detect based on terminal (text for TTY, JSON for pipes)
/// - `Text`: Human-readable text output
/// - `Json`: JSON output for scripting and agents
/// - `Yaml`: YAML output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Auto-detect: JSON if piped, text if terminal
    #[default]
    Auto,
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
    /// YAML output
    Yaml,
}

impl OutputFormat {
    /// Resolve `Auto` to a concrete format based on terminal detection.
    ///
    /// Returns `Text` if stdout is a terminal (interactive use),
    /// returns `Json` if stdout is not a terminal (piped/scripted use).
    pub fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Parser, Debug)]
#[command(name = "ethcali")]
#[command(about = "Inspect and drive the ETH Cali dashboard contracts across chains", long_about = None)]
#[command(version)]
#[command(styles = styles())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short = 'C',
        long = "config",
        value_name = "PATH",
        env = "ETHCALI_CONFIG",
        global = true
    )]
    pub config: Option<String>,

    // Display Options
    /// Verbosity level (can be used multiple times: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbosity", action = clap::ArgAction::Count, global = true, help_heading = "Display Options")]
    pub verbosity: u8,

    /// Control color output
    #[arg(
        long,
        value_name = "MODE",
        default_value = "auto",
        global = true,
        help_heading = "Display Options"
    )]
    pub color: ColorMode,

    /// Do not print log messages (aliases: -s, --silent)
    #[arg(
        short = 'q',
        long = "quiet",
        visible_short_alias = 's',
        visible_alias = "silent",
        global = true,
        help_heading = "Display Options"
    )]
    pub quiet: bool,

    /// Output format (auto detects: text for terminal, json for pipes)
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "auto",
        global = true,
        help_heading = "Display Options"
    )]
    pub output_format: OutputFormat,
}

/// Connection to a wallet that accepts EIP-1193 requests over JSON-RPC
#[derive(Args, Debug, Clone)]
pub struct WalletArgs {
    /// JSON-RPC endpoint of the wallet (e.g. a local dev node)
    #[arg(
        long = "wallet-rpc",
        value_name = "URL",
        env = "ETHCALI_WALLET_RPC",
        help_heading = "Wallet Options"
    )]
    pub wallet_rpc: String,

    /// Account to act as (defaults to the wallet's first account)
    #[arg(
        long = "from",
        value_name = "ADDRESS",
        env = "ETHCALI_FROM",
        help_heading = "Wallet Options"
    )]
    pub from: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Setup Commands ===
    /// Manage configuration
    #[command(
        alias = "c",
        after_help = "\
Examples:
  ethcali config                          # Show current config
  ethcali config init                     # Write a starter config file
  ethcali config get admin_cache          # Get specific value
  ethcali config validate                 # Check config is valid"
    )]
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    // === Info Commands ===
    /// List and inspect supported chains
    #[command(
        alias = "n",
        after_help = "\
Examples:
  ethcali chains                          # List all chains
  ethcali chains info base                # Show details for Base
  ethcali chains info eip155:10           # Look up by CAIP-2 id"
    )]
    Chains {
        #[command(subcommand)]
        command: Option<ChainCommands>,
    },

    /// Resolve a wallet chain tag to the chain the dashboard would use
    #[command(after_help = "\
Examples:
  ethcali resolve eip155:8453
  ethcali resolve 0x82
  ethcali resolve solana:mainnet          # Falls back to the default chain")]
    Resolve {
        /// Chain tag as reported by a wallet (number, hex, or namespaced string)
        tag: String,
    },

    /// Check which admin roles an address holds
    #[command(after_help = "\
Examples:
  ethcali admin 0x1234...                 # On the default chain
  ethcali admin 0x1234... --chain optimism")]
    Admin {
        /// Address to check
        address: String,
        /// Chain label or id (defaults to the default chain)
        #[arg(long, short = 'n')]
        chain: Option<String>,
    },

    /// Read merch store state
    #[command(alias = "s")]
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },

    /// Compute or decode variant token ids
    #[command(name = "token-id")]
    TokenId {
        #[command(subcommand)]
        command: TokenIdCommands,
    },

    /// Convert between display prices and stablecoin base units
    Price {
        #[command(subcommand)]
        command: PriceCommands,
    },

    // === Wallet Commands ===
    /// Switch the wallet to another chain, adding it if the wallet lacks it
    #[command(after_help = "\
Examples:
  ethcali switch unichain --wallet-rpc http://127.0.0.1:8545")]
    Switch {
        /// Target chain label or id
        chain: String,
        #[command(flatten)]
        wallet: WalletArgs,
    },

    /// Buy a store variant, approving the stablecoin spend first if needed
    #[command(
        alias = "b",
        after_help = "\
Examples:
  ethcali buy 422 --quantity 2 --price 25 --wallet-rpc http://127.0.0.1:8545"
    )]
    Buy {
        /// Variant token id
        token_id: String,
        /// Number of items
        #[arg(long, short = 'n', default_value_t = 1)]
        quantity: u64,
        /// Unit price in display units (read from the store when omitted)
        #[arg(long)]
        price: Option<f64>,
        /// Do not request gas sponsorship
        #[arg(long)]
        no_sponsor: bool,
        #[command(flatten)]
        wallet: WalletArgs,
    },

    /// Show version information
    #[command(alias = "v")]
    Version,

    /// Generate shell completions script
    #[command(
        alias = "com",
        after_help = "\
Examples:
  ethcali completions bash >> ~/.bashrc
  ethcali completions zsh >> ~/.zshrc
  ethcali completions fish > ~/.config/fish/completions/ethcali.fish"
    )]
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Get a specific configuration value
    Get {
        /// Configuration key (supports dot notation, e.g., "metadata.gateway")
        key: String,
    },
    /// Validate configuration file
    Validate,
    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChainCommands {
    /// List all supported chains
    List,
    /// Show detailed information about a chain
    Info {
        /// Chain label, id, or CAIP-2 id (e.g., "base", "10", "eip155:130")
        chain: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum StoreCommands {
    /// List every variant with its metadata
    Variants {
        #[arg(long, short = 'n')]
        chain: Option<String>,
    },
    /// Show one variant
    Variant {
        token_id: String,
        #[arg(long, short = 'n')]
        chain: Option<String>,
    },
    /// Show the payment token and treasury
    Settings {
        #[arg(long, short = 'n')]
        chain: Option<String>,
    },
    /// Show the redemption status of a token for an owner
    Status {
        token_id: String,
        owner: String,
        #[arg(long, short = 'n')]
        chain: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TokenIdCommands {
    /// Token id for a product base id and size
    Generate {
        base_id: u64,
        /// Size (S, M, L, XL, NA)
        #[arg(value_parser = parse_size)]
        size: SizeOption,
    },
    /// Split a token id into base id and size
    Parse { token_id: String },
}

#[derive(Subcommand, Debug)]
pub enum PriceCommands {
    /// Display price to base units (6 decimals)
    ToUnits { price: f64 },
    /// Base units to display price
    FromUnits { units: u128 },
}

fn parse_size(s: &str) -> Result<SizeOption, String> {
    s.parse::<SizeOption>().map_err(|e| e.to_string())
}

impl Cli {
    /// Log filter implied by `-v`/`-q`, used when `RUST_LOG` is unset
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "off";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
