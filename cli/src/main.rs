//! ethcali CLI - inspect and drive the ETH Cali dashboard contracts from a terminal

mod admin_command;
mod chain_commands;
mod cli;
mod colors;
mod config_commands;
mod config_utils;
mod errors;
mod exit_codes;
mod hyperlink;
mod output;
mod store_commands;
mod table;
mod token_commands;
mod wallet_commands;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use cli::{ChainCommands, Cli, ColorMode, Commands, ConfigCommands, Shell};
use colored::control;
use config_utils::{load_config, load_registry};
use exit_codes::ExitCode;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Exit promptly on Ctrl+C even while blocked on an RPC call
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("Interrupted");
        std::process::exit(ExitCode::Interrupted.code());
    }) {
        eprintln!("Warning: failed to set Ctrl+C handler: {e}");
    }

    let result = run().await;

    if let Err(e) = result {
        eprintln!("{}", errors::format_error_with_suggestion(&e));
        ExitCode::from(&e).exit();
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize color support based on user preference and NO_COLOR env var
    init_color_support(&cli);
    init_tracing(&cli);

    match cli.command {
        Some(ref command) => handle_command(&cli, command).await,
        None => show_status_and_help(&cli),
    }
}

/// Handle CLI subcommands
async fn handle_command(cli: &Cli, command: &Commands) -> Result<()> {
    let output_format = cli.output_format;

    match command {
        Commands::Config { command } => match command {
            Some(ConfigCommands::Get { key }) => {
                config_commands::get_command(cli, key, output_format)
            }
            Some(ConfigCommands::Validate) => config_commands::validate_command(cli),
            Some(ConfigCommands::Init { force }) => config_commands::init_command(cli, *force),
            None => config_commands::show_command(cli, output_format),
        },

        Commands::Version => show_version(),

        Commands::Completions { shell } => generate_completions(*shell),

        Commands::TokenId { command } => token_commands::token_id_command(command, output_format),

        Commands::Price { command } => token_commands::price_command(command, output_format),

        Commands::Chains { command } => {
            let registry = load_registry(&load_config(cli.config.as_ref())?)?;
            match command {
                Some(ChainCommands::Info { chain }) => {
                    chain_commands::show_chain_info(&registry, chain, output_format)
                        .context("Failed to show chain info")
                }
                Some(ChainCommands::List) | None => {
                    chain_commands::list_chains(&registry, output_format)
                        .context("Failed to list chains")
                }
            }
        }

        Commands::Resolve { tag } => {
            let registry = load_registry(&load_config(cli.config.as_ref())?)?;
            chain_commands::resolve_tag(&registry, tag, output_format)
        }

        Commands::Admin { address, chain } => {
            let config = load_config(cli.config.as_ref())?;
            let registry = Arc::new(load_registry(&config)?);
            admin_command::admin_command(&config, registry, address, chain.as_deref(), output_format)
                .await
        }

        Commands::Store { command } => {
            let config = load_config(cli.config.as_ref())?;
            let registry = Arc::new(load_registry(&config)?);
            store_commands::store_command(&config, registry, command, output_format).await
        }

        Commands::Switch { chain, wallet } => {
            let config = load_config(cli.config.as_ref())?;
            let registry = Arc::new(load_registry(&config)?);
            wallet_commands::switch_command(registry, chain, wallet, output_format).await
        }

        Commands::Buy {
            token_id,
            quantity,
            price,
            no_sponsor,
            wallet,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let registry = Arc::new(load_registry(&config)?);
            wallet_commands::buy_command(
                &config,
                registry,
                token_id,
                *quantity,
                *price,
                *no_sponsor,
                wallet,
                output_format,
            )
            .await
        }
    }
}

// ==================== Status and Help ====================

/// Show the active configuration and abridged help when run without arguments
fn show_status_and_help(cli: &Cli) -> Result<()> {
    use colored::Colorize;

    if let Ok(config) = load_config(cli.config.as_ref()) {
        if let Ok(registry) = load_registry(&config) {
            let default = registry.default_descriptor();
            println!("{}", "Chains".green().bold());
            println!(
                "  {} chains configured, default {} ({})",
                registry.len(),
                default.label.magenta(),
                default.id
            );
            println!();
        }
    }

    println!("{}", "Usage".green().bold());
    println!("  ethcali <COMMAND>");
    println!();
    println!("{}", "Commands".green().bold());
    println!("  chains       List supported chains");
    println!("  resolve      Resolve a wallet chain tag");
    println!("  admin        Check admin roles for an address");
    println!("  store        Read merch store state");
    println!("  token-id     Compute or decode variant token ids");
    println!("  switch       Switch a wallet to another chain");
    println!("  buy          Buy a store variant");
    println!("  config       Manage configuration");
    println!();
    println!("Run {} for more options", "ethcali help".cyan());
    Ok(())
}

// ==================== Simple Commands ====================

/// Show version information
fn show_version() -> Result<()> {
    const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("ethcali CLI: v{CLI_VERSION}");
    println!("ethcali-lib: v{}", ethcali_lib::VERSION);

    Ok(())
}

/// Generate shell completions
fn generate_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, bin_name, &mut std::io::stdout()),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, bin_name, &mut std::io::stdout()),
        Shell::Fish => generate(shells::Fish, &mut cmd, bin_name, &mut std::io::stdout()),
        Shell::PowerShell => generate(
            shells::PowerShell,
            &mut cmd,
            bin_name,
            &mut std::io::stdout(),
        ),
    }

    Ok(())
}

/// Initialize color support based on user preference and NO_COLOR env var
fn init_color_support(cli: &Cli) {
    let no_color_env = std::env::var("NO_COLOR").is_ok();

    match cli.color {
        ColorMode::Always => control::set_override(true),
        ColorMode::Never => control::set_override(false),
        ColorMode::Auto => {
            if no_color_env || !std::io::stdout().is_terminal() {
                control::set_override(false);
            }
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`/`-q`.
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ethcali={0},ethcali_lib={0}", cli.log_directive())));
    let ansi = match cli.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::env::var("NO_COLOR").is_err() && std::io::stderr().is_terminal(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(cli.verbosity >= 2)
        .init();
}
