use crate::cli::{Cli, OutputFormat};
use crate::colors::Colors;
use crate::config_utils::{config_path, load_config, load_registry};
use crate::output::{print_value_as_text, render};
use anyhow::{Context, Result};
use ethcali_lib::Config;

/// Show the effective configuration, defaults included
pub fn show_command(cli: &Cli, output_format: OutputFormat) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    let path = config_path(cli.config.as_ref())?;

    render(output_format, &config, |config| {
        let marker = if path.exists() { "" } else { " (not found, using defaults)" };
        println!("{}", Colors::dim(&format!("# {}{marker}", path.display())));
        match toml::to_string_pretty(config) {
            Ok(content) => print!("{content}"),
            Err(e) => eprintln!("{} {e}", Colors::error("Failed to render config:")),
        }
    })
}

/// Get a specific configuration value by key
pub fn get_command(cli: &Cli, key: &str, output_format: OutputFormat) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    let value = lookup_key(&config, key)?;

    render(output_format, &value, print_value_as_text)
}

/// Navigate the serialized config by a dotted key such as `metadata.gateway`
fn lookup_key(config: &Config, key: &str) -> Result<serde_json::Value> {
    let toml_value = toml::Value::try_from(config).context("Failed to serialize configuration")?;

    let mut current_value = &toml_value;
    for part in key.split('.') {
        current_value = match current_value {
            toml::Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
            other => other.get(part),
        }
        .ok_or_else(|| anyhow::anyhow!("Key '{key}' not found in configuration"))?;
    }

    Ok(toml_value_to_json(current_value))
}

/// Validate the configuration file
pub fn validate_command(cli: &Cli) -> Result<()> {
    let path = config_path(cli.config.as_ref())?;

    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }

    let config = Config::load_from(Some(&path))?;
    let registry = load_registry(&config)?;

    println!("Configuration is valid: {}", path.display());
    let default = registry.default_descriptor();
    println!(
        "  default chain: {} ({})",
        Colors::chain(&default.label),
        default.id
    );
    println!("  chains:        {}", registry.len());
    println!("  deployments:   {}", config.deployments.len());

    Ok(())
}

/// Write the default configuration to the config path
pub fn init_command(cli: &Cli, force: bool) -> Result<()> {
    let path = config_path(cli.config.as_ref())?;

    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at {}. Use --force to overwrite it.",
            path.display()
        );
    }

    Config::default()
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote default configuration");

    println!("{} Wrote {}", Colors::success("✓"), path.display());
    Ok(())
}

/// Convert TOML value to JSON value
fn toml_value_to_json(toml: &toml::Value) -> serde_json::Value {
    match toml {
        toml::Value::String(s) => serde_json::Value::String(s.clone()),
        toml::Value::Integer(i) => serde_json::Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => serde_json::Value::Bool(*b),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(toml_value_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .iter()
                .map(|(key, value)| (key.clone(), toml_value_to_json(value)))
                .collect(),
        ),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
    }
}
