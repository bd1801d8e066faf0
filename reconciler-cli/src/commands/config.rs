use crate::config::CliConfig;
use crate::output::{self, OutputFormat};
use crate::ConfigCommands;
use anyhow::{bail, Result};
use reconciler_client::{format_go_duration, Config};

pub fn handle_config_command(
    command: ConfigCommands,
    config: &mut CliConfig,
    effective: &Config,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => match format {
            OutputFormat::Json => output::print_json(effective)?,
            OutputFormat::Yaml => output::print_yaml(effective)?,
            OutputFormat::Table => print!("{}", show_table(effective, format)),
        },
        ConfigCommands::SetUrl { url } => {
            let candidate = Config::new(url.clone());
            if let Err(e) = candidate.validate() {
                bail!("refusing to save '{}': {}", url, e);
            }

            config.default_url = url.clone();
            config.save()?;
            output::print_success(&format!("Default reconciler URL set to {}", url));
        }
    }
    Ok(())
}

/// Plain-text view of the configuration in effect for this invocation
fn show_table(effective: &Config, format: OutputFormat) -> String {
    let timeout = match effective.timeout() {
        Some(timeout) => format_go_duration(timeout),
        None => "transport default".to_string(),
    };

    format!(
        "Reconciler Configuration:\n  URL:     {}\n  Timeout: {}\n  Output:  {}\n",
        effective.url, timeout, format
    )
}
