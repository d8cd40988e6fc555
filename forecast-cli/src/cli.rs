use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{Config, ForecastWidget, ViewState, WeatherbitProvider, render, submit_query};
use inquire::{Password, PasswordDisplayMode, Text};
use std::{io::Write, sync::Arc};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::session;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Seven-day weather forecast widget")]
pub struct Cli {
    /// Log filter, e.g. "debug" or "forecast_core=trace". Overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Without a subcommand, starts an interactive session.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the Weatherbit API key and default city.
    Configure,

    /// Show the forecast for one city and exit.
    Show {
        /// City name; the configured default city when absent.
        city: Option<String>,

        /// Print the view state as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        init_logging(self.log_level.as_deref());

        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { city, json }) => {
                let config = Config::load()?;
                let provider = Arc::new(WeatherbitProvider::new(&config));
                let mut widget = ForecastWidget::new(provider, config.default_city);

                let state = match city {
                    Some(city) => widget.search(&city).await,
                    None => widget.load_default().await,
                };
                write_state(&mut std::io::stdout().lock(), state, json)
            }
            None => {
                let config = Config::load()?;
                let provider = Arc::new(WeatherbitProvider::new(&config));
                let input = BufReader::new(tokio::io::stdin());
                session::run(provider, &config.default_city, input, std::io::stdout()).await
            }
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn write_state<W: Write>(out: &mut W, state: &ViewState, json: bool) -> anyhow::Result<()> {
    if json {
        let text =
            serde_json::to_string_pretty(state).context("Failed to serialize view state")?;
        writeln!(out, "{text}")?;
    } else {
        writeln!(out, "{}", render(state))?;
    }
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let api_key = Password::new("Weatherbit API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()?;
    let city = submit_query(&city)?;
    config.set_default_city(city.to_string());

    config.save()?;
    println!("Saved configuration to {}", Config::default_path()?.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["forecast"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn show_accepts_optional_city_and_json() {
        let cli = Cli::try_parse_from(["forecast", "show", "New York", "--json"]).expect("parses");
        match cli.command {
            Some(Command::Show { city, json }) => {
                assert_eq!(city.as_deref(), Some("New York"));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["forecast", "show"]).expect("parses");
        assert!(matches!(cli.command, Some(Command::Show { city: None, json: false })));
    }

    #[test]
    fn json_output_carries_state_tag() {
        let mut out = Vec::new();
        write_state(&mut out, &ViewState::Empty, true).expect("written");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains(r#""state": "empty""#), "got: {text}");
    }

    #[test]
    fn log_level_is_global() {
        let cli = Cli::try_parse_from(["forecast", "show", "--log-level", "debug"]).expect("parses");
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
