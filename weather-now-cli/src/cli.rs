use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use inquire::{Confirm, Select, Text};
use weather_now_core::{
    Config, LocationQuery, PrecipitationUnit, SearchPhase, TemperatureUnit, WeatherViewModel,
    WindUnit, provider,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-now", version, about = "Current weather and a 5-day forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default location.
    Configure,

    /// Show weather for a place, coordinates, or the detected location.
    Show {
        /// Place name, e.g. "Paris" or "Paris, FR". Detected from your IP if absent.
        location: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true, conflicts_with = "location")]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        #[command(flatten)]
        units: UnitArgs,
    },

    /// Search for places; optionally pick one and show its weather.
    Search {
        text: String,

        /// Choose a match interactively and show its weather.
        #[arg(long)]
        pick: bool,

        #[command(flatten)]
        units: UnitArgs,
    },
}

/// Display units for this run only; they are never saved.
#[derive(Debug, Clone, Copy, Args)]
pub struct UnitArgs {
    #[arg(long, value_enum, default_value_t = TempArg::Celsius)]
    pub temperature: TempArg,

    #[arg(long, value_enum, default_value_t = WindArg::Kmh)]
    pub wind: WindArg,

    #[arg(long, value_enum, default_value_t = PrecipArg::Mm)]
    pub precipitation: PrecipArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TempArg {
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WindArg {
    Kmh,
    Mph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PrecipArg {
    Mm,
    In,
}

impl From<TempArg> for TemperatureUnit {
    fn from(arg: TempArg) -> Self {
        match arg {
            TempArg::Celsius => TemperatureUnit::Celsius,
            TempArg::Fahrenheit => TemperatureUnit::Fahrenheit,
        }
    }
}

impl From<WindArg> for WindUnit {
    fn from(arg: WindArg) -> Self {
        match arg {
            WindArg::Kmh => WindUnit::Kmh,
            WindArg::Mph => WindUnit::Mph,
        }
    }
}

impl From<PrecipArg> for PrecipitationUnit {
    fn from(arg: PrecipArg) -> Self {
        match arg {
            PrecipArg::Mm => PrecipitationUnit::Millimeters,
            PrecipArg::In => PrecipitationUnit::Inches,
        }
    }
}

impl UnitArgs {
    fn apply(self, vm: &mut WeatherViewModel) {
        vm.set_temperature_unit(self.temperature.into());
        vm.set_wind_unit(self.wind.into());
        vm.set_precipitation_unit(self.precipitation.into());
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, lat, lon, units } => {
                let config = Config::load()?;
                let mut vm = view_model(&config)?;
                units.apply(&mut vm);

                match (location, lat, lon) {
                    (_, Some(lat), Some(lon)) => {
                        vm.load(LocationQuery::Coordinates { lat, lon }).await;
                    }
                    (Some(place), _, _) => vm.load(LocationQuery::Place(place)).await,
                    _ => {
                        let detector = provider::detector_from_config(&config)?;
                        vm.mount(detector.as_ref()).await;
                    }
                }

                present(&mut vm).await
            }
            Command::Search { text, pick, units } => {
                let config = Config::load()?;
                let mut vm = view_model(&config)?;
                units.apply(&mut vm);

                search(&mut vm, text, pick).await
            }
        }
    }
}

fn view_model(config: &Config) -> anyhow::Result<WeatherViewModel> {
    let source = provider::source_from_config(config)?;
    Ok(WeatherViewModel::new(source, config.default_location.clone(), config.search_debounce()))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeather API key:")
        .with_default(config.api_key.as_deref().unwrap_or_default())
        .prompt()
        .context("API key prompt was cancelled")?;

    let default_location = Text::new("Default location (used when detection fails):")
        .with_default(&config.default_location)
        .prompt()
        .context("Location prompt was cancelled")?;

    config.api_key = Some(api_key.trim().to_string()).filter(|k| !k.is_empty());
    config.default_location = default_location.trim().to_string();

    let path = config.save()?;
    tracing::debug!(path = %path.display(), "Configuration saved");
    println!("Saved configuration to {}", path.display());
    Ok(())
}

/// Print the weather, or the error with a retry prompt until the user gives up.
async fn present(vm: &mut WeatherViewModel) -> anyhow::Result<()> {
    loop {
        if let Some(display) = vm.display() {
            render::print_weather(&display);
            return Ok(());
        }

        let message = vm.error().unwrap_or("Something went wrong.").to_string();
        eprintln!("{message}");

        let retry = Confirm::new(&format!("Retry {}?", vm.retry_location()))
            .with_default(true)
            .prompt()
            .unwrap_or(false);

        if !retry {
            anyhow::bail!(message);
        }
        tracing::info!(location = %vm.retry_location(), "Retrying weather fetch");
        vm.retry().await;
    }
}

async fn search(vm: &mut WeatherViewModel, text: String, pick: bool) -> anyhow::Result<()> {
    let mut updates = vm.search().subscribe();
    vm.input_search(text);

    loop {
        updates.changed().await.context("search stopped unexpectedly")?;
        if updates.borrow_and_update().phase.is_settled() {
            break;
        }
    }

    let snapshot = vm.search_snapshot();
    if snapshot.phase == SearchPhase::Failed {
        println!("Place search is unavailable right now.");
        return Ok(());
    }
    if snapshot.candidates.is_empty() {
        println!("No places found. Queries need at least three characters.");
        return Ok(());
    }

    if !pick {
        render::print_candidates(&snapshot.candidates);
        return Ok(());
    }

    let labels: Vec<String> = snapshot.candidates.iter().map(render::candidate_label).collect();
    let choice = Select::new("Pick a place:", labels.clone())
        .prompt()
        .context("Place selection was cancelled")?;
    let index = labels.iter().position(|l| *l == choice).unwrap_or_default();
    tracing::debug!(index, place = %choice, "Picked search suggestion");

    vm.select_suggestion(index).await;
    present(vm).await
}
