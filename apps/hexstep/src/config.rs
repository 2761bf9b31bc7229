use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use hexgrid::MAX_RADIUS;
use serde::Deserialize;
use shared::{domain::StateScheme, protocol::RequestLayout};
use step_client::{SolverCommand, StepOptions};
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "hexstep.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub solver_command: String,
    pub solver_args: Vec<String>,
    pub step_timeout_ms: u64,
    pub radius: u32,
    pub hex_radius: f64,
    pub start_id: usize,
    pub end_id: usize,
    pub seed: Option<u64>,
    pub state_scheme: StateScheme,
    pub request_layout: RequestLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            solver_command: "./astar".into(),
            solver_args: Vec::new(),
            step_timeout_ms: 30_000,
            radius: 1,
            hex_radius: hexgrid::DEFAULT_HEX_RADIUS,
            start_id: 0,
            end_id: 3,
            seed: None,
            state_scheme: StateScheme::Binary,
            request_layout: RequestLayout::Flat,
        }
    }
}

impl Settings {
    pub fn solver(&self) -> SolverCommand {
        SolverCommand::new(PathBuf::from(&self.solver_command)).with_args(self.solver_args.clone())
    }

    pub fn step_options(&self) -> StepOptions {
        StepOptions {
            timeout: Duration::from_millis(self.step_timeout_ms),
            layout: self.request_layout,
        }
    }
}

/// Defaults, then the TOML file, then the process environment.
///
/// An explicit `path` must exist; without one `hexstep.toml` in the working directory is
/// used when present.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_settings_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Settings::default(),
    };

    apply_env(&mut settings, |key| std::env::var(key).ok());
    normalize(&mut settings);
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

pub fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

/// `HEXSTEP_*` variables, with `APP__*` aliases taking precedence. Values that do not
/// parse are ignored.
pub fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| {
        lookup(&format!("APP__{name}")).or_else(|| lookup(&format!("HEXSTEP_{name}")))
    };

    if let Some(v) = var("SOLVER_COMMAND").or_else(|| lookup("HEXSTEP_SOLVER")) {
        settings.solver_command = v;
    }
    if let Some(v) = var("SOLVER_ARGS") {
        settings.solver_args = v.split_whitespace().map(str::to_string).collect();
    }
    if let Some(v) = var("STEP_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        settings.step_timeout_ms = v;
    }
    if let Some(v) = var("RADIUS").and_then(|v| parse_radius(&v).ok()) {
        settings.radius = v;
    }
    if let Some(v) = var("HEX_RADIUS").and_then(|v| v.parse().ok()) {
        settings.hex_radius = v;
    }
    if let Some(v) = var("START_ID").and_then(|v| v.parse().ok()) {
        settings.start_id = v;
    }
    if let Some(v) = var("END_ID").and_then(|v| v.parse().ok()) {
        settings.end_id = v;
    }
    if let Some(v) = var("SEED").and_then(|v| v.parse().ok()) {
        settings.seed = Some(v);
    }
    if let Some(v) = var("STATE_SCHEME").and_then(|v| parse_keyword(&v)) {
        settings.state_scheme = v;
    }
    if let Some(v) = var("REQUEST_LAYOUT").and_then(|v| parse_keyword(&v)) {
        settings.request_layout = v;
    }
}

fn normalize(settings: &mut Settings) {
    let defaults = Settings::default();
    if settings.radius > MAX_RADIUS {
        warn!(
            radius = settings.radius,
            max = MAX_RADIUS,
            "configured radius too large; using default"
        );
        settings.radius = defaults.radius;
    }
    if settings.step_timeout_ms == 0 {
        settings.step_timeout_ms = defaults.step_timeout_ms;
    }
    if !settings.hex_radius.is_finite() || settings.hex_radius <= 0.0 {
        settings.hex_radius = defaults.hex_radius;
    }
    if settings.solver_command.trim().is_empty() {
        settings.solver_command = defaults.solver_command;
    }
}

fn parse_keyword<T>(raw: &str) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    T::deserialize(serde::de::value::StrDeserializer::<serde::de::value::Error>::new(
        &normalized,
    ))
    .ok()
}

/// Parses a cluster radius the way CLI arguments and interactive commands spell it.
pub fn parse_radius(raw: &str) -> Result<u32, String> {
    let radius =
        u32::from_str(raw.trim()).map_err(|_| format!("'{raw}' is not a non-negative radius"))?;
    if radius > MAX_RADIUS {
        return Err(format!("radius {radius} is larger than the maximum of {MAX_RADIUS}"));
    }
    Ok(radius)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
