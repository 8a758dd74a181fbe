//! One forecasting session over an uploaded table.
//!
//! Selections are replaced in whole on every interaction and each change
//! triggers one synchronous recompute: resolve columns, normalize, build the
//! window, fit and predict, assemble.

use chrono::{DateTime, Utc};
use tracing::{info, info_span};

use crate::config::PipelineConfig;
use crate::core::{RawTable, TimeSeries};
use crate::error::Result;
use crate::models::ModelKind;
use crate::prep::{
    assemble, build_window_with, normalize, resolve_columns, validate_horizon, ColumnChoice,
    ColumnRoles, ForecastRow, ParseWarning,
};

/// Default number of periods to forecast.
pub const DEFAULT_HORIZON: usize = 30;

/// Everything the user controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Selections {
    pub date: ColumnChoice,
    pub value: ColumnChoice,
    pub horizon: usize,
    /// Overrides the configured model when set.
    pub model: Option<ModelKind>,
}

impl Default for Selections {
    fn default() -> Self {
        Self {
            date: ColumnChoice::Auto,
            value: ColumnChoice::Auto,
            horizon: DEFAULT_HORIZON,
            model: None,
        }
    }
}

/// Result of one recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub roles: ColumnRoles,
    pub series: TimeSeries,
    pub window: Vec<DateTime<Utc>>,
    pub rows: Vec<ForecastRow>,
    pub warning: Option<ParseWarning>,
    pub model_name: String,
}

/// Run the full pipeline once.
pub fn run_forecast(
    table: &RawTable,
    selections: &Selections,
    config: &PipelineConfig,
) -> Result<Outcome> {
    validate_horizon(selections.horizon)?;

    let roles = resolve_columns(table, &selections.date, &selections.value, &config.inference)?;
    let normalized = normalize(
        table,
        roles.date_column(),
        roles.value_column(),
        &config.normalize,
    )?;
    let series = normalized.series;
    let window = build_window_with(&series, selections.horizon, &config.window)?;

    let mut model = selections.model.unwrap_or(config.model).create();
    model.fit(&series)?;
    let forecast = model.predict_with_intervals(window.len(), config.level)?;

    let rows = assemble(&series, model.fitted_values(), Some((window.as_slice(), &forecast)))?;

    info!(
        date = roles.date_column(),
        value = roles.value_column(),
        observations = series.len(),
        horizon = window.len(),
        model = model.name(),
        "forecast ready"
    );

    Ok(Outcome {
        model_name: model.name().to_string(),
        roles,
        series,
        window,
        rows,
        warning: normalized.warning,
    })
}

/// Holds the uploaded table, the current selections and the last outcome.
#[derive(Debug)]
pub struct Session {
    table: RawTable,
    config: PipelineConfig,
    selections: Selections,
    outcome: Option<Outcome>,
}

impl Session {
    pub fn new(table: RawTable, config: PipelineConfig) -> Self {
        Self {
            table,
            config,
            selections: Selections::default(),
            outcome: None,
        }
    }

    pub fn table(&self) -> &RawTable {
        &self.table
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    /// Outcome of the last successful recompute for the current selections.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Replace the selections and recompute.
    ///
    /// The previous outcome is discarded first, so a failed recompute leaves
    /// no stale rows next to the new selections.
    pub fn apply(&mut self, selections: Selections) -> Result<&Outcome> {
        let _span = info_span!("recompute", horizon = selections.horizon).entered();
        self.outcome = None;
        self.selections = selections;
        let outcome = run_forecast(&self.table, &self.selections, &self.config)?;
        Ok(self.outcome.insert(outcome))
    }
}
