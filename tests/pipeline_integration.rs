//! End-to-end tests: CSV bytes in, forecast table and export out.

use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use quickcast::config::PipelineConfig;
use quickcast::io::{forecast_csv_string, read_table, CsvOptions, Encoding, ExportMode};
use quickcast::models::ModelKind;
use quickcast::prep::{build_window, normalize, resolve_columns, ColumnChoice, NormalizeConfig};
use quickcast::session::{Selections, Session};
use quickcast::{Error, Role, Stage};

fn csv(text: &str) -> quickcast::core::RawTable {
    read_table(text.as_bytes(), &CsvOptions::default()).unwrap()
}

fn selections(horizon: usize, model: ModelKind) -> Selections {
    Selections {
        horizon,
        model: Some(model),
        ..Selections::default()
    }
}

#[test]
fn blank_value_row_is_dropped() {
    let table = csv("date,value\n2023-01-01,100.5\n2023-01-02,102.0\n2023-01-03,\n");
    let roles = resolve_columns(
        &table,
        &ColumnChoice::Auto,
        &ColumnChoice::Auto,
        &Default::default(),
    )
    .unwrap();
    assert_eq!(roles.value_column(), "value");

    let normalized = normalize(
        &table,
        roles.date_column(),
        roles.value_column(),
        &NormalizeConfig::default(),
    )
    .unwrap();
    let series = normalized.series;
    assert_eq!(series.len(), 2);
    assert_eq!(
        series.timestamps(),
        &[
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap(),
        ]
    );
    assert_eq!(series.values(), &[100.5, 102.0]);

    let warning = normalized.warning.unwrap();
    assert_eq!(warning.dropped_rows, 1);
    assert_eq!(warning.sample_rows, vec![3]);

    let window = build_window(&series, 3).unwrap();
    let expected: Vec<_> = (3..=5)
        .map(|d| Utc.with_ymd_and_hms(2023, 1, d, 0, 0, 0).unwrap())
        .collect();
    assert_eq!(window, expected);
}

#[test]
fn drift_forecast_extends_the_line() {
    let table = csv("when;amount\n2023-03-01;10\n2023-03-02;12\n2023-03-03;14\n2023-03-04;16\n");
    let mut session = Session::new(table, PipelineConfig::default());
    let outcome = session.apply(selections(3, ModelKind::Drift)).unwrap();

    assert_eq!(outcome.roles.date_column(), "when");
    assert_eq!(outcome.roles.value_column(), "amount");
    assert_eq!(outcome.rows.len(), 7);

    let forecast: Vec<_> = outcome.rows.iter().filter(|r| !r.is_historical).collect();
    assert_eq!(
        forecast[0].timestamp,
        Utc.with_ymd_and_hms(2023, 3, 5, 0, 0, 0).unwrap()
    );
    assert_relative_eq!(forecast[0].point_estimate, 18.0, epsilon = 1e-9);
    assert_relative_eq!(forecast[2].point_estimate, 22.0, epsilon = 1e-9);
    // A perfect line leaves no residual spread.
    assert_relative_eq!(forecast[2].lower_bound, 22.0, epsilon = 1e-9);

    let fitted: Vec<_> = outcome.rows[..4].iter().map(|r| r.fitted_value).collect();
    assert_eq!(fitted[0], None);
    assert_relative_eq!(fitted[3].unwrap(), 16.0, epsilon = 1e-9);
}

#[test]
fn holt_intervals_bracket_the_point() {
    let body: String = (1..=28)
        .map(|d| format!("2023-02-{d:02},{}\n", 50.0 + d as f64 + (d % 3) as f64 * 2.0))
        .collect();
    let table = csv(&format!("day,units\n{body}"));
    let mut session = Session::new(table, PipelineConfig::default());
    let outcome = session.apply(selections(14, ModelKind::Holt)).unwrap();

    assert_eq!(outcome.model_name, "HoltLinearTrend");
    for row in outcome.rows.iter().filter(|r| !r.is_historical) {
        assert!(row.lower_bound < row.point_estimate);
        assert!(row.upper_bound > row.point_estimate);
    }
    assert_eq!(
        outcome.rows.last().unwrap().timestamp,
        Utc.with_ymd_and_hms(2023, 3, 14, 0, 0, 0).unwrap()
    );
}

#[test]
fn export_matches_download_layout() {
    let table = csv("date,value\n2023-01-01,1\n2023-01-02,2\n2023-01-03,3\n");
    let mut session = Session::new(table, PipelineConfig::default());
    let outcome = session.apply(selections(2, ModelKind::Drift)).unwrap();

    let text = forecast_csv_string(&outcome.rows, ExportMode::ForecastOnly).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec![
        "Date,Forecast,Lower CI,Upper CI",
        "2023-01-04,4.0,4.0,4.0",
        "2023-01-05,5.0,5.0,5.0",
    ]);

    let full = forecast_csv_string(&outcome.rows, ExportMode::Full).unwrap();
    assert_eq!(full.lines().count(), 1 + 5);
}

#[test]
fn no_date_column_names_the_role() {
    let table = csv("name,score\nalpha,1\nbeta,2\ngamma,3\n");
    let mut session = Session::new(table, PipelineConfig::default());
    let err = session.apply(Selections::default()).unwrap_err();
    assert_eq!(err, Error::ColumnInference { role: Role::Date });
    assert_eq!(err.stage(), Stage::Inference);
    assert!(err.to_string().contains("date"));
}

#[test]
fn horizon_out_of_range_is_rejected() {
    let table = csv("date,value\n2023-01-01,1\n2023-01-02,2\n");
    let mut session = Session::new(table, PipelineConfig::default());
    for horizon in [0, 366, 400] {
        assert_eq!(
            session.apply(selections(horizon, ModelKind::Drift)).unwrap_err(),
            Error::InvalidHorizon { horizon }
        );
    }
}

#[test]
fn single_valid_row_is_an_empty_series() {
    let table = csv("date,value\n2023-01-01,1\nsoon,2\n2023-01-03,n/a\n");
    let mut session = Session::new(table, PipelineConfig::default());
    let err = session
        .apply(Selections {
            date: ColumnChoice::Named("date".into()),
            value: ColumnChoice::Named("value".into()),
            ..Selections::default()
        })
        .unwrap_err();
    assert_eq!(err, Error::EmptySeries { needed: 2, got: 1 });
    assert_eq!(err.stage(), Stage::Normalize);
}

#[test]
fn latin1_upload_with_monthly_dates() {
    let mut bytes = b"Monat;Ums\xe4tze\n".to_vec();
    for m in 1..=6 {
        bytes.extend_from_slice(format!("2023-{m:02}-01;{}\n", 100 + m * 10).as_bytes());
    }
    let table = read_table(
        &bytes,
        &CsvOptions {
            encoding: Encoding::Auto,
            ..CsvOptions::default()
        },
    )
    .unwrap();
    assert_eq!(table.columns()[1], "Umsätze");

    let config = PipelineConfig::from_yaml_str("window:\n  calendar_months: true\n").unwrap();
    let mut session = Session::new(table, config);
    let outcome = session.apply(selections(3, ModelKind::Drift)).unwrap();
    let expected: Vec<_> = (7..=9)
        .map(|m| Utc.with_ymd_and_hms(2023, m, 1, 0, 0, 0).unwrap())
        .collect();
    assert_eq!(outcome.window, expected);
}

#[test]
fn day_first_upload_forecasts_from_the_last_day() {
    let mut text = String::from("Datum;Wert\n");
    for d in 1..=20 {
        text.push_str(&format!("{d:02}/02/2023;{}\n", 100 + d));
    }
    let mut session = Session::new(csv(&text), PipelineConfig::default());
    let outcome = session.apply(selections(2, ModelKind::Drift)).unwrap();

    assert!(outcome.warning.is_none());
    assert_eq!(outcome.series.len(), 20);
    assert_eq!(
        outcome.series.timestamps()[12],
        Utc.with_ymd_and_hms(2023, 2, 13, 0, 0, 0).unwrap()
    );
    assert_eq!(
        outcome.window,
        vec![
            Utc.with_ymd_and_hms(2023, 2, 21, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 2, 22, 0, 0, 0).unwrap(),
        ]
    );
    assert_relative_eq!(outcome.rows[20].point_estimate, 121.0, epsilon = 1e-9);
}
