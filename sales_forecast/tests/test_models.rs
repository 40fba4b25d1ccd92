use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use rstest::rstest;
use sales_forecast::data::TimeSeries;
use sales_forecast::models::additive::{AdditiveConfig, AdditiveModel, SeasonalityMode};
use sales_forecast::utils::generate_sales_data;
use sales_forecast::{ForecastError, ForecastModel, TrainedForecastModel};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn linear_series(days: usize) -> TimeSeries {
    let dates = (0..days).map(|i| start() + Duration::days(i as i64)).collect();
    let amounts = (0..days).map(|i| 100.0 + 2.0 * i as f64).collect();
    TimeSeries::from_parts(dates, amounts).unwrap()
}

#[test]
fn test_prediction_covers_history_and_horizon() {
    let data = generate_sales_data(start(), 60, 1000.0, 0.05, 42).unwrap();
    let trained = AdditiveModel::default().train(&data).unwrap();

    let dates = trained.make_future_dates(14).unwrap();
    let points = trained.predict_dates(&dates).unwrap();

    assert_eq!(points.len(), 74);
    assert_eq!(points[0].date, start());
    assert_eq!(points[73].date, start() + Duration::days(73));
    for pair in points.windows(2) {
        assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
    }
    for point in &points {
        assert!(point.lower_bound <= point.point_estimate);
        assert!(point.point_estimate <= point.upper_bound);
        assert!(point.percent_change.is_none());
    }
}

#[test]
fn test_future_dates_follow_irregular_history() {
    let data = TimeSeries::from_parts(
        vec![start(), start() + Duration::days(3), start() + Duration::days(4)],
        vec![10.0, 12.0, 11.0],
    )
    .unwrap();
    let trained = AdditiveModel::default().train(&data).unwrap();

    let dates = trained.make_future_dates(2).unwrap();
    assert_eq!(
        dates,
        vec![
            start(),
            start() + Duration::days(3),
            start() + Duration::days(4),
            start() + Duration::days(5),
            start() + Duration::days(6),
        ]
    );
}

#[test]
fn test_linear_trend_is_extrapolated() {
    let data = linear_series(30);
    let trained = AdditiveModel::default().train(&data).unwrap();

    let dates = trained.make_future_dates(10).unwrap();
    let points = trained.predict_dates(&dates).unwrap();

    // Day 39 continues 100 + 2 * t
    assert_relative_eq!(points[39].point_estimate, 178.0, max_relative = 1e-4);
    assert_relative_eq!(points[0].point_estimate, 100.0, max_relative = 1e-4);
}

#[test]
fn test_intervals_widen_past_history() {
    let data = generate_sales_data(start(), 120, 500.0, 0.1, 3).unwrap();
    let trained = AdditiveModel::default().train(&data).unwrap();

    let dates = trained.make_future_dates(60).unwrap();
    let points = trained.predict_dates(&dates).unwrap();
    let width = |i: usize| points[i].upper_bound - points[i].lower_bound;

    let last_history = data.len() - 1;
    assert!(width(last_history + 30) > width(last_history));
    assert!(width(points.len() - 1) > width(last_history + 30));
}

#[rstest]
#[case(0)]
#[case(-5)]
fn test_invalid_horizon(#[case] horizon: i64) {
    let trained = AdditiveModel::default().train(&linear_series(10)).unwrap();
    let result = trained.make_future_dates(horizon);
    assert!(matches!(result, Err(ForecastError::InvalidHorizon(h)) if h == horizon));
}

#[rstest]
#[case(0)]
#[case(1)]
fn test_insufficient_history(#[case] days: usize) {
    let result = AdditiveModel::default().train(&linear_series(days));
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData { needed: 2, got }) if got == days
    ));
}

#[test]
fn test_two_observations_are_enough() {
    let trained = AdditiveModel::default().train(&linear_series(2)).unwrap();
    let dates = trained.make_future_dates(1).unwrap();
    let points = trained.predict_dates(&dates).unwrap();

    assert_eq!(points.len(), 3);
    assert_relative_eq!(points[2].point_estimate, 104.0, max_relative = 1e-4);
    assert_eq!(trained.changepoint_count(), 0);
}

#[test]
fn test_seasonality_selection() {
    let short = AdditiveModel::default().train(&linear_series(10)).unwrap();
    assert!(short.seasonalities().is_empty());

    let month = AdditiveModel::default().train(&linear_series(30)).unwrap();
    let names: Vec<&str> = month.seasonalities().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["weekly"]);

    let two_years = generate_sales_data(start(), 800, 100.0, 0.1, 11).unwrap();
    let long = AdditiveModel::default().train(&two_years).unwrap();
    assert_eq!(long.seasonalities().len(), 2);

    let forced = AdditiveModel::new(AdditiveConfig {
        weekly_seasonality: SeasonalityMode::Off,
        yearly_seasonality: SeasonalityMode::On,
        ..AdditiveConfig::default()
    })
    .unwrap()
    .train(&linear_series(30))
    .unwrap();
    let names: Vec<&str> = forced.seasonalities().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["yearly"]);
}

#[test]
fn test_changepoints_stay_in_range() {
    let trained = AdditiveModel::default().train(&linear_series(100)).unwrap();
    assert_eq!(trained.changepoint_count(), 25);

    let few = AdditiveModel::default().train(&linear_series(10)).unwrap();
    // floor(0.8 * 10) - 1
    assert_eq!(few.changepoint_count(), 7);
}

#[test]
fn test_weekly_pattern_is_learned() {
    let data = generate_sales_data(start(), 84, 1000.0, 0.0, 1).unwrap();
    let trained = AdditiveModel::default().train(&data).unwrap();
    let dates = trained.make_future_dates(7).unwrap();
    let points = trained.predict_dates(&dates).unwrap();

    // 2024-03-30 and 2024-03-31 are a weekend, 2024-03-27 a Wednesday
    let saturday = points.iter().find(|p| p.date.to_string() == "2024-03-30").unwrap();
    let wednesday = points.iter().find(|p| p.date.to_string() == "2024-03-27").unwrap();
    assert!(saturday.point_estimate > wednesday.point_estimate + 100.0);
}

#[test]
fn test_invalid_config() {
    let bad_width = AdditiveModel::new(AdditiveConfig {
        interval_width: 1.5,
        ..AdditiveConfig::default()
    });
    assert!(matches!(bad_width, Err(ForecastError::InvalidParameter(_))));

    let bad_range = AdditiveModel::new(AdditiveConfig {
        changepoint_range: 0.0,
        ..AdditiveConfig::default()
    });
    assert!(bad_range.is_err());

    let bad_prior = AdditiveModel::new(AdditiveConfig {
        seasonality_prior_scale: -1.0,
        ..AdditiveConfig::default()
    });
    assert!(bad_prior.is_err());
}

#[test]
fn test_model_names() {
    let model = AdditiveModel::default();
    let trained = model.train(&linear_series(5)).unwrap();
    assert_eq!(ForecastModel::name(&model), TrainedForecastModel::name(&trained));
    assert!(model.name().starts_with("Additive"));
}
