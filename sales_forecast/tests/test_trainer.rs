use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use sales_forecast::artifact::ModelArtifact;
use sales_forecast::data::ColumnMapping;
use sales_forecast::models::additive::{AdditiveModel, TrainedAdditiveModel};
use sales_forecast::service::ForecastService;
use sales_forecast::{ForecastError, TrainedForecastModel, Trainer};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_sales_csv(path: &Path, days: i64) {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let mut file = fs::File::create(path).unwrap();
    writeln!(file, "Transaction ID,Date,Product Category,Total Amount").unwrap();
    for i in 0..days {
        let date = start + Duration::days(i);
        writeln!(file, "{},{},Beauty,{}", 2 * i + 1, date, 100 + 3 * i).unwrap();
        writeln!(file, "{},{},Clothing,{}", 2 * i + 2, date, 50 + (i % 7) * 10).unwrap();
    }
}

#[test]
fn test_train_saves_loadable_artifact() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("sales.csv");
    let model_path = dir.path().join("models").join("sales_model.json");
    write_sales_csv(&csv_path, 45);

    let trainer = Trainer::new(AdditiveModel::default(), &model_path);
    let report = trainer.train(&csv_path).unwrap();

    assert_eq!(report.observations, 45);
    assert_eq!(report.first_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    assert_eq!(report.last_date, NaiveDate::from_ymd_opt(2023, 2, 14).unwrap());
    assert_eq!(report.artifact_path, model_path);
    assert!(ModelArtifact::exists(&model_path));

    let loaded: TrainedAdditiveModel = ModelArtifact::load(&model_path).unwrap();
    assert_eq!(loaded.history().len(), 45);
    assert_eq!(loaded.history().amounts()[0], 100.0 + 50.0);

    let forecast = ForecastService::new(loaded).predict(10).unwrap();
    assert_eq!(forecast.len(), 55);
}

#[test]
fn test_loaded_model_predicts_like_trained_model() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("sales.csv");
    let model_path = dir.path().join("model.json");
    write_sales_csv(&csv_path, 30);

    Trainer::new(AdditiveModel::default(), &model_path)
        .train(&csv_path)
        .unwrap();
    let loaded: TrainedAdditiveModel = ModelArtifact::load(&model_path).unwrap();

    let table = sales_forecast::DataLoader::from_csv(&csv_path).unwrap();
    let fresh: ForecastService<TrainedAdditiveModel> =
        ForecastService::fit(&AdditiveModel::default(), &table.daily_series()).unwrap();

    let expected = fresh.predict(7).unwrap();
    let actual = ForecastService::new(loaded).predict(7).unwrap();
    for (a, e) in actual.iter().zip(&expected) {
        assert_eq!(a.date, e.date);
        assert_relative_eq!(a.point_estimate, e.point_estimate, max_relative = 1e-9);
        assert_relative_eq!(a.upper_bound, e.upper_bound, max_relative = 1e-9);
    }
}

#[test]
fn test_single_date_is_insufficient_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("one_day.csv");
    let model_path = dir.path().join("model.json");
    write_sales_csv(&csv_path, 1);

    let result = Trainer::new(AdditiveModel::default(), &model_path).train(&csv_path);

    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData { needed: 2, got: 1 })
    ));
    assert!(!model_path.exists());
}

#[test]
fn test_failed_training_keeps_previous_artifact() {
    let dir = tempdir().unwrap();
    let good_csv = dir.path().join("good.csv");
    let bad_csv = dir.path().join("bad.csv");
    let model_path = dir.path().join("model.json");
    write_sales_csv(&good_csv, 20);
    fs::write(&bad_csv, "Date,Amount\n2023-01-01,5\n").unwrap();

    let trainer = Trainer::new(AdditiveModel::default(), &model_path);
    trainer.train(&good_csv).unwrap();
    let before = fs::read(&model_path).unwrap();

    assert!(matches!(
        trainer.train(&bad_csv),
        Err(ForecastError::DataFormat(_))
    ));
    assert_eq!(fs::read(&model_path).unwrap(), before);
}

#[test]
fn test_retraining_overwrites_artifact() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("sales.csv");
    let model_path = dir.path().join("model.json");
    let trainer = Trainer::new(AdditiveModel::default(), &model_path);

    write_sales_csv(&csv_path, 10);
    trainer.train(&csv_path).unwrap();
    write_sales_csv(&csv_path, 20);
    trainer.train(&csv_path).unwrap();

    let loaded: TrainedAdditiveModel = ModelArtifact::load(&model_path).unwrap();
    assert_eq!(loaded.history().len(), 20);
}

#[test]
fn test_trainer_with_custom_columns() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("sales.csv");
    let model_path = dir.path().join("model.json");
    fs::write(&csv_path, "day,revenue\n2023-01-01,10\n2023-01-02,12\n2023-01-03,11\n").unwrap();

    let columns = ColumnMapping {
        date: "day".to_string(),
        amount: "revenue".to_string(),
        ..ColumnMapping::default()
    };
    let report = Trainer::new(AdditiveModel::default(), &model_path)
        .with_columns(columns)
        .train(&csv_path)
        .unwrap();
    assert_eq!(report.observations, 3);
}

#[test]
fn test_missing_artifact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does_not_exist.json");

    assert!(!ModelArtifact::exists(&path));
    let result: Result<TrainedAdditiveModel, _> = ModelArtifact::load(&path);
    match result {
        Err(err @ ForecastError::ModelArtifactMissing { .. }) => {
            assert!(err.to_string().contains("sales_forecast train"));
        }
        other => panic!("expected ModelArtifactMissing, got {:?}", other),
    }
}

#[test]
fn test_corrupted_artifact_is_reported_as_missing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");

    fs::write(&path, "{ not json").unwrap();
    let result: Result<TrainedAdditiveModel, _> = ModelArtifact::load(&path);
    assert!(matches!(result, Err(ForecastError::ModelArtifactMissing { .. })));

    fs::write(&path, r#"{"format_version": 1, "crate_version": "0.1.0", "model": {}}"#).unwrap();
    let result: Result<TrainedAdditiveModel, _> = ModelArtifact::load(&path);
    assert!(matches!(result, Err(ForecastError::ModelArtifactMissing { .. })));
}

fn train_artifact(dir: &Path) -> std::path::PathBuf {
    let csv_path = dir.join("sales.csv");
    let model_path = dir.join("models").join("model.json");
    write_sales_csv(&csv_path, 30);
    Trainer::new(AdditiveModel::default(), &model_path)
        .train(&csv_path)
        .unwrap();
    model_path
}

fn edit_artifact(path: &Path, edit: impl FnOnce(&mut serde_json::Value)) {
    let mut document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    edit(&mut document["model"]);
    fs::write(path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
}

#[test]
fn test_artifact_with_invalid_interval_width_is_rejected() {
    let dir = tempdir().unwrap();
    let model_path = train_artifact(dir.path());

    // Untouched artifacts still load and predict
    let loaded: TrainedAdditiveModel = ModelArtifact::load(&model_path).unwrap();
    assert!(ForecastService::new(loaded).predict(5).is_ok());

    for width in [1.5, 0.0, -0.2] {
        edit_artifact(&model_path, |model| {
            model["config"]["interval_width"] = serde_json::json!(width);
        });
        let result: Result<TrainedAdditiveModel, _> = ModelArtifact::load(&model_path);
        match result {
            Err(ForecastError::ModelArtifactMissing { path, reason }) => {
                assert_eq!(path, model_path.display().to_string());
                assert!(reason.contains("Interval width"), "{}", reason);
            }
            other => panic!("expected ModelArtifactMissing, got {:?}", other.map(|_| ())),
        }
    }
}

#[test]
fn test_artifact_with_wrong_coefficient_count_is_rejected() {
    let dir = tempdir().unwrap();
    let model_path = train_artifact(dir.path());

    edit_artifact(&model_path, |model| {
        model["fit"]["coefficients"].as_array_mut().unwrap().pop();
    });
    let result: Result<TrainedAdditiveModel, _> = ModelArtifact::load(&model_path);
    match result {
        Err(ForecastError::ModelArtifactMissing { reason, .. }) => {
            assert!(reason.contains("coefficients"), "{}", reason);
        }
        other => panic!("expected ModelArtifactMissing, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_artifact_with_negative_sigma_is_rejected() {
    let dir = tempdir().unwrap();
    let model_path = train_artifact(dir.path());

    edit_artifact(&model_path, |model| {
        model["sigma"] = serde_json::json!(-1.0);
    });
    let result: Result<TrainedAdditiveModel, _> = ModelArtifact::load(&model_path);
    assert!(matches!(result, Err(ForecastError::ModelArtifactMissing { .. })));
}

#[test]
fn test_save_replaces_artifact_without_leftovers() {
    let dir = tempdir().unwrap();
    let model_dir = dir.path().join("models");
    let path = model_dir.join("model.json");

    ModelArtifact::save(&path, &vec![1.0, 2.0]).unwrap();
    ModelArtifact::save(&path, &vec![3.0]).unwrap();

    let names: Vec<String> = fs::read_dir(&model_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["model.json".to_string()]);

    let loaded: Vec<f64> = ModelArtifact::load(&path).unwrap();
    assert_eq!(loaded, vec![3.0]);
}

#[test]
fn test_unsupported_artifact_version() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    ModelArtifact::save(&path, &vec![1.0, 2.0]).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, text.replace("\"format_version\": 1", "\"format_version\": 99")).unwrap();

    let result: Result<Vec<f64>, _> = ModelArtifact::load(&path);
    match result {
        Err(ForecastError::ModelArtifactMissing { reason, .. }) => {
            assert!(reason.contains("99"));
        }
        other => panic!("expected ModelArtifactMissing, got {:?}", other),
    }
}
