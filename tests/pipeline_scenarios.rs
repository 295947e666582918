//! End-to-end: shuffle, stratify and cross-validate through the public API.

use forest_lens::config::{ForestConfig, PipelineConfig};
use forest_lens::pipeline::{self, EvaluationPlan};
use forest_lens::{cross_validate, filter_by_feature, shuffle, Dataset, RandomForestRegressor, Scoring};
use ndarray::{array, Array1, Array2};

/// 120 rows: column 0 drives the price, column 1 is a 0/1 river flag.
fn housing_like() -> Dataset {
    let x = Array2::from_shape_fn((120, 3), |(r, c)| match c {
        0 => 4.0 + (r % 40) as f64 * 0.1,
        1 => f64::from(r % 6 == 0),
        _ => ((r * 13) % 17) as f64,
    });
    let y: Array1<f64> = x
        .outer_iter()
        .map(|row| 9.0 * row[0] + 5.0 * row[1] - 20.0)
        .collect();
    Dataset::new(x, y, vec!["RM".into(), "CHAS".into(), "TAX".into()], "PRICE").unwrap()
}

#[test]
fn shuffled_then_filtered_scenario() {
    let features = array![[0.0, 1.0], [1.0, 1.0], [0.0, 2.0], [1.0, 2.0]];
    let targets = array![10.0, 20.0, 30.0, 40.0];

    let first = shuffle(features.view(), targets.view(), 0).unwrap();
    let second = shuffle(features.view(), targets.view(), 0).unwrap();
    assert_eq!(first, second);

    let (x0, y0) = filter_by_feature(features.view(), targets.view(), 0, 0.0).unwrap();
    assert_eq!(x0, array![[0.0, 1.0], [0.0, 2.0]]);
    assert_eq!(y0, array![10.0, 30.0]);
    let (x1, y1) = filter_by_feature(features.view(), targets.view(), 0, 1.0).unwrap();
    assert_eq!(x1, array![[1.0, 1.0], [1.0, 2.0]]);
    assert_eq!(y1, array![20.0, 40.0]);
}

#[test]
fn forest_explains_a_learnable_target() {
    let ds = housing_like().shuffled(0).unwrap();
    let model = RandomForestRegressor::new(20).with_random_state(1);
    let scores = cross_validate(&model, ds.features.view(), ds.targets.view(), Scoring::R2, 5).unwrap();
    assert_eq!(scores.len(), 5);
    assert!(scores.mean() > 0.9, "{scores}");
}

#[test]
fn full_pipeline_over_strata() {
    let ds = housing_like();
    let config = PipelineConfig {
        stratify_column: Some(1),
        forest: ForestConfig {
            n_estimators: 10,
            ..ForestConfig::default()
        },
        ..PipelineConfig::default()
    };

    let output = pipeline::run(&config, &ds).unwrap();
    assert_eq!(output.reports.len(), EvaluationPlan::from_config(&config).len());

    let rows: Vec<usize> = output.reports.iter().map(|r| r.n_rows).collect();
    assert_eq!(rows, vec![120, 100, 20, 100, 20]);

    for report in &output.reports[3..] {
        let scores = report.outcome.as_ref().unwrap();
        assert!(scores.0.iter().all(|&s| s <= 0.0));
    }
}
