//! The evaluation pipeline: shuffle once, then cross-validate the forest on
//! the full dataset and on each stratum of a categorical feature.

use std::fmt;

use crate::config::PipelineConfig;
use crate::data::model::{Dataset, FeatureValue};
use crate::error::Result;
use crate::evaluation::{cross_validate, FoldScores, Scoring};
use crate::forest::Regressor;

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Which rows an evaluation runs on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Subset {
    All,
    FeatureEquals { column: usize, value: f64 },
}

impl Subset {
    pub fn select(&self, dataset: &Dataset) -> Result<Dataset> {
        match *self {
            Subset::All => Ok(dataset.clone()),
            Subset::FeatureEquals { column, value } => dataset.filter_by_feature(column, value),
        }
    }

    /// Human-readable label, using the column name when known.
    pub fn label(&self, feature_names: &[String]) -> String {
        match *self {
            Subset::All => "all rows".to_string(),
            Subset::FeatureEquals { column, value } => {
                let name = feature_names
                    .get(column)
                    .cloned()
                    .unwrap_or_else(|| format!("column {column}"));
                format!("{name} == {}", FeatureValue(value))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub subset: Subset,
    pub scoring: Scoring,
}

/// Ordered list of evaluations to run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationPlan {
    pub evaluations: Vec<Evaluation>,
}

impl EvaluationPlan {
    /// Full dataset under the default scoring, then every stratum value under
    /// every configured scoring (scoring-major order).
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut evaluations = vec![Evaluation {
            subset: Subset::All,
            scoring: Scoring::default(),
        }];
        if let Some(column) = config.stratify_column {
            for &scoring in &config.scorings {
                for &value in &config.stratify_values {
                    evaluations.push(Evaluation {
                        subset: Subset::FeatureEquals { column, value },
                        scoring,
                    });
                }
            }
        }
        EvaluationPlan { evaluations }
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub label: String,
    pub scoring: Scoring,
    /// Rows in the evaluated subset.
    pub n_rows: usize,
    pub outcome: std::result::Result<FoldScores, crate::error::EvalError>,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(scores) => write!(f, "{scores}"),
            Err(e) => write!(f, "error: {e}"),
        }
    }
}

impl EvaluationReport {
    /// One-line summary for the viewer and logs.
    pub fn summary(&self) -> String {
        match &self.outcome {
            Ok(scores) => format!(
                "{} ({} rows, {}): mean {:.4} ± {:.4}",
                self.label,
                self.n_rows,
                self.scoring,
                scores.mean(),
                scores.std()
            ),
            Err(e) => format!("{} ({} rows, {}): {e}", self.label, self.n_rows, self.scoring),
        }
    }
}

/// Run every evaluation of `plan`. A failing evaluation is reported and the
/// rest still run.
pub fn run_plan<M: Regressor>(
    plan: &EvaluationPlan,
    dataset: &Dataset,
    model: &M,
    n_splits: usize,
) -> Vec<EvaluationReport> {
    plan.evaluations
        .iter()
        .map(|evaluation| {
            let label = evaluation.subset.label(&dataset.feature_names);
            let (n_rows, outcome) = match evaluation.subset.select(dataset) {
                Ok(subset) => (
                    subset.len(),
                    cross_validate(
                        model,
                        subset.features.view(),
                        subset.targets.view(),
                        evaluation.scoring,
                        n_splits,
                    ),
                ),
                Err(e) => (0, Err(e)),
            };
            if let Err(e) = &outcome {
                log::warn!("Evaluation '{label}' ({}) failed: {e}", evaluation.scoring);
            }
            EvaluationReport {
                label,
                scoring: evaluation.scoring,
                n_rows,
                outcome,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pipeline entry-point
// ---------------------------------------------------------------------------

/// Result of a pipeline run: the shuffled data the plots show, plus reports.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub dataset: Dataset,
    pub reports: Vec<EvaluationReport>,
}

/// Shuffle with the configured seed and run the configured plan with the
/// configured forest.
pub fn run(config: &PipelineConfig, dataset: &Dataset) -> Result<PipelineOutput> {
    let shuffled = dataset.shuffled(config.shuffle_seed)?;
    let plan = EvaluationPlan::from_config(config);
    let model = config.forest.build();

    log::info!(
        "Evaluating {} trees over {} folds: {} evaluations on {} rows",
        model.n_estimators,
        config.n_splits,
        plan.len(),
        shuffled.len()
    );

    let reports = run_plan(&plan, &shuffled, &model, config.n_splits);
    for report in &reports {
        log::info!("{}", report.summary());
    }

    Ok(PipelineOutput {
        dataset: shuffled,
        reports,
    })
}
