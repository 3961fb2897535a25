use serde::Serialize;
use tracing::debug;

use super::{EvalError, check_aligned, check_prediction_count};
use crate::dataset::{FeatureTable, SplitOptions, train_test_split};
use crate::ml::Regressor;
use crate::ml::metrics::{mean_absolute_error, r2_score, root_mean_squared_error};

/// Outcome of one regressor evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionReport {
    /// Row indices of the test subset, in prediction order.
    pub test_indices: Vec<usize>,
    pub truth: Vec<f64>,
    pub predictions: Vec<f64>,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// Split `(x, y)`, fit `regressor` on the train subset and score it on the test subset.
///
/// `options.stratify` is ignored: continuous targets have no classes.
pub fn evaluate_regression<R>(
    x: &FeatureTable,
    y: &[f64],
    regressor: &mut R,
    options: &SplitOptions,
) -> Result<RegressionReport, EvalError>
where
    R: Regressor + ?Sized,
{
    check_aligned(x.len(), y.len())?;
    if let Some(row) = y.iter().position(|v| !v.is_finite()) {
        return Err(EvalError::NonFiniteTarget(row));
    }

    let split = train_test_split(x.len(), options)?;
    let x_train = x.select(&split.train);
    let x_test = x.select(&split.test);
    let (y_train, y_test) = split.partition(y);
    debug!(
        estimator = regressor.name(),
        train = y_train.len(),
        test = y_test.len(),
        "Evaluating regressor"
    );

    regressor.fit(&x_train, &y_train)?;
    let predictions = regressor.predict(&x_test)?;
    check_prediction_count(y_test.len(), predictions.len())?;

    let rmse = root_mean_squared_error(&y_test, &predictions);
    let mae = mean_absolute_error(&y_test, &predictions);
    let r2 = r2_score(&y_test, &predictions);
    debug!(rmse, mae, r2, "Regressor scored");

    Ok(RegressionReport {
        test_indices: split.test,
        truth: y_test,
        predictions,
        rmse,
        mae,
        r2,
    })
}
