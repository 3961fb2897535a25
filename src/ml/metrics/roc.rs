use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RocError {
    #[error("Mismatched label/score lengths: {labels} labels, {scores} scores")]
    LengthMismatch { labels: usize, scores: usize },
    #[error("ROC needs both classes, found {positives} positives and {negatives} negatives")]
    MissingClass { positives: usize, negatives: usize },
    #[error("Non-finite score at position {0}")]
    NonFiniteScore(usize),
}

/// One operating point of a ROC curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
    /// Scores `>= threshold` are called positive. The first point uses `+inf`.
    pub threshold: f64,
}

/// ROC curve with points ordered by decreasing threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
}

impl RocCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Compute the ROC curve of `scores` against `truth == pos_label`.
///
/// One point is emitted per distinct score; points collinear with both
/// neighbours are dropped since they do not change the curve shape. A leading
/// `(0, 0, +inf)` point anchors the curve at the origin.
pub fn roc_curve<L: PartialEq>(
    truth: &[L],
    scores: &[f64],
    pos_label: &L,
) -> Result<RocCurve, RocError> {
    if truth.len() != scores.len() {
        return Err(RocError::LengthMismatch {
            labels: truth.len(),
            scores: scores.len(),
        });
    }
    if let Some(pos) = scores.iter().position(|s| !s.is_finite()) {
        return Err(RocError::NonFiniteScore(pos));
    }
    let positive: Vec<bool> = truth.iter().map(|label| label == pos_label).collect();
    let positives = positive.iter().filter(|&&p| p).count();
    let negatives = positive.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(RocError::MissingClass {
            positives,
            negatives,
        });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut tps = Vec::new();
    let mut fps = Vec::new();
    let mut thresholds = Vec::new();
    let (mut tp, mut fp) = (0usize, 0usize);
    for (k, &idx) in order.iter().enumerate() {
        if positive[idx] {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_score = order
            .get(k + 1)
            .is_none_or(|&next| scores[next] != scores[idx]);
        if last_of_score {
            tps.push(tp);
            fps.push(fp);
            thresholds.push(scores[idx]);
        }
    }

    let mut points = Vec::with_capacity(thresholds.len() + 1);
    points.push(RocPoint {
        fpr: 0.0,
        tpr: 0.0,
        threshold: f64::INFINITY,
    });
    let last = thresholds.len() - 1;
    for i in 0..thresholds.len() {
        if i != 0 && i != last {
            let fp_bend = fps[i + 1] + fps[i - 1] != 2 * fps[i];
            let tp_bend = tps[i + 1] + tps[i - 1] != 2 * tps[i];
            if !fp_bend && !tp_bend {
                continue;
            }
        }
        points.push(RocPoint {
            fpr: fps[i] as f64 / negatives as f64,
            tpr: tps[i] as f64 / positives as f64,
            threshold: thresholds[i],
        });
    }
    Ok(RocCurve { points })
}

/// Area under a ROC curve by the trapezoidal rule.
pub fn roc_auc(curve: &RocCurve) -> f64 {
    curve
        .points
        .windows(2)
        .map(|pair| (pair[1].fpr - pair[0].fpr) * (pair[1].tpr + pair[0].tpr) / 2.0)
        .sum()
}
