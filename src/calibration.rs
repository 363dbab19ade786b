//! Evaluation of binary home-win probabilities against observed outcomes.

#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    pub samples: usize,
    pub brier: f64,
    pub log_loss: f64,
    pub accuracy: f64,
}

impl Metrics {
    pub fn empty() -> Self {
        Self {
            samples: 0,
            brier: 0.0,
            log_loss: 0.0,
            accuracy: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CalibrationBin {
    pub bucket_start: f64,
    pub bucket_end: f64,
    pub count: usize,
    pub avg_pred: f64,
    pub actual_rate: f64,
}

/// `predictions[i]` is P(home win); `outcomes[i]` is whether the home side won.
pub fn evaluate_probs(predictions: &[f64], outcomes: &[bool]) -> Metrics {
    if predictions.is_empty() || predictions.len() != outcomes.len() {
        return Metrics::empty();
    }

    let mut brier_sum = 0.0_f64;
    let mut log_loss_sum = 0.0_f64;
    let mut correct = 0usize;

    for (&p, &home_win) in predictions.iter().zip(outcomes) {
        let y = if home_win { 1.0 } else { 0.0 };
        brier_sum += (p - y).powi(2);

        let actual_prob = if home_win { p } else { 1.0 - p }.clamp(1e-12, 1.0);
        log_loss_sum += -actual_prob.ln();

        if (p >= 0.5) == home_win {
            correct += 1;
        }
    }

    let n = predictions.len() as f64;
    Metrics {
        samples: predictions.len(),
        brier: brier_sum / n,
        log_loss: log_loss_sum / n,
        accuracy: correct as f64 / n,
    }
}

pub fn calibration_bins(
    predictions: &[f64],
    outcomes: &[bool],
    bins: usize,
) -> Vec<CalibrationBin> {
    if predictions.len() != outcomes.len() {
        return Vec::new();
    }
    let bins = bins.max(2);
    let mut counts = vec![0usize; bins];
    let mut pred_sum = vec![0.0_f64; bins];
    let mut actual_sum = vec![0.0_f64; bins];

    for (&p, &home_win) in predictions.iter().zip(outcomes) {
        let p = p.clamp(0.0, 1.0);
        let idx = ((p * bins as f64).floor() as usize).min(bins - 1);
        counts[idx] += 1;
        pred_sum[idx] += p;
        if home_win {
            actual_sum[idx] += 1.0;
        }
    }

    let mut out = Vec::with_capacity(bins);
    for i in 0..bins {
        let count = counts[i];
        let (avg_pred, actual_rate) = if count > 0 {
            (pred_sum[i] / count as f64, actual_sum[i] / count as f64)
        } else {
            (0.0, 0.0)
        };
        out.push(CalibrationBin {
            bucket_start: i as f64 / bins as f64,
            bucket_end: (i + 1) as f64 / bins as f64,
            count,
            avg_pred,
            actual_rate,
        });
    }
    out
}

/// Count-weighted mean |avg_pred - actual_rate| over non-empty bins.
pub fn expected_calibration_error(bins: &[CalibrationBin]) -> f64 {
    let total: usize = bins.iter().map(|b| b.count).sum();
    if total == 0 {
        return 0.0;
    }
    bins.iter()
        .filter(|b| b.count > 0)
        .map(|b| (b.count as f64 / total as f64) * (b.avg_pred - b.actual_rate).abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions_have_zero_brier() {
        let preds = vec![1.0, 0.0, 1.0];
        let outcomes = vec![true, false, true];
        let m = evaluate_probs(&preds, &outcomes);
        assert_eq!(m.samples, 3);
        assert!(m.brier < 1e-12);
        assert!((m.accuracy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn coin_flip_brier_is_quarter() {
        let preds = vec![0.5; 100];
        let outcomes: Vec<bool> = (0..100).map(|i| i % 2 == 0).collect();
        let m = evaluate_probs(&preds, &outcomes);
        assert!((m.brier - 0.25).abs() < 1e-12);
    }

    #[test]
    fn log_loss_survives_certain_wrong_prediction() {
        let m = evaluate_probs(&[1.0], &[false]);
        assert!(m.log_loss.is_finite());
    }

    #[test]
    fn mismatched_lengths_yield_empty_metrics() {
        let m = evaluate_probs(&[0.5, 0.5], &[true]);
        assert_eq!(m.samples, 0);
    }

    #[test]
    fn mismatched_lengths_yield_no_bins() {
        let bins = calibration_bins(&[0.5, 0.5], &[true], 10);
        assert!(bins.is_empty());
        assert_eq!(expected_calibration_error(&bins), 0.0);
    }

    #[test]
    fn bins_partition_all_samples() {
        let preds = vec![0.05, 0.15, 0.55, 0.95, 0.95];
        let outcomes = vec![false, false, true, true, false];
        let bins = calibration_bins(&preds, &outcomes, 10);
        assert_eq!(bins.len(), 10);
        let total: usize = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, preds.len());
        assert_eq!(bins[9].count, 2);
        assert!((bins[9].actual_rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ece_zero_for_perfectly_calibrated_bins() {
        let preds = vec![0.25; 4];
        let outcomes = vec![true, false, false, false];
        let bins = calibration_bins(&preds, &outcomes, 4);
        assert!(expected_calibration_error(&bins) < 1e-12);
    }
}
