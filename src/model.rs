use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::features::{FEATURE_COUNT, FeatureRow, Standardizer};

const PROB_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            epochs: 400,
            l2: 1e-4,
        }
    }
}

/// Logistic regression over `FeatureRow`, predicting P(home win).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: [f64; FEATURE_COUNT],
    pub bias: f64,
    pub standardizer: Standardizer,
}

impl LogisticModel {
    /// Batch gradient descent on L2-regularized log loss. Deterministic for
    /// identical inputs (no random initialization).
    pub fn fit(rows: &[FeatureRow], labels: &[bool], cfg: TrainConfig) -> Result<Self> {
        if rows.is_empty() {
            return Err(anyhow!("no training rows"));
        }
        if rows.len() != labels.len() {
            return Err(anyhow!(
                "rows/labels length mismatch ({} vs {})",
                rows.len(),
                labels.len()
            ));
        }

        let standardizer = Standardizer::fit(rows);
        let inputs: Vec<[f64; FEATURE_COUNT]> =
            rows.iter().map(|row| standardizer.apply(row)).collect();
        let targets: Vec<f64> = labels.iter().map(|&y| if y { 1.0 } else { 0.0 }).collect();

        let n = inputs.len() as f64;
        let mut weights = [0.0; FEATURE_COUNT];
        let mut bias = 0.0;

        for _ in 0..cfg.epochs {
            let mut grad_w = [0.0; FEATURE_COUNT];
            let mut grad_b = 0.0;

            for (x, y) in inputs.iter().zip(&targets) {
                let z = dot(&weights, x) + bias;
                let err = sigmoid(z) - y;
                for (g, xi) in grad_w.iter_mut().zip(x) {
                    *g += err * xi;
                }
                grad_b += err;
            }

            for (w, g) in weights.iter_mut().zip(grad_w) {
                *w -= cfg.learning_rate * (g / n + cfg.l2 * *w);
            }
            bias -= cfg.learning_rate * grad_b / n;
        }

        Ok(Self {
            weights,
            bias,
            standardizer,
        })
    }

    /// P(home win), kept strictly inside (0, 1) even where the sigmoid
    /// saturates in f64.
    pub fn predict_proba(&self, row: &FeatureRow) -> f64 {
        let x = self.standardizer.apply(row);
        sigmoid(dot(&self.weights, &x) + self.bias).clamp(PROB_FLOOR, 1.0 - PROB_FLOOR)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        let json = serde_json::to_string_pretty(self).context("serialize model")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("rename into {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read model file {}", path.display()))?;
        serde_json::from_str(&raw).context("invalid model json")
    }
}

fn dot(w: &[f64; FEATURE_COUNT], x: &[f64; FEATURE_COUNT]) -> f64 {
    w.iter().zip(x).map(|(a, b)| a * b).sum()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
