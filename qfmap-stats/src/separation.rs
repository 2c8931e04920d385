//! Score Separation
//!
//! Compares background and anomaly score distributions the way the k-fold
//! tester reports them: the ROC-AUC is the probability that a randomly chosen
//! anomaly scores higher than a randomly chosen background event, with ties
//! counted as one half (Mann-Whitney U / (n_bkg · n_sig)).

use crate::summary::{SummaryStatistics, compute_summary};
use crate::StatsError;

/// ROC-AUC of `signal` scores against `background` scores.
pub fn roc_auc(background: &[f64], signal: &[f64]) -> Result<f64, StatsError> {
    if background.is_empty() {
        return Err(StatsError::EmptyScores("background"));
    }
    if signal.is_empty() {
        return Err(StatsError::EmptyScores("signal"));
    }

    // (score, is_signal), ranked jointly with average ranks for ties
    let mut pooled: Vec<(f64, bool)> = background
        .iter()
        .map(|&s| (s, false))
        .chain(signal.iter().map(|&s| (s, true)))
        .collect();
    pooled.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut signal_rank_sum = 0.0;
    let mut i = 0;
    while i < pooled.len() {
        let mut j = i;
        while j + 1 < pooled.len() && pooled[j + 1].0 == pooled[i].0 {
            j += 1;
        }
        // 1-based average rank of the tie block [i, j]
        let rank = (i + j) as f64 / 2.0 + 1.0;
        let tied_signal = pooled[i..=j].iter().filter(|(_, s)| *s).count();
        signal_rank_sum += rank * tied_signal as f64;
        i = j + 1;
    }

    let n_sig = signal.len() as f64;
    let n_bkg = background.len() as f64;
    let u = signal_rank_sum - n_sig * (n_sig + 1.0) / 2.0;
    Ok(u / (n_sig * n_bkg))
}

/// Per-fold AUCs and their spread
#[derive(Debug, Clone, PartialEq)]
pub struct SeparationSummary {
    /// AUC of each fold, in fold order
    pub fold_auc: Vec<f64>,
    /// Mean and spread across folds
    pub auc: SummaryStatistics,
}

/// Compute the AUC of each `(background, signal)` fold pair.
pub fn summarize_separation(
    background_folds: &[Vec<f64>],
    signal_folds: &[Vec<f64>],
) -> Result<SeparationSummary, StatsError> {
    let fold_auc = background_folds
        .iter()
        .zip(signal_folds)
        .map(|(bkg, sig)| roc_auc(bkg, sig))
        .collect::<Result<Vec<_>, _>>()?;
    let auc = compute_summary(&fold_auc);
    Ok(SeparationSummary { fold_auc, auc })
}
