//! Test-set Assembly and k-fold Partitioning
//!
//! ```text
//! background (test_bkg_path) ─┐
//!                             ├─▶ TestSet ─▶ shuffle(seed) ─▶ split by label
//! signal     (sig_path)    ───┘                                  │
//!                                                                ▼
//!                                          k signal folds + k background folds
//! ```

use crate::dataset::Dataset;
use crate::DataError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::ops::Range;

/// Label of anomalous (new-physics) events
pub const SIGNAL_LABEL: u8 = 1;
/// Label of background (QCD) events
pub const BACKGROUND_LABEL: u8 = 0;

/// Labelled test features
#[derive(Debug, Clone, PartialEq)]
pub struct TestSet {
    /// One row per event
    pub features: Dataset,
    /// `1` for signal, `0` for background, aligned with `features`
    pub labels: Vec<u8>,
}

impl TestSet {
    /// Number of events
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the set holds no events
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Count of events carrying `label`
    pub fn count_label(&self, label: u8) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    /// Permute features and labels together with a seeded RNG.
    pub fn shuffle(&mut self, seed: u64) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));

        self.features = self
            .features
            .select_rows(self.features.name().to_string(), &order);
        self.labels = order.iter().map(|&i| self.labels[i]).collect();
    }

    fn rows_with_label(&self, label: u8) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Take `per_class` events from each source and stack them, background first.
pub fn assemble_test_set(
    signal: &Dataset,
    background: &Dataset,
    per_class: usize,
) -> Result<TestSet, DataError> {
    let bkg = background.head(per_class)?;
    let sig = signal.head(per_class)?;
    let features = bkg.concat("test", &sig)?;

    let mut labels = vec![BACKGROUND_LABEL; per_class];
    labels.extend(std::iter::repeat(SIGNAL_LABEL).take(per_class));

    tracing::debug!(
        events = labels.len(),
        features = features.cols(),
        "assembled test set"
    );
    Ok(TestSet { features, labels })
}

/// Split `n` items into `k` contiguous ranges whose sizes differ by at most
/// one; the first `n % k` ranges get the extra item.
pub fn split_even(n: usize, k: usize) -> Vec<Range<usize>> {
    if k == 0 {
        return Vec::new();
    }
    let base = n / k;
    let extra = n % k;
    let mut start = 0;
    (0..k)
        .map(|i| {
            let len = base + usize::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Per-class folds of a test set
#[derive(Debug, Clone, PartialEq)]
pub struct FoldPartition {
    /// Signal folds in order
    pub signal: Vec<Dataset>,
    /// Background folds in order
    pub background: Vec<Dataset>,
}

impl FoldPartition {
    /// Number of folds per class
    pub fn k(&self) -> usize {
        self.signal.len()
    }
}

/// Stratified split: the rows of each class, in their current order, are cut
/// into `k` folds.
pub fn kfold_partition(test: &TestSet, k: usize) -> Result<FoldPartition, DataError> {
    let sig_rows = test.rows_with_label(SIGNAL_LABEL);
    let bkg_rows = test.rows_with_label(BACKGROUND_LABEL);
    let smallest = sig_rows.len().min(bkg_rows.len());
    if k == 0 || k > smallest {
        return Err(DataError::InvalidFolds {
            folds: k,
            rows: smallest,
        });
    }

    let cut = |rows: &[usize], tag: &str| -> Vec<Dataset> {
        split_even(rows.len(), k)
            .into_iter()
            .enumerate()
            .map(|(i, range)| {
                test.features
                    .select_rows(format!("{}_fold{}", tag, i), &rows[range])
            })
            .collect()
    };

    Ok(FoldPartition {
        signal: cut(&sig_rows, "sig"),
        background: cut(&bkg_rows, "bkg"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, values: &[f64]) -> Dataset {
        Dataset::new(name, values.len(), 1, values.to_vec()).unwrap()
    }

    fn small_test_set() -> TestSet {
        let sig = column("sig", &[10.0, 11.0, 12.0, 13.0, 14.0]);
        let bkg = column("bkg", &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assemble_test_set(&sig, &bkg, 5).unwrap()
    }

    #[test]
    fn test_split_even_matches_array_split() {
        let sizes: Vec<usize> = split_even(10, 3).iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        let ranges = split_even(7, 7);
        assert!(ranges.iter().all(|r| r.len() == 1));
        assert_eq!(split_even(2, 4).iter().map(|r| r.len()).sum::<usize>(), 2);
        assert!(split_even(5, 0).is_empty());
    }

    #[test]
    fn test_split_even_covers_every_index_once() {
        for n in 0..30 {
            for k in 1..8 {
                let ranges = split_even(n, k);
                let covered: Vec<usize> = ranges.iter().flat_map(|r| r.clone()).collect();
                assert_eq!(covered, (0..n).collect::<Vec<_>>());
                let max = ranges.iter().map(|r| r.len()).max().unwrap();
                let min = ranges.iter().map(|r| r.len()).min().unwrap();
                assert!(max - min <= 1);
            }
        }
    }

    #[test]
    fn test_assemble_labels_and_limits() {
        let test = small_test_set();
        assert_eq!(test.len(), 10);
        assert_eq!(test.count_label(SIGNAL_LABEL), 5);
        assert_eq!(test.labels[0], BACKGROUND_LABEL);

        let sig = column("sig", &[1.0, 2.0]);
        let bkg = column("bkg", &[1.0, 2.0, 3.0]);
        assert!(matches!(
            assemble_test_set(&sig, &bkg, 3),
            Err(DataError::NotEnoughRows { available: 2, .. })
        ));
    }

    #[test]
    fn test_shuffle_is_seeded_and_keeps_pairs() {
        let mut a = small_test_set();
        let mut b = small_test_set();
        a.shuffle(12345);
        b.shuffle(12345);
        assert_eq!(a, b);

        // Signal rows hold values >= 10, background rows < 10
        for (row, &label) in a.features.iter_rows().zip(&a.labels) {
            assert_eq!(row[0] >= 10.0, label == SIGNAL_LABEL);
        }
    }

    #[test]
    fn test_kfold_partition_is_stratified() {
        let mut test = small_test_set();
        test.shuffle(7);
        let folds = kfold_partition(&test, 2).unwrap();
        assert_eq!(folds.k(), 2);
        assert_eq!(folds.signal[0].rows(), 3);
        assert_eq!(folds.signal[1].rows(), 2);
        assert!(folds
            .signal
            .iter()
            .flat_map(|d| d.values().to_vec())
            .all(|v| v >= 10.0));
        assert!(folds
            .background
            .iter()
            .flat_map(|d| d.values().to_vec())
            .all(|v| v < 10.0));

        let mut seen: Vec<f64> = folds
            .background
            .iter()
            .flat_map(|d| d.values().to_vec())
            .collect();
        seen.sort_by(|x, y| x.partial_cmp(y).unwrap());
        assert_eq!(seen, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_kfold_rejects_bad_k() {
        let test = small_test_set();
        assert!(matches!(
            kfold_partition(&test, 0),
            Err(DataError::InvalidFolds { folds: 0, .. })
        ));
        assert!(kfold_partition(&test, 6).is_err());
        assert!(kfold_partition(&test, 5).is_ok());
    }
}
