// ============================================================
// Layer 5 — Evaluation Metrics
// ============================================================
// Scores a set of predictions against the true labels:
//
//   accuracy_score   — fraction of rows predicted correctly
//   confusion_matrix — counts[actual][predicted]
//   ClassificationReport
//       per class:  precision = TP / (TP + FP)
//                   recall    = TP / (TP + FN)
//                   f1        = 2·P·R / (P + R)
//                   support   = rows whose true label is the class
//       overall:    accuracy, macro average (plain mean over
//                   classes), weighted average (by support)
//
// A zero denominator yields 0 rather than NaN.
//
// The report prints as the familiar fixed-width table:
//
//               precision    recall  f1-score   support
//
//    malignant       0.93      0.93      0.93        43
//       benign       0.96      0.96      0.96        71
//
//     accuracy                           0.95       114
//    macro avg       0.94      0.94      0.94       114
// weighted avg       0.95      0.95      0.95       114

use anyhow::{ensure, Result};
use std::fmt;

fn check_lengths(y_true: &[usize], y_pred: &[usize]) -> Result<()> {
    ensure!(!y_true.is_empty(), "Cannot score an empty set of predictions");
    ensure!(
        y_true.len() == y_pred.len(),
        "Got {} true labels but {} predictions",
        y_true.len(),
        y_pred.len()
    );
    Ok(())
}

/// Fraction of positions where the prediction equals the truth, in [0, 1].
pub fn accuracy_score(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// `n_classes × n_classes` counts; rows are actual classes, columns are
/// predicted classes.
pub fn confusion_matrix(
    y_true:    &[usize],
    y_pred:    &[usize],
    n_classes: usize,
) -> Result<Vec<Vec<usize>>> {
    check_lengths(y_true, y_pred)?;
    let mut matrix = vec![vec![0usize; n_classes]; n_classes];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        ensure!(
            t < n_classes && p < n_classes,
            "Label pair ({}, {}) is out of range for {} classes",
            t,
            p,
            n_classes
        );
        matrix[t][p] += 1;
    }
    Ok(matrix)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 { numerator / denominator } else { 0.0 }
}

/// Precision / recall / F1 / support for one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label:     String,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

/// Averaged precision / recall / F1 over all classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes:      Vec<ClassMetrics>,
    pub accuracy:     f64,
    pub macro_avg:    AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub total:        usize,
}

impl ClassificationReport {
    /// Build the report; `target_names[c]` labels class `c`.
    pub fn new(y_true: &[usize], y_pred: &[usize], target_names: &[String]) -> Result<Self> {
        let n_classes = target_names.len();
        let matrix    = confusion_matrix(y_true, y_pred, n_classes)?;
        let total     = y_true.len();

        let classes: Vec<ClassMetrics> = (0..n_classes)
            .map(|c| {
                let tp        = matrix[c][c] as f64;
                let actual    = matrix[c].iter().sum::<usize>();
                let predicted = matrix.iter().map(|row| row[c]).sum::<usize>();

                let precision = ratio(tp, predicted as f64);
                let recall    = ratio(tp, actual as f64);
                let f1        = ratio(2.0 * precision * recall, precision + recall);

                ClassMetrics {
                    label: target_names[c].clone(),
                    precision,
                    recall,
                    f1,
                    support: actual,
                }
            })
            .collect();

        let correct: usize = (0..n_classes).map(|c| matrix[c][c]).sum();
        let accuracy       = correct as f64 / total as f64;

        let n = n_classes.max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|m| m.precision).sum::<f64>() / n,
            recall:    classes.iter().map(|m| m.recall).sum::<f64>() / n,
            f1:        classes.iter().map(|m| m.f1).sum::<f64>() / n,
        };

        let weight = |m: &ClassMetrics| m.support as f64 / total as f64;
        let weighted_avg = AverageMetrics {
            precision: classes.iter().map(|m| m.precision * weight(m)).sum(),
            recall:    classes.iter().map(|m| m.recall * weight(m)).sum(),
            f1:        classes.iter().map(|m| m.f1 * weight(m)).sum(),
        };

        Ok(Self { classes, accuracy, macro_avg, weighted_avg, total })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WEIGHTED: &str = "weighted avg";
        let width = self
            .classes
            .iter()
            .map(|m| m.label.len())
            .max()
            .unwrap_or(0)
            .max(WEIGHTED.len());

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        for m in &self.classes {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), (WEIGHTED, &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.total
            )?;
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["malignant".to_string(), "benign".to_string()]
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_accuracy_in_unit_range() {
        assert!(close(accuracy_score(&[0, 1, 1, 0], &[0, 1, 0, 0]).unwrap(), 0.75));
        assert!(close(accuracy_score(&[1, 1], &[1, 1]).unwrap(), 1.0));
        assert!(close(accuracy_score(&[1, 1], &[0, 0]).unwrap(), 0.0));
    }

    #[test]
    fn test_accuracy_rejects_bad_input() {
        assert!(accuracy_score(&[], &[]).is_err());
        assert!(accuracy_score(&[0, 1], &[0]).is_err());
    }

    #[test]
    fn test_confusion_matrix_layout() {
        // actual:    0 0 0 1 1
        // predicted: 0 1 0 1 0
        let m = confusion_matrix(&[0, 0, 0, 1, 1], &[0, 1, 0, 1, 0], 2).unwrap();
        assert_eq!(m, vec![vec![2, 1], vec![1, 1]]);
        assert_eq!(m.iter().flatten().sum::<usize>(), 5);
    }

    #[test]
    fn test_confusion_matrix_rejects_out_of_range_label() {
        assert!(confusion_matrix(&[0, 2], &[0, 1], 2).is_err());
    }

    #[test]
    fn test_report_per_class_values() {
        let y_true = [0, 0, 0, 1, 1, 1, 1, 1];
        let y_pred = [0, 0, 1, 1, 1, 1, 1, 0];
        let report = ClassificationReport::new(&y_true, &y_pred, &names()).unwrap();

        let malignant = &report.classes[0];
        assert!(close(malignant.precision, 2.0 / 3.0));
        assert!(close(malignant.recall,    2.0 / 3.0));
        assert_eq!(malignant.support, 3);

        let benign = &report.classes[1];
        assert!(close(benign.precision, 0.8));
        assert!(close(benign.recall,    0.8));
        assert!(close(benign.f1,        0.8));

        assert!(close(report.accuracy, 0.75));
        assert!(close(report.macro_avg.recall, (2.0 / 3.0 + 0.8) / 2.0));
        assert!(close(report.weighted_avg.recall, report.accuracy));
    }

    #[test]
    fn test_report_zero_division_gives_zero() {
        // class 0 never predicted → precision 0, f1 0
        let report = ClassificationReport::new(&[0, 1, 1], &[1, 1, 1], &names()).unwrap();
        assert_eq!(report.classes[0].precision, 0.0);
        assert_eq!(report.classes[0].f1, 0.0);
    }

    #[test]
    fn test_report_renders_table() {
        let report = ClassificationReport::new(&[0, 1, 1, 1], &[0, 1, 1, 0], &names()).unwrap();
        let text   = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "              precision    recall  f1-score   support"
        );
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[2],
            "   malignant       0.50      1.00      0.67         1"
        );
        assert_eq!(
            lines[5],
            "    accuracy                           0.75         4"
        );
        assert!(lines[7].starts_with("weighted avg"));
    }
}
