//! Held-out evaluation report

use serde::Serialize;
use std::fmt;

/// Precision, recall, F1 and support for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-class and aggregate scores over a test split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub support: usize,
}

impl ClassificationReport {
    /// Score predictions against expected class codes
    ///
    /// Rows cover every label in `labels` that occurs in either `expected`
    /// or `predicted`. Undefined ratios (zero denominators) score 0.
    pub fn compute(expected: &[usize], predicted: &[usize], labels: &[String]) -> Self {
        let n = labels.len();
        let mut true_pos = vec![0usize; n];
        let mut pred_count = vec![0usize; n];
        let mut support = vec![0usize; n];
        let mut correct = 0usize;

        for (&e, &p) in expected.iter().zip(predicted) {
            if e < n {
                support[e] += 1;
            }
            if p < n {
                pred_count[p] += 1;
            }
            if e == p {
                correct += 1;
                if e < n {
                    true_pos[e] += 1;
                }
            }
        }

        let classes: Vec<ClassMetrics> = (0..n)
            .filter(|&c| support[c] > 0 || pred_count[c] > 0)
            .map(|c| {
                let precision = ratio(true_pos[c], pred_count[c]);
                let recall = ratio(true_pos[c], support[c]);
                ClassMetrics {
                    label: labels[c].clone(),
                    precision,
                    recall,
                    f1: f1(precision, recall),
                    support: support[c],
                }
            })
            .collect();

        let total = expected.len().min(predicted.len());
        let total_support: usize = classes.iter().map(|m| m.support).sum();

        let macro_avg = average(&classes, |_| 1.0, classes.len() as f64);
        let weighted_avg = average(&classes, |m| m.support as f64, total_support as f64);

        Self {
            classes,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
            support: total,
        }
    }

    /// Metrics for one category, if it has a row
    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|m| m.label == label)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn average(classes: &[ClassMetrics], weight: impl Fn(&ClassMetrics) -> f64, total: f64) -> AverageMetrics {
    let mut avg = AverageMetrics { precision: 0.0, recall: 0.0, f1: 0.0 };
    if total == 0.0 {
        return avg;
    }
    for m in classes {
        let w = weight(m);
        avg.precision += m.precision * w;
        avg.recall += m.recall * w;
        avg.f1 += m.f1 * w;
    }
    avg.precision /= total;
    avg.recall /= total;
    avg.f1 /= total;
    avg
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|m| m.label.len())
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(0);

        writeln!(f, "{:>width$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for m in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>width$} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, self.support)?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        ["Change", "Incident", "Request"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_perfect_predictions() {
        let report = ClassificationReport::compute(&[0, 1, 2, 1], &[0, 1, 2, 1], &labels());

        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.macro_avg.f1, 1.0);
        assert_eq!(report.class("Incident").unwrap().support, 2);
    }

    #[test]
    fn test_mixed_predictions() {
        // Incident: tp 1, predicted 2, support 2
        let report = ClassificationReport::compute(&[1, 1, 2, 0], &[1, 2, 1, 0], &labels());

        let incident = report.class("Incident").unwrap();
        assert_eq!(incident.precision, 0.5);
        assert_eq!(incident.recall, 0.5);
        assert_eq!(incident.f1, 0.5);

        let request = report.class("Request").unwrap();
        assert_eq!(request.precision, 0.0);
        assert_eq!(request.f1, 0.0);

        assert_eq!(report.accuracy, 0.5);
        assert!((report.macro_avg.f1 - 0.5).abs() < 1e-12);
        // Weighted by support 1, 2, 1
        assert!((report.weighted_avg.recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unseen_classes_omitted() {
        let report = ClassificationReport::compute(&[0, 0], &[0, 0], &labels());
        assert_eq!(report.classes.len(), 1);
        assert!(report.class("Request").is_none());
    }

    #[test]
    fn test_display_table() {
        let report = ClassificationReport::compute(&[0, 1], &[0, 1], &labels());
        let table = report.to_string();

        assert!(table.contains("precision"));
        assert!(table.contains("Incident"));
        assert!(table.contains("weighted avg"));
        assert!(table.contains("accuracy"));
    }
}
