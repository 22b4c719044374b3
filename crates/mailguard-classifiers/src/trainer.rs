//! Offline training: dataset loading, split, fit, evaluate, export

use crate::config::{ArtifactConfig, TrainingConfig};
use crate::label::LabelCodec;
use crate::model::TextClassifier;
use crate::normalize::normalize;
use crate::pii::PiiMasker;
use crate::report::ClassificationReport;
use mailguard_core::{ClassifiedEmail, Error, MaskResult, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Directory (under the output directory) holding per-example predictions
pub const EXAMPLES_DIR_NAME: &str = "json_outputs";

/// One labeled training record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledEmail {
    /// Raw email body
    pub email: String,

    /// Category label
    #[serde(rename = "type")]
    pub category: String,
}

/// Parse a JSON Lines dataset; blank lines are skipped
pub fn parse_dataset(content: &str) -> Result<Vec<LabeledEmail>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str(line)
                .map_err(|e| Error::dataset(format!("line {}: {}", number + 1, e)))
        })
        .collect()
}

/// Read a JSON Lines dataset from disk
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<LabeledEmail>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::dataset(format!("failed to read dataset {}: {}", path.display(), e))
    })?;

    let records = parse_dataset(&content)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// A held-out record with its prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestExample {
    /// Position of the record in the dataset
    pub index: usize,

    /// Response record as the service would return it
    pub result: ClassifiedEmail,
}

/// Everything produced by one training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: TextClassifier,
    pub labels: LabelCodec,
    pub report: ClassificationReport,
    pub test_examples: Vec<TestExample>,
}

impl TrainingOutcome {
    /// Write artifacts into `dir`, plus one `<index>.json` per test example when asked
    pub fn export(&self, dir: impl AsRef<Path>, export_examples: bool) -> Result<ArtifactConfig> {
        let dir = dir.as_ref();
        let artifacts = ArtifactConfig::in_dir(dir);

        self.model.save(&artifacts.model_path)?;
        self.labels.save(&artifacts.labels_path)?;

        if export_examples {
            let examples_dir = dir.join(EXAMPLES_DIR_NAME);
            std::fs::create_dir_all(&examples_dir)?;
            for example in &self.test_examples {
                let path = examples_dir.join(format!("{}.json", example.index));
                std::fs::write(path, serde_json::to_string_pretty(&example.result)?)?;
            }
            info!(
                "Exported {} test predictions to {}",
                self.test_examples.len(),
                examples_dir.display()
            );
        }

        Ok(artifacts)
    }
}

struct PreparedEmail<'a> {
    index: usize,
    record: &'a LabeledEmail,
    masked: MaskResult,
    normalized: String,
}

/// Fits a [`TextClassifier`] from labeled emails
pub struct Trainer {
    config: TrainingConfig,
    masker: PiiMasker,
}

impl Trainer {
    /// Create a trainer with validated hyperparameters
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            masker: PiiMasker::new()?,
        })
    }

    /// Hyperparameters in use
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Mask, normalize, split, fit and evaluate
    pub fn train(&self, records: &[LabeledEmail]) -> Result<TrainingOutcome> {
        let prepared: Vec<PreparedEmail<'_>> = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                let masked = self.masker.mask(&record.email);
                let normalized = normalize(&masked.masked_text);
                if normalized.is_empty() {
                    debug!(index, "Dropping record with no usable tokens");
                    return None;
                }
                Some(PreparedEmail { index, record, masked, normalized })
            })
            .collect();

        let dropped = records.len() - prepared.len();
        if dropped > 0 {
            warn!("Dropped {} records with no usable tokens", dropped);
        }
        if prepared.len() < 2 {
            return Err(Error::dataset(format!(
                "need at least 2 usable records to split, got {}",
                prepared.len()
            )));
        }

        let labels = LabelCodec::fit(prepared.iter().map(|p| p.record.category.as_str()))?;
        let codes = labels.encode_all(
            &prepared.iter().map(|p| p.record.category.as_str()).collect::<Vec<_>>(),
        )?;

        let (test, train) = self.split(prepared.len());
        info!(
            "Training on {} records, evaluating on {} ({} categories)",
            train.len(),
            test.len(),
            labels.len()
        );

        let mut model = TextClassifier::new(Some(self.config.max_features), self.config.alpha);
        let train_docs: Vec<String> = train.iter().map(|&i| prepared[i].normalized.clone()).collect();
        let train_codes: Vec<usize> = train.iter().map(|&i| codes[i]).collect();
        model.fit(&train_docs, &train_codes)?;

        let mut expected = Vec::with_capacity(test.len());
        let mut predicted = Vec::with_capacity(test.len());
        let mut test_examples = Vec::with_capacity(test.len());

        for &i in &test {
            let item = &prepared[i];
            let code = model.predict(&item.normalized)?;
            let category = labels
                .decode(code)
                .ok_or_else(|| Error::internal(format!("class {} has no label", code)))?;

            expected.push(codes[i]);
            predicted.push(code);
            test_examples.push(TestExample {
                index: item.index,
                result: ClassifiedEmail {
                    input_email_body: item.record.email.clone(),
                    list_of_masked_entities: item.masked.entities.clone(),
                    masked_email: item.masked.masked_text.clone(),
                    category_of_the_email: category.to_string(),
                },
            });
        }

        let report = ClassificationReport::compute(&expected, &predicted, labels.classes());
        info!("Held-out accuracy: {:.4}", report.accuracy);

        Ok(TrainingOutcome { model, labels, report, test_examples })
    }

    /// Seeded shuffle split into `(test, train)` positions
    ///
    /// The test share is rounded up and both sides keep at least one record.
    fn split(&self, n: usize) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);

        let n_test = ((n as f64 * self.config.test_size).ceil() as usize).clamp(1, n - 1);
        let train = indices.split_off(n_test);
        (indices, train)
    }
}
