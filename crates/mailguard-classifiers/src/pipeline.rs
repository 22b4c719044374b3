//! End-to-end email pipeline: mask, normalize, classify
//!
//! All components are immutable once built and shared by `Arc`, so one
//! pipeline can serve concurrent requests without locking.

use crate::config::ArtifactConfig;
use crate::label::LabelCodec;
use crate::model::TextClassifier;
use crate::normalize::normalize;
use crate::pii::PiiMasker;
use mailguard_core::{ClassifiedEmail, Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Reject empty or whitespace-only email bodies
pub fn validate_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(Error::invalid_input("email body is empty"));
    }
    Ok(())
}

/// Mask → normalize → classify pipeline
#[derive(Clone)]
pub struct EmailPipeline {
    masker: Arc<PiiMasker>,
    model: Arc<TextClassifier>,
    labels: Arc<LabelCodec>,
}

impl std::fmt::Debug for EmailPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailPipeline")
            .field("stages", &self.masker.stage_names())
            .field("classes", &self.labels.classes())
            .finish()
    }
}

impl EmailPipeline {
    /// Assemble a pipeline, checking that every model class decodes
    pub fn new(masker: Arc<PiiMasker>, model: Arc<TextClassifier>, labels: Arc<LabelCodec>) -> Result<Self> {
        if let Some(code) = model.classes().iter().find(|&&code| labels.decode(code).is_none()) {
            return Err(Error::artifact(format!(
                "model predicts class {} but the label codec has only {} classes",
                code,
                labels.len()
            )));
        }

        Ok(Self { masker, model, labels })
    }

    /// Load both artifacts and build the default masker
    pub fn load(artifacts: &ArtifactConfig) -> Result<Self> {
        let model = TextClassifier::load(&artifacts.model_path)?;
        let labels = LabelCodec::load(&artifacts.labels_path)?;
        let pipeline = Self::new(Arc::new(PiiMasker::new()?), Arc::new(model), Arc::new(labels))?;

        info!("Email pipeline ready with {} categories", pipeline.labels.len());
        Ok(pipeline)
    }

    /// Classify an already-normalized token string
    pub fn classify(&self, normalized: &str) -> Result<String> {
        let code = self.model.predict(normalized)?;
        self.labels
            .decode(code)
            .map(str::to_string)
            .ok_or_else(|| Error::internal(format!("class {} has no label", code)))
    }

    /// Run the full pipeline on a raw email body
    pub fn process(&self, body: &str) -> Result<ClassifiedEmail> {
        validate_body(body)?;
        let start = Instant::now();

        let masked = self.masker.mask(body);
        let normalized = normalize(&masked.masked_text);
        let category = self.classify(&normalized)?;

        debug!(
            entities = masked.entities.len(),
            category = %category,
            latency_us = start.elapsed().as_micros() as u64,
            "Processed email"
        );

        Ok(ClassifiedEmail {
            input_email_body: body.to_string(),
            list_of_masked_entities: masked.entities,
            masked_email: masked.masked_text,
            category_of_the_email: category,
        })
    }

    /// The masker used by this pipeline
    pub fn masker(&self) -> &PiiMasker {
        &self.masker
    }

    /// The label codec used by this pipeline
    pub fn labels(&self) -> &LabelCodec {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailguard_core::EntityKind;

    fn pipeline() -> EmailPipeline {
        let masker = PiiMasker::new().unwrap();
        let emails = [
            ("My card 4111 1111 1111 1111 was charged twice, refund please", "Billing"),
            ("Refund the duplicate payment on my invoice", "Billing"),
            ("I cannot login, my password reset link expired", "Account"),
            ("Account locked after password attempts, email me at a@b.com", "Account"),
        ];

        let labels = LabelCodec::fit(emails.iter().map(|(_, label)| *label)).unwrap();
        let docs: Vec<String> = emails
            .iter()
            .map(|(body, _)| normalize(&masker.mask(body).masked_text))
            .collect();
        let codes = labels
            .encode_all(&emails.iter().map(|(_, label)| *label).collect::<Vec<_>>())
            .unwrap();

        let mut model = TextClassifier::default();
        model.fit(&docs, &codes).unwrap();

        EmailPipeline::new(Arc::new(masker), Arc::new(model), Arc::new(labels)).unwrap()
    }

    #[test]
    fn test_process_email() {
        let result = pipeline()
            .process("Please refund my payment, call me on 9876543210")
            .unwrap();

        assert_eq!(result.category_of_the_email, "Billing");
        assert_eq!(result.masked_email, "Please refund my payment, call me on [phone_number]");
        assert_eq!(result.list_of_masked_entities.len(), 1);
        assert_eq!(result.list_of_masked_entities[0].classification, EntityKind::PhoneNumber);
        assert_eq!(result.list_of_masked_entities[0].entity, "9876543210");
        assert_eq!(result.input_email_body, "Please refund my payment, call me on 9876543210");
    }

    #[test]
    fn test_blank_body_rejected() {
        let pipeline = pipeline();
        assert!(matches!(pipeline.process(""), Err(Error::InvalidInput(_))));
        assert!(matches!(pipeline.process(" \n\t"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_classify_normalized_text() {
        assert_eq!(pipeline().classify("password login").unwrap(), "Account");
    }

    #[test]
    fn test_mismatched_artifacts_rejected() {
        let mut model = TextClassifier::default();
        model
            .fit(&["alpha beta".to_string(), "gamma delta".to_string()], &[0, 3])
            .unwrap();
        let labels = LabelCodec::fit(["only", "two"]).unwrap();

        let result = EmailPipeline::new(
            Arc::new(PiiMasker::new().unwrap()),
            Arc::new(model),
            Arc::new(labels),
        );
        assert!(matches!(result, Err(Error::Artifact(_))));
    }
}
