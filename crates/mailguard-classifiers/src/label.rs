//! Label codec: category strings <-> integer class codes

use mailguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Artifact format version written by this crate
pub const LABEL_FORMAT_VERSION: u32 = 1;

/// Bijection between sorted distinct category strings and codes `0..k`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCodec {
    format_version: u32,
    classes: Vec<String>,
}

impl LabelCodec {
    /// Fit from category values; duplicates collapse, order is lexicographic
    pub fn fit<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();

        if classes.is_empty() {
            return Err(Error::model("cannot fit label codec without labels"));
        }

        Ok(Self {
            format_version: LABEL_FORMAT_VERSION,
            classes: classes.into_iter().collect(),
        })
    }

    /// Code for a category
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
    }

    /// Encode every label, failing on the first unknown one
    pub fn encode_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                self.encode(label.as_ref())
                    .ok_or_else(|| Error::model(format!("unknown label '{}'", label.as_ref())))
            })
            .collect()
    }

    /// Category for a code
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Categories in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the codec has no categories
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Write the codec as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Saved label codec with {} classes to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a codec written by [`Self::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::artifact(format!("failed to read label codec {}: {}", path.display(), e))
        })?;
        let codec: Self = serde_json::from_str(&content).map_err(|e| {
            Error::artifact(format!("corrupt label codec {}: {}", path.display(), e))
        })?;
        codec.validate()?;
        Ok(codec)
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != LABEL_FORMAT_VERSION {
            return Err(Error::artifact(format!(
                "unsupported label codec format version {}",
                self.format_version
            )));
        }
        if self.classes.is_empty() {
            return Err(Error::artifact("label codec has no classes"));
        }
        if self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::artifact("label codec classes are not sorted and distinct"));
        }
        Ok(())
    }
}
