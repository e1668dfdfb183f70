//! Labeled training corpus.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value as JsonValue;
use thi_schema::FeatureVector;

/// A feature vector paired with its rule score. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabeledSample {
    pub features: FeatureVector,
    pub thi_score: f64,
}

impl LabeledSample {
    pub fn new(features: FeatureVector, thi_score: f64) -> Self {
        Self {
            features,
            thi_score,
        }
    }

    /// Flat row: one key per feature plus `thi_score`.
    pub fn to_row(&self) -> JsonValue {
        let mut row = self.features.to_map();
        row.insert("thi_score".to_string(), JsonValue::from(self.thi_score));
        JsonValue::Object(row)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    samples: Vec<LabeledSample>,
}

impl Dataset {
    pub fn new(samples: Vec<LabeledSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[LabeledSample] {
        &self.samples
    }

    pub fn features(&self) -> Vec<FeatureVector> {
        self.samples.iter().map(|s| s.features).collect()
    }

    pub fn targets(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.thi_score).collect()
    }

    /// Write one JSON object per line.
    pub fn write_ndjson<W: Write>(&self, mut out: W) -> io::Result<()> {
        for sample in &self.samples {
            serde_json::to_writer(&mut out, &sample.to_row())?;
            out.write_all(b"\n")?;
        }
        out.flush()
    }
}

impl FromIterator<LabeledSample> for Dataset {
    fn from_iter<I: IntoIterator<Item = LabeledSample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
