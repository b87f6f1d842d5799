use crate::views::DashboardViews;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: &str = "0.1.0";

/// One parsed frame of the detection log.
///
/// The three detection sequences are index-aligned: `probabilities[i]`,
/// `class_names[i]` and `class_ids[i]` describe the same detection. A frame
/// whose detections were all rejected keeps empty sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameRecord {
    #[serde(rename = "imageID")]
    pub image_id: String,
    pub timestamp: f64,
    #[serde(rename = "probability")]
    pub probabilities: Vec<f64>,
    #[serde(rename = "className")]
    pub class_names: Vec<String>,
    #[serde(rename = "classID")]
    pub class_ids: Vec<String>,
}

impl FrameRecord {
    pub fn new(image_id: impl Into<String>, timestamp: f64) -> Self {
        Self {
            image_id: image_id.into(),
            timestamp,
            probabilities: Vec::new(),
            class_names: Vec::new(),
            class_ids: Vec::new(),
        }
    }

    pub(crate) fn push_detection(&mut self, probability: f64, class_id: String, class_name: String) {
        self.probabilities.push(probability);
        self.class_ids.push(class_id);
        self.class_names.push(class_name);
    }

    pub fn detection_count(&self) -> usize {
        self.class_names.len()
    }

    pub fn contains_class(&self, class_name: &str) -> bool {
        self.class_names.iter().any(|c| c == class_name)
    }
}

/// Frames that parsed successfully, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ParsedLog {
    pub frames: Vec<FrameRecord>,
}

impl ParsedLog {
    pub fn new(frames: Vec<FrameRecord>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrameRecord> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a ParsedLog {
    type Item = &'a FrameRecord;
    type IntoIter = std::slice::Iter<'a, FrameRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Versioned document printed by `--json`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Report {
    pub version: String,
    pub threshold: f64,
    pub frames: ParsedLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<DashboardViews>,
}

impl Report {
    pub fn new(threshold: f64, frames: ParsedLog) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            threshold,
            frames,
            views: None,
        }
    }

    pub fn with_views(mut self) -> Self {
        self.views = Some(DashboardViews::build(&self.frames));
        self
    }
}
