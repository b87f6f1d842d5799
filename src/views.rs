use crate::schema::ParsedLog;
use schemars::JsonSchema;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Chart-ready tables derived from a [`ParsedLog`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct DashboardViews {
    /// Raw timestamp of each frame, in frame order. These are plotted as-is,
    /// not as differences between consecutive frames.
    pub timestamps: Vec<f64>,
    pub detection_counts: Vec<usize>,
    pub presence: PresenceTable,
}

impl DashboardViews {
    pub fn build(log: &ParsedLog) -> Self {
        Self {
            timestamps: timestamp_series(log),
            detection_counts: detection_counts(log),
            presence: PresenceTable::build(log),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.timestamps.len()
    }
}

pub fn timestamp_series(log: &ParsedLog) -> Vec<f64> {
    log.iter().map(|frame| frame.timestamp).collect()
}

pub fn detection_counts(log: &ParsedLog) -> Vec<usize> {
    log.iter().map(|frame| frame.detection_count()).collect()
}

/// Per-class 0/1 indicator series, one entry per frame.
///
/// Classes are kept in first-seen order: by frame, then by detection order
/// within the frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct PresenceTable {
    #[serde(rename = "x")]
    index: Vec<usize>,
    #[schemars(with = "std::collections::BTreeMap<String, Vec<u8>>")]
    classes: ClassSeries,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ClassSeries(Vec<(String, Vec<u8>)>);

impl Serialize for ClassSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (class, indicators) in &self.0 {
            map.serialize_entry(class, indicators)?;
        }
        map.end()
    }
}

impl PresenceTable {
    pub fn build(log: &ParsedLog) -> Self {
        let frame_count = log.len();
        let mut series: Vec<(String, Vec<u8>)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for (frame_index, frame) in log.iter().enumerate() {
            for class in &frame.class_names {
                let slot = *positions.entry(class.as_str()).or_insert_with(|| {
                    series.push((class.clone(), vec![0; frame_count]));
                    series.len() - 1
                });
                series[slot].1[frame_index] = 1;
            }
        }

        Self {
            index: (0..frame_count).collect(),
            classes: ClassSeries(series),
        }
    }

    /// The `0..N-1` frame axis.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.0.iter().map(|(class, _)| class.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.classes
            .0
            .iter()
            .map(|(class, indicators)| (class.as_str(), indicators.as_slice()))
    }

    pub fn get(&self, class: &str) -> Option<&[u8]> {
        self.iter()
            .find(|(name, _)| *name == class)
            .map(|(_, indicators)| indicators)
    }

    /// Number of distinct classes.
    pub fn len(&self) -> usize {
        self.classes.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.0.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        self.index.len()
    }
}
