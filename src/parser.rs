use crate::grouper::FRAME_LINES;
use crate::schema::FrameRecord;
use thiserror::Error;

/// Errors raised while reading a required numeric or structural field.
///
/// These abort the whole run; only chunk-length problems are recoverable.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum FieldParseError {
    #[error("frame {image_id}: invalid timestamp {text:?}")]
    InvalidTimestamp { image_id: String, text: String },
    #[error("frame {image_id}: invalid probability in {line:?}")]
    InvalidProbability { image_id: String, line: String },
    #[error("frame {image_id}: probability field has no '=' in {line:?}")]
    MissingProbabilityValue { image_id: String, line: String },
    #[error("frame {image_id}: no ',' separating class field in {line:?}")]
    MissingClassField { image_id: String, line: String },
    #[error("frame {image_id}: no class=<id> token in {line:?}")]
    MissingClassId { image_id: String, line: String },
}

/// Result of parsing one chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Parsed(FrameRecord),
    /// The chunk did not hold exactly [`FRAME_LINES`] lines.
    Malformed { line_count: usize },
}

/// A detection line split into its fields, before threshold filtering.
#[derive(Debug, Clone, PartialEq)]
struct Descriptor<'a> {
    probability: f64,
    class_field: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DescriptorFault {
    NoProbabilityValue,
    BadProbability,
    NoClassField,
    NoClassId,
}

impl<'a> Descriptor<'a> {
    /// `probability=<f64>, <tokens...> class=<id> <tokens...> <name>`
    ///
    /// The class field ends at the next `,`; anything after it is ignored.
    fn tokenize(line: &'a str) -> Result<Self, DescriptorFault> {
        let (probability_field, rest) = line
            .split_once(',')
            .ok_or(DescriptorFault::NoClassField)?;
        let class_field = rest.split_once(',').map_or(rest, |(field, _)| field);

        let (_, value) = probability_field
            .rsplit_once('=')
            .ok_or(DescriptorFault::NoProbabilityValue)?;
        let probability = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| !p.is_nan())
            .ok_or(DescriptorFault::BadProbability)?;

        Ok(Self {
            probability,
            class_field,
        })
    }

    /// Returns `(class_id, class_name)`; the name is the last token.
    fn class(&self) -> Result<(&'a str, &'a str), DescriptorFault> {
        let mut tokens = self.class_field.split_whitespace();
        let class_id = tokens
            .clone()
            .find_map(|token| token.strip_prefix("class="))
            .map(|rest| rest.rsplit('=').next().unwrap_or(rest))
            .filter(|id| !id.is_empty())
            .ok_or(DescriptorFault::NoClassId)?;
        let class_name = tokens.next_back().ok_or(DescriptorFault::NoClassId)?;
        Ok((class_id, class_name))
    }
}

fn field_error(fault: DescriptorFault, image_id: &str, line: &str) -> FieldParseError {
    let image_id = image_id.to_string();
    let line = line.to_string();
    match fault {
        DescriptorFault::NoProbabilityValue => {
            FieldParseError::MissingProbabilityValue { image_id, line }
        }
        DescriptorFault::BadProbability => FieldParseError::InvalidProbability { image_id, line },
        DescriptorFault::NoClassField => FieldParseError::MissingClassField { image_id, line },
        DescriptorFault::NoClassId => FieldParseError::MissingClassId { image_id, line },
    }
}

/// Parse one chunk into a [`FrameRecord`], keeping detections whose
/// probability is at least `threshold`.
///
/// Blank detection lines are unused slots. Detection order is preserved.
pub fn parse_frame<S: AsRef<str>>(
    chunk: &[S],
    threshold: f64,
) -> Result<FrameOutcome, FieldParseError> {
    if chunk.len() != FRAME_LINES {
        return Ok(FrameOutcome::Malformed {
            line_count: chunk.len(),
        });
    }

    let image_id = chunk[0].as_ref();
    let timestamp_text = chunk[1].as_ref();
    let timestamp = timestamp_text.trim().parse::<f64>().map_err(|_| {
        FieldParseError::InvalidTimestamp {
            image_id: image_id.to_string(),
            text: timestamp_text.to_string(),
        }
    })?;

    let mut record = FrameRecord::new(image_id, timestamp);

    for line in chunk[2..].iter().map(|l| l.as_ref()) {
        if line.trim().is_empty() {
            continue;
        }

        let descriptor =
            Descriptor::tokenize(line).map_err(|fault| field_error(fault, image_id, line))?;

        if descriptor.probability < threshold {
            continue;
        }

        let (class_id, class_name) = descriptor
            .class()
            .map_err(|fault| field_error(fault, image_id, line))?;

        record.push_detection(
            descriptor.probability,
            class_id.to_string(),
            class_name.to_string(),
        );
    }

    Ok(FrameOutcome::Parsed(record))
}
