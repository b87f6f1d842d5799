use crate::grouper;
use crate::parser::{FieldParseError, FrameOutcome, parse_frame};
use crate::schema::ParsedLog;

/// Run every 7-line chunk of `lines` through the frame parser.
///
/// Chunks with the wrong line count are dropped without surfacing an error;
/// a field that fails to parse aborts the whole run.
pub fn collect<S: AsRef<str>>(lines: &[S], threshold: f64) -> Result<ParsedLog, FieldParseError> {
    let mut frames = Vec::with_capacity(lines.len() / grouper::FRAME_LINES);
    let mut skipped = 0usize;

    for (index, chunk) in grouper::frames(lines).enumerate() {
        match parse_frame(chunk, threshold)? {
            FrameOutcome::Parsed(record) => frames.push(record),
            FrameOutcome::Malformed { line_count } => {
                skipped += 1;
                log::debug!(
                    "skipping chunk {} ({} lines, expected {})",
                    index,
                    line_count,
                    grouper::FRAME_LINES
                );
            }
        }
    }

    log::debug!(
        "parsed {} frames from {} lines at threshold {} ({} chunks skipped)",
        frames.len(),
        lines.len(),
        threshold,
        skipped
    );

    Ok(ParsedLog::new(frames))
}
