use crate::grouper::FRAME_LINES;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Split text on `\n`, stripping a trailing `\r` from each line.
///
/// Empty segments are kept, since a blank line is an unused detection slot.
/// A single empty final segment is dropped only when that leaves a whole
/// number of frames, i.e. when it is the file's trailing terminator rather
/// than the last slot of a frame written without one.
pub fn lines_from_str(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();
    if lines.last().is_some_and(String::is_empty) && (lines.len() - 1) % FRAME_LINES == 0 {
        lines.pop();
    }
    lines
}

/// Read a whole log into memory. `-` reads standard input.
pub fn read_lines(path: &Path) -> Result<Vec<String>, SourceError> {
    let io_error = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(io_error)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(io_error)?
    };

    let lines = lines_from_str(&text);
    log::info!("read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn splits_unix_and_windows_endings() {
        assert_eq!(lines_from_str("a\nb\r\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn trailing_newline_dropped_only_after_whole_frames() {
        let framed = "0001.png\n1.5\n\n\n\n\n\n";
        assert_eq!(lines_from_str(framed).len(), FRAME_LINES);
        assert_eq!(lines_from_str("a\nb\n"), vec!["a", "b", ""]);
        assert!(lines_from_str("").is_empty());
    }

    #[test]
    fn final_blank_slot_without_newline_is_kept() {
        let text = [
            "0001.png",
            "1.234",
            "probability=0.95, class=3 cat",
            "probability=0.40, class=7 dog",
            "",
            "",
            "",
        ]
        .join("\n");
        let lines = lines_from_str(&text);
        assert_eq!(lines.len(), FRAME_LINES);

        let log = crate::collect(&lines, 0.8).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.frames[0].class_names, vec!["cat"]);
    }

    #[test]
    fn windows_endings_with_trailing_terminator() {
        let text = "0001.png\r\n1.5\r\n\r\n\r\n\r\n\r\n\r\n";
        let lines = lines_from_str(text);
        assert_eq!(lines.len(), FRAME_LINES);
        assert!(lines.iter().all(|l| !l.contains('\r')));
    }

    #[test]
    fn keeps_interior_blank_lines() {
        assert_eq!(lines_from_str("a\n\n\nb"), vec!["a", "", "", "b"]);
    }

    #[test]
    fn reads_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "0001.png\n1.5\n").unwrap();
        let lines = read_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["0001.png", "1.5", ""]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_lines(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            read_lines(file.path()),
            Err(SourceError::Io { .. })
        ));
    }
}
