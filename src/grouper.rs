/// Number of lines describing one frame: image id, timestamp, five detection slots.
pub const FRAME_LINES: usize = 7;

/// Split `lines` into consecutive, non-overlapping chunks of `size` lines.
///
/// The last chunk is shorter when `lines.len()` is not a multiple of `size`;
/// it is still yielded and left for the parser to reject.
pub fn group_lines<S: AsRef<str>>(lines: &[S], size: usize) -> std::slice::Chunks<'_, S> {
    lines.chunks(size.max(1))
}

/// [`group_lines`] with the fixed frame layout.
pub fn frames<S: AsRef<str>>(lines: &[S]) -> std::slice::Chunks<'_, S> {
    group_lines(lines, FRAME_LINES)
}
