use crate::config::OutputConfig;
use crate::schema::ParsedLog;
use crate::views::DashboardViews;
use colored::Colorize;
use std::fmt::Write;
use std::str::FromStr;

pub const LATENCY_TITLE: &str = "Inference time per frame (s)";
pub const PRESENCE_TITLE: &str = "Detections per frame";
pub const COUNTS_TITLE: &str = "Detection count per frame";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub color: bool,
    pub raw: bool,
    pub chart_width: usize,
    pub bar_char: char,
    pub present_char: char,
    pub absent_char: char,
}

impl RenderOptions {
    pub fn new(output: &OutputConfig, color: bool, raw: bool) -> Self {
        Self {
            color,
            raw,
            chart_width: output.chart_width.max(1),
            bar_char: output.bar_char,
            present_char: output.present_char,
            absent_char: output.absent_char,
        }
    }

    fn heading(&self, title: &str) -> String {
        let title = format!("{}:", title);
        if self.color {
            title.bold().cyan().to_string()
        } else {
            title
        }
    }
}

/// A chart selectable with `--fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartField {
    Latency,
    Presence,
    Counts,
}

impl ChartField {
    pub const ALL: [&'static str; 3] = ["latency", "presence", "counts"];
    pub const DEFAULT: [ChartField; 2] = [ChartField::Latency, ChartField::Presence];
}

impl FromStr for ChartField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latency" => Ok(ChartField::Latency),
            "presence" => Ok(ChartField::Presence),
            "counts" => Ok(ChartField::Counts),
            other => Err(format!("unknown field: {}", other)),
        }
    }
}

/// Parse a comma-separated `--fields` value. `None` selects the defaults.
pub fn parse_fields(fields: Option<&str>) -> Result<Vec<ChartField>, String> {
    let Some(fields) = fields else {
        return Ok(ChartField::DEFAULT.to_vec());
    };
    let selected = fields
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ChartField::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    if selected.is_empty() {
        return Err(format!(
            "no fields selected (expected one of: {})",
            ChartField::ALL.join(", ")
        ));
    }
    Ok(selected)
}

fn format_value(v: f64) -> String {
    format!("{}", v)
}

/// Frame index vs. raw timestamp, one row per frame.
pub fn render_latency(views: &DashboardViews, opts: &RenderOptions) -> String {
    let mut out = String::new();
    if opts.raw {
        for (i, ts) in views.timestamps.iter().enumerate() {
            push_line(&mut out, format!("timestamp.{} = {}", i, format_value(*ts)));
        }
        return out;
    }

    out.push_str(&opts.heading(LATENCY_TITLE));
    if views.timestamps.is_empty() {
        out.push_str("\n  (no frames)");
        return out;
    }

    let max = views
        .timestamps
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let index_width = (views.timestamps.len() - 1).to_string().len();
    let labels: Vec<String> = views.timestamps.iter().map(|v| format_value(*v)).collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    for (i, (ts, label)) in views.timestamps.iter().zip(&labels).enumerate() {
        let len = bar_len(*ts, max, opts.chart_width);
        let bar: String = std::iter::repeat_n(opts.bar_char, len).collect();
        let _ = write!(
            out,
            "\n  {:>iw$} | {:>lw$} | {}",
            i,
            label,
            bar,
            iw = index_width,
            lw = label_width
        );
    }
    out
}

fn bar_len(value: f64, max: f64, width: usize) -> usize {
    if !value.is_finite() || value <= 0.0 || max <= 0.0 {
        return 0;
    }
    ((value / max) * width as f64).round() as usize
}

/// One row per class, one cell per frame; wrapped every `chart_width` frames.
pub fn render_presence(views: &DashboardViews, opts: &RenderOptions) -> String {
    let table = &views.presence;
    let mut out = String::new();
    if opts.raw {
        for (class, indicators) in table.iter() {
            let joined: Vec<String> = indicators.iter().map(u8::to_string).collect();
            push_line(&mut out, format!("presence.{} = {}", class, joined.join(",")));
        }
        return out;
    }

    out.push_str(&opts.heading(PRESENCE_TITLE));
    if table.is_empty() {
        out.push_str("\n  (no detections)");
        return out;
    }

    let name_width = table
        .classes()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);
    let frames = table.frame_count();
    let blocks = frames.div_ceil(opts.chart_width);

    for block in 0..blocks {
        let start = block * opts.chart_width;
        let end = (start + opts.chart_width).min(frames);
        if blocks > 1 {
            let _ = write!(out, "\n  frames {}-{}", start, end - 1);
        }
        for (class, indicators) in table.iter() {
            let cells: String = indicators[start..end]
                .iter()
                .map(|v| {
                    if *v == 1 {
                        opts.present_char
                    } else {
                        opts.absent_char
                    }
                })
                .collect();
            let cells = if opts.color {
                cells.green().to_string()
            } else {
                cells
            };
            let _ = write!(out, "\n  {:<w$} {}", class, cells, w = name_width);
        }
    }
    out
}

pub fn render_counts(views: &DashboardViews, opts: &RenderOptions) -> String {
    let mut out = String::new();
    if opts.raw {
        for (i, count) in views.detection_counts.iter().enumerate() {
            push_line(&mut out, format!("count.{} = {}", i, count));
        }
        return out;
    }

    out.push_str(&opts.heading(COUNTS_TITLE));
    if views.detection_counts.is_empty() {
        out.push_str("\n  (no frames)");
        return out;
    }
    let index_width = (views.detection_counts.len() - 1).to_string().len();
    for (i, count) in views.detection_counts.iter().enumerate() {
        let _ = write!(out, "\n  {:>w$} | {}", i, count, w = index_width);
    }
    out
}

/// Render the selected charts, separated by blank lines (or plain newlines in raw mode).
pub fn render_charts(views: &DashboardViews, fields: &[ChartField], opts: &RenderOptions) -> String {
    let sections: Vec<String> = fields
        .iter()
        .map(|field| match field {
            ChartField::Latency => render_latency(views, opts),
            ChartField::Presence => render_presence(views, opts),
            ChartField::Counts => render_counts(views, opts),
        })
        .filter(|s| !s.is_empty())
        .collect();
    let separator = if opts.raw { "\n" } else { "\n\n" };
    sections.join(separator)
}

/// Human listing of parsed frames.
pub fn render_frames(log: &ParsedLog, opts: &RenderOptions) -> String {
    let mut out = String::new();
    if opts.raw {
        for (i, frame) in log.iter().enumerate() {
            push_line(&mut out, format!("frame.{}.image_id = {}", i, frame.image_id));
            push_line(
                &mut out,
                format!("frame.{}.timestamp = {}", i, format_value(frame.timestamp)),
            );
            for (j, ((p, name), id)) in frame
                .probabilities
                .iter()
                .zip(&frame.class_names)
                .zip(&frame.class_ids)
                .enumerate()
            {
                push_line(
                    &mut out,
                    format!("frame.{}.detection.{} = {} {} {}", i, j, id, name, p),
                );
            }
        }
        return out;
    }

    out.push_str(&opts.heading("Frames"));
    if log.is_empty() {
        out.push_str("\n  (no frames)");
        return out;
    }
    for frame in log {
        let _ = write!(
            out,
            "\n  {} @ {}",
            frame.image_id,
            format_value(frame.timestamp)
        );
        if frame.detection_count() == 0 {
            out.push_str(" (none)");
            continue;
        }
        let detections: Vec<String> = frame
            .probabilities
            .iter()
            .zip(&frame.class_names)
            .zip(&frame.class_ids)
            .map(|((p, name), id)| {
                let name = if opts.color {
                    name.green().to_string()
                } else {
                    name.clone()
                };
                format!("{}[{}] {:.2}", name, id, p)
            })
            .collect();
        out.push(' ');
        out.push_str(&detections.join(", "));
    }
    out
}

fn push_line(out: &mut String, line: String) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&line);
}
