//! Call-stack frames and trace rendering.
//!
//! Frames are captured by the host (pushed onto the context's call stack) and
//! snapshotted once per exception construction. Rendering follows the classic
//! PHP shape: `#<n> <file>(<line>): <function>()`.

/// One captured call-stack frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub file: String,
    pub function: String,
    pub line: i64,
    pub source: String,
}

impl Frame {
    pub fn new(file: &str, function: &str, line: i64, source: &str) -> Self {
        Self {
            file: file.to_string(),
            function: function.to_string(),
            line,
            source: source.to_string(),
        }
    }
}

pub fn format_frame(index: usize, frame: &Frame) -> String {
    format!(
        "#{} {}({}): {}()",
        index, frame.file, frame.line, frame.function
    )
}

/// Render frames in capture order, newline-joined, no trailing newline.
pub fn render_trace(frames: &[Frame]) -> String {
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| format_frame(i, frame))
        .collect::<Vec<_>>()
        .join("\n")
}
