//! Reasoning-model output cleanup

/// Marker closing the thinking section emitted by reasoning models
pub const THINK_END_MARKER: &str = "</think>";

/// Drop a leading thinking section
///
/// Only applies when the marker appears exactly once; otherwise the text is
/// returned as-is since there is no unambiguous split point.
pub fn strip_thinking(text: &str) -> &str {
    if text.matches(THINK_END_MARKER).count() == 1 {
        if let Some((_, answer)) = text.split_once(THINK_END_MARKER) {
            return answer;
        }
    }
    text
}
