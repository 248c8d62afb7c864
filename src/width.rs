//! Display width helpers.
//!
//! Label items measure their text in terminal columns, ignoring any ANSI
//! styling the caller embedded in the label.

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}
