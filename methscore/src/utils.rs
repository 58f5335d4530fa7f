use std::path::Path;

use serde::Deserialize;

/// Attempt to read a file as a [`String`], returning a helpful error message on failure
pub fn read_file_to_string(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::Error::msg(format!("Can't open {:?}: {}", path, e)))
}

/// Attempt to parse a TOML string, returning a helpful error message on failure
pub fn parse_toml<'de, T: Deserialize<'de>>(s: &'de str) -> anyhow::Result<T> {
    T::deserialize(toml::Deserializer::new(s)).map_err(|e| anyhow::Error::msg(format!("Error parsing music file: {}", e)))
}

pub fn get_one() -> i32 {
    1
}

/// Write some `text` to `out`, padding it to `width` with spaces on the left
pub fn write_right_aligned(out: &mut String, text: &str, width: usize) {
    push_multiple(' ', width.saturating_sub(text.chars().count()), out);
    out.push_str(text);
}

/// Write some `text` to `out`, padding it to `width` with spaces on the right
pub fn write_left_aligned(out: &mut String, text: &str, width: usize) {
    out.push_str(text);
    push_multiple(' ', width.saturating_sub(text.chars().count()), out);
}

/// Push `n` copies of `c` to the end of `out`
fn push_multiple(c: char, n: usize, out: &mut String) {
    out.extend(std::iter::repeat(c).take(n));
}
