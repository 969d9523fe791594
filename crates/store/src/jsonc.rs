//! Minimal JSON-with-comments support.
//!
//! Profile files may be `.jsonc`: plain JSON plus `//` and `/* */` comments.
//! Comments are stripped before handing the text to `serde_json`; string
//! literals are left alone.

use crate::types::ConfigObject;
use serde_json::Value;

/// Name written into the header line of applied configs.
pub const TOOL_NAME: &str = "omo-switch";

/// Returns `text` with comments blanked out. Newlines inside block comments are
/// kept so `serde_json` error positions still match the source.
pub fn strip_json_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Parses JSON or JSONC text.
pub fn parse_jsonc(text: &str) -> serde_json::Result<Value> {
    serde_json::from_str(&strip_json_comments(text))
}

/// Parses JSON or JSONC text that must be an object.
pub fn parse_jsonc_object(text: &str) -> serde_json::Result<ConfigObject> {
    serde_json::from_str(&strip_json_comments(text))
}

/// Header line identifying which profile produced an applied config.
pub fn applied_header(profile_name: &str) -> String {
    format!("// Profile Name: {profile_name}, edited by {TOOL_NAME}")
}

/// The text written into the external tool's config when a profile is applied:
/// a one-line comment header followed by 2-space pretty JSON.
pub fn render_applied_config(profile_name: &str, config: &ConfigObject) -> serde_json::Result<String> {
    let body = serde_json::to_string_pretty(config)?;
    Ok(format!("{}\n{body}", applied_header(profile_name)))
}
