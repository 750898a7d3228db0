use crate::error::{GenError, Result};
use crate::message::SyntheticMessage;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lettre::message::MultiPart;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Historical SMTP recommendation for header line length.
pub const DEFAULT_MAX_HEADER_LEN: usize = 78;

const ADDRESS_HEADERS: [&str; 5] = ["From", "To", "Reply-To", "Cc", "Sender"];
/// Input bytes per encoded word so `=?utf-8?b?...?=` stays within 75 chars.
const ENCODED_WORD_BYTES: usize = 45;

/// Serializes [`SyntheticMessage`]s as `.eml` files with CRLF line endings.
#[derive(Debug, Clone)]
pub struct EmlWriter {
    max_header_len: usize,
}

impl Default for EmlWriter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEADER_LEN)
    }
}

impl EmlWriter {
    pub fn new(max_header_len: usize) -> Self {
        Self { max_header_len }
    }

    pub fn max_header_len(&self) -> usize {
        self.max_header_len
    }

    pub fn render(&self, message: &SyntheticMessage) -> Vec<u8> {
        let mut out = Vec::new();
        for header in &message.headers {
            let encoded = encode_header_value(&header.name, &header.value);
            out.extend_from_slice(fold_header(&header.name, &encoded, self.max_header_len).as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        let body =
            MultiPart::alternative_plain_html(message.text_body.clone(), message.html_body.clone());
        out.extend_from_slice(&body.formatted());
        out
    }

    /// Writes `message` to `path`, creating parent directories first.
    ///
    /// Bytes go to a hidden sibling file that is renamed over `path` only
    /// once fully written and synced.
    pub fn write(&self, message: &SyntheticMessage, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let file_name = path.file_name().ok_or_else(|| {
            GenError::InvalidArgument(format!("output path {} has no file name", path.display()))
        })?;
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(|e| GenError::filesystem(dir, e))?;
        }

        let mut partial_name = std::ffi::OsString::from(".");
        partial_name.push(file_name);
        partial_name.push(".partial");
        let partial = match parent {
            Some(dir) => dir.join(&partial_name),
            None => PathBuf::from(&partial_name),
        };

        let bytes = self.render(message);
        if let Err(e) = write_synced(&partial, &bytes) {
            let _ = fs::remove_file(&partial);
            return Err(GenError::filesystem(path, e));
        }
        if let Err(e) = fs::rename(&partial, path) {
            let _ = fs::remove_file(&partial);
            return Err(GenError::filesystem(path, e));
        }

        log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path.to_path_buf())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Folds `Name: value` so lines stay within `max_len` where whitespace allows.
///
/// A TAB in the value always starts a continuation line; spaces are used
/// greedily once the limit would be exceeded. Words longer than the limit
/// are never split.
pub fn fold_header(name: &str, value: &str, max_len: usize) -> String {
    let mut out = format!("{name}:");
    let mut line_len = out.len();

    for (i, (ws, word)) in tokens(value.trim_start()).into_iter().enumerate() {
        if i == 0 {
            out.push(' ');
            out.push_str(word);
            line_len += 1 + word.len();
            continue;
        }
        let hard_break = ws.contains('\t');
        if hard_break || line_len + ws.len() + word.len() > max_len {
            let lead = if hard_break { "\t" } else { " " };
            out.push_str("\r\n");
            out.push_str(lead);
            out.push_str(word);
            line_len = lead.len() + word.len();
        } else {
            out.push_str(ws);
            out.push_str(word);
            line_len += ws.len() + word.len();
        }
    }
    out
}

/// Splits into (leading whitespace, word) pairs.
fn tokens(value: &str) -> Vec<(&str, &str)> {
    let mut result = Vec::new();
    let mut rest = value;
    while !rest.is_empty() {
        let word_start = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
        let after_ws = &rest[word_start..];
        let word_len = after_ws.find(char::is_whitespace).unwrap_or(after_ws.len());
        if word_len == 0 {
            break;
        }
        result.push((&rest[..word_start], &after_ws[..word_len]));
        rest = &after_ws[word_len..];
    }
    result
}

/// Applies RFC 2047 encoding to non-ASCII text; address headers keep the
/// `<addr-spec>` readable and only encode or quote the display name.
pub fn encode_header_value(name: &str, value: &str) -> String {
    let is_address = ADDRESS_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name));
    if is_address {
        if let Some(open) = value.rfind('<').filter(|_| value.trim_end().ends_with('>')) {
            let display = value[..open].trim().trim_matches('"');
            let angle = value[open..].trim_end();
            if display.is_empty() {
                return angle.to_string();
            }
            return format!("{} {}", encode_phrase(display), angle);
        }
        return value.to_string();
    }
    if value.is_ascii() {
        value.to_string()
    } else {
        encode_words(value)
    }
}

fn encode_phrase(display: &str) -> String {
    if !display.is_ascii() {
        return encode_words(display);
    }
    const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];
    if display.contains(SPECIALS) {
        let escaped = display.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        display.to_string()
    }
}

/// `=?utf-8?b?...?=` words separated by spaces, split on char boundaries.
pub fn encode_words(text: &str) -> String {
    let mut words = Vec::new();
    let mut chunk_start = 0;
    let mut chunk_len = 0;
    for (idx, c) in text.char_indices() {
        if chunk_len + c.len_utf8() > ENCODED_WORD_BYTES {
            words.push(encoded_word(&text[chunk_start..idx]));
            chunk_start = idx;
            chunk_len = 0;
        }
        chunk_len += c.len_utf8();
    }
    if chunk_start < text.len() {
        words.push(encoded_word(&text[chunk_start..]));
    }
    words.join(" ")
}

fn encoded_word(chunk: &str) -> String {
    format!("=?utf-8?b?{}?=", STANDARD.encode(chunk.as_bytes()))
}
