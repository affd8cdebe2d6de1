//! Owned G-code line buffer.
//!
//! Lines keep their original terminators so a loaded file can be written
//! back byte-for-byte apart from the spliced block.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::{Error, Result};

/// An ordered, index-addressable sequence of G-code lines.
///
/// Each entry includes its line terminator (`\n`, `\r\n` or `\r`). The last entry
/// may lack one if the source text did not end with a newline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSequence {
    lines: Vec<String>,
}

impl LineSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split text into lines, keeping terminators verbatim.
    ///
    /// `\n`, `\r\n` and a lone `\r` all end a line.
    pub fn from_text(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            let end = match bytes[i] {
                b'\n' => i + 1,
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => i + 2,
                b'\r' => i + 1,
                _ => {
                    i += 1;
                    continue;
                }
            };
            lines.push(text[start..end].to_string());
            start = end;
            i = end;
        }
        if start < text.len() {
            lines.push(text[start..].to_string());
        }
        Self { lines }
    }

    /// Load a UTF-8 G-code file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let lines = Self::from_text(&text);
        info!("Loaded {} lines from {}", lines.len(), path.display());
        Ok(lines)
    }

    /// Write every line verbatim to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_text()).map_err(|source| Error::Save {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved modified G-code to: {}", path.display());
        Ok(())
    }

    /// Concatenate all lines back into a single string.
    pub fn to_text(&self) -> String {
        self.lines.concat()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    /// Insert `lines` immediately before index `at`, in order.
    ///
    /// Lines previously at `at..` move to `at + lines.len()..`. Inserting at
    /// `len()` appends.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `at > len()`.
    pub fn splice<I>(&mut self, at: usize, lines: I) -> Result<usize>
    where
        I: IntoIterator<Item = String>,
    {
        self.check_offset(at)?;
        let before = self.lines.len();
        self.lines.splice(at..at, lines);
        Ok(self.lines.len() - before)
    }

    /// Build a new sequence as prefix + `lines` + suffix, leaving `self` untouched.
    pub fn spliced<I>(&self, at: usize, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        self.check_offset(at)?;
        let inserted: Vec<String> = lines.into_iter().collect();
        let mut out = Vec::with_capacity(self.lines.len() + inserted.len());
        out.extend_from_slice(&self.lines[..at]);
        out.extend(inserted);
        out.extend_from_slice(&self.lines[at..]);
        Ok(Self { lines: out })
    }

    fn check_offset(&self, at: usize) -> Result<()> {
        if at > self.lines.len() {
            return Err(Error::InvalidArgument(format!(
                "splice offset {} is past the end of a {}-line sequence",
                at,
                self.lines.len()
            )));
        }
        Ok(())
    }
}

impl From<Vec<String>> for LineSequence {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}
