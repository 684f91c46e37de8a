use super::{LoadError, ParseError};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Common interface of the plain-text input formats.
pub trait TextFormat: Sized {
    /// Parses a value from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on malformed content or a failed read.
    fn read_from(reader: &mut impl BufRead) -> Result<Self, ParseError>;

    /// Serializes the value in the same format `read_from` accepts.
    fn write_to(&self, writer: &mut impl Write) -> io::Result<()>;

    /// Reads a value from a file, attaching the path to any error.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader).map_err(|e| LoadError::Parse {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        let to_error = |e: io::Error| LoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        };
        let file = File::create(path).map_err(to_error)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(to_error)?;
        writer.flush().map_err(to_error)
    }
}

/// Yields `(line_number, content)` for every line that is neither blank nor a
/// `#` comment. Trailing comments are stripped. Line numbers are 1-based.
pub(crate) fn content_lines(
    reader: &mut impl BufRead,
) -> impl Iterator<Item = Result<(usize, String), io::Error>> + '_ {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match line {
            Err(e) => Some(Err(e)),
            Ok(line) => {
                let content = line.split('#').next().unwrap_or("").trim();
                (!content.is_empty()).then(|| Ok((index + 1, content.to_string())))
            }
        })
}
