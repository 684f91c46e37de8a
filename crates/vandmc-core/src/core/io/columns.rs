use super::traits::{TextFormat, content_lines};
use super::{LoadError, ParseError};
use crate::core::detectors::EfficiencyCurve;
use crate::core::materials::RangeTable;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// The first two whitespace-separated numeric columns of a data file. Further
/// columns are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Columns {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn parse_value(token: &str, line: usize) -> Result<f64, ParseError> {
    token
        .parse::<f64>()
        .map_err(|_| ParseError::syntax(line, format!("invalid number '{token}'")))
}

impl TextFormat for Columns {
    fn read_from(reader: &mut impl BufRead) -> Result<Self, ParseError> {
        let mut columns = Columns::default();
        for entry in content_lines(reader) {
            let (line, content) = entry?;
            let mut tokens = content.split_whitespace();
            let (Some(x), Some(y)) = (tokens.next(), tokens.next()) else {
                return Err(ParseError::syntax(line, "expected two columns"));
            };
            columns.x.push(parse_value(x, line)?);
            columns.y.push(parse_value(y, line)?);
        }
        Ok(columns)
    }

    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        for (x, y) in self.x.iter().zip(&self.y) {
            writeln!(writer, "{x}\t{y}")?;
        }
        Ok(())
    }
}

fn with_path<T>(path: &Path, result: Result<T, ParseError>) -> Result<T, LoadError> {
    result.map_err(|e| LoadError::Parse {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

/// Reads an `energy(MeV) efficiency` curve.
pub fn read_efficiency_curve(path: &Path) -> Result<EfficiencyCurve, LoadError> {
    let columns = Columns::read_from_path(path)?;
    with_path(
        path,
        EfficiencyCurve::new(columns.x, columns.y).map_err(ParseError::from),
    )
}

/// Reads an externally computed `energy(MeV) range(m)` table.
pub fn read_range_table(path: &Path) -> Result<RangeTable, LoadError> {
    let columns = Columns::read_from_path(path)?;
    with_path(
        path,
        RangeTable::from_points(columns.x, columns.y).map_err(ParseError::from),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn read_from_skips_comments_and_extra_columns() {
        let text = "# energy eff\n\n0.5 0.1 ignored\n1.0\t0.4  # trailing\n2.0 0.6\n";
        let columns = Columns::read_from(&mut Cursor::new(text)).unwrap();
        assert_eq!(columns.x, vec![0.5, 1.0, 2.0]);
        assert_eq!(columns.y, vec![0.1, 0.4, 0.6]);
    }

    #[test]
    fn read_from_reports_line_of_bad_value() {
        let text = "1.0 2.0\n\n3.0 abc\n";
        let err = Columns::read_from(&mut Cursor::new(text)).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 3, .. }), "{err}");
    }

    #[test]
    fn read_from_rejects_single_column_rows() {
        let err = Columns::read_from(&mut Cursor::new("1.0\n")).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 1, .. }));
    }

    #[test]
    fn written_columns_read_back() {
        let columns = Columns {
            x: vec![1.0, 2.5],
            y: vec![0.25, 3.0],
        };
        let dir = tempdir().unwrap();
        let path = dir.path().join("cols.dat");
        columns.write_to_path(&path).unwrap();
        assert_eq!(Columns::read_from_path(&path).unwrap(), columns);
    }

    #[test]
    fn efficiency_curve_errors_carry_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eff.dat");
        std::fs::write(&path, "1.0 0.5\n2.0 1.5\n").unwrap();
        let err = read_efficiency_curve(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                source: ParseError::Efficiency(_),
                ..
            }
        ));
        assert!(err.path().ends_with("eff.dat"));
    }

    #[test]
    fn range_table_loads_from_two_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("range.dat");
        std::fs::write(&path, "1.0 1e-5\n2.0 4e-5\n4.0 1.2e-4\n").unwrap();
        let table = read_range_table(&path).unwrap();
        assert_eq!(table.len(), 3);
        assert!((table.range(3.0).unwrap() - 8e-5).abs() < 1e-12);
    }
}
