//! Reading and writing peak lists as delimited text, one `position intensity` pair per line
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path;

use crate::arrayops::PeakSequence;

fn invalid_data(line_no: usize, message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("line {line_no}: {message}"))
}

/// Read a peak list from `reader`.
///
/// Columns may be separated by any whitespace or by commas. Blank lines and lines
/// starting with `#` are skipped. Any column past the second is ignored.
pub fn peaks_from_reader<R: BufRead>(reader: R) -> io::Result<PeakSequence> {
    let mut peaks = PeakSequence::default();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let pref = line.trim();
        if pref.is_empty() || pref.starts_with('#') {
            continue;
        }
        let mut chunks = pref
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty());
        let (Some(x), Some(y)) = (chunks.next(), chunks.next()) else {
            return Err(invalid_data(i + 1, format!("expected two columns, got {pref:?}")));
        };
        let x: f64 = x
            .parse()
            .map_err(|e| invalid_data(i + 1, format!("bad position {x:?}: {e}")))?;
        let y: f64 = y
            .parse()
            .map_err(|e| invalid_data(i + 1, format!("bad intensity {y:?}: {e}")))?;
        peaks.push(x, y);
    }
    log::debug!("Read {} peaks", peaks.len());
    Ok(peaks)
}

pub fn peaks_from_file<P: AsRef<path::Path>>(path: P) -> io::Result<PeakSequence> {
    let file = fs::File::open(path)?;
    peaks_from_reader(io::BufReader::new(file))
}

/// Write `peaks` as tab separated lines
pub fn peaks_to_writer<W: Write>(peaks: &PeakSequence, mut writer: W) -> io::Result<()> {
    for peak in peaks.iter() {
        writeln!(writer, "{}\t{}", peak.position, peak.intensity)?;
    }
    writer.flush()
}

pub fn peaks_to_file<P: AsRef<path::Path>>(peaks: &PeakSequence, path: P) -> io::Result<()> {
    let file = fs::File::create(path)?;
    peaks_to_writer(peaks, io::BufWriter::new(file))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_data;

    #[test]
    fn test_read_delimiters() {
        let text = "# position intensity\n1.5\t10\n2.0 20\n\n3.25,  5e-1\n4 1 extra\n";
        let peaks = peaks_from_reader(io::Cursor::new(text)).unwrap();
        assert_eq!(peaks.positions, vec![1.5, 2.0, 3.25, 4.0]);
        assert_eq!(peaks.intensities, vec![10.0, 20.0, 0.5, 1.0]);
    }

    #[test]
    fn test_read_errors() {
        let err = peaks_from_reader(io::Cursor::new("1.0 2.0\n3.0\n")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().starts_with("line 2"));

        let err = peaks_from_reader(io::Cursor::new("1.0 abc\n")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_write_then_read() {
        let peaks = test_data::reference_spectrum();
        let mut buf = Vec::new();
        peaks_to_writer(&peaks, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().next(), Some("101\t12"));
        let back = peaks_from_reader(io::Cursor::new(text)).unwrap();
        assert_eq!(back, peaks);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("peaksim-text-{}.txt", std::process::id()));
        let peaks = test_data::shifted_spectrum();
        peaks_to_file(&peaks, &path).unwrap();
        let back = peaks_from_file(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(back.unwrap(), peaks);

        let err = peaks_from_file(path.with_extension("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
