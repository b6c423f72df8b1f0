use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::Error;
use crate::parsers::{consolidate_events, unpack_event};
use crate::Event;

/// Read an `.a2` file: one 16-hex-digit event word per line.
pub fn read_a2(path: &Path) -> Result<Vec<Event>, Error> {
    if !path.exists() {
        return Err(Error::FileNotAvailable(path.display().to_string()));
    }
    let contents = fs::read_to_string(path)?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let word = u64::from_str_radix(line.trim(), 16)
                .map_err(|_| Error::InvalidHexRecord(line.to_string()))?;
            Ok(unpack_event(word))
        })
        .collect()
}

/// Read an `.a0` file: the two 32-bit halves of each event word as
/// 8-hex-digit lines, low half first.
///
/// Unlike the binary format there is no legacy word order and no rollover
/// filtering for this layout.
pub fn read_a0(path: &Path) -> Result<Vec<Event>, Error> {
    if !path.exists() {
        return Err(Error::FileNotAvailable(path.display().to_string()));
    }
    let contents = fs::read_to_string(path)?;
    let words = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            u32::from_str_radix(line.trim(), 16)
                .map_err(|_| Error::InvalidHexRecord(line.to_string()))
        })
        .collect::<Result<Vec<u32>, Error>>()?;
    if words.len() % 2 != 0 {
        return Err(Error::TruncatedRecord);
    }
    Ok(words
        .chunks_exact(2)
        .map(|pair| {
            let (low, high) = (pair[0], pair[1]);
            unpack_event(((high as u64) << 32) | low as u64)
        })
        .collect())
}

/// Write events as an `.a2` file, one time-sorted event word per line.
pub fn write_a2(path: &Path, events: &[Event]) -> Result<(), Error> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for word in consolidate_events(events) {
        writeln!(writer, "{:016x}", word)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write events as an `.a0` file: each event word as two 8-hex-digit lines,
/// low half first.
pub fn write_a0(path: &Path, events: &[Event]) -> Result<(), Error> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for word in consolidate_events(events) {
        writeln!(writer, "{:08x}", word as u32)?;
        writeln!(writer, "{:08x}", (word >> 32) as u32)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn a2_lines_parse_to_events() {
        let word = (1234u64 << 10) | 0b0010;
        let file = write_temp(&format!("{:016x}\n", word));
        assert_eq!(
            read_a2(file.path()).unwrap(),
            vec![Event { tof: 1234, pattern: 0b0010 }]
        );
    }

    #[test]
    fn a2_rejects_garbage_lines() {
        let file = write_temp("not-hex\n");
        assert!(matches!(read_a2(file.path()), Err(Error::InvalidHexRecord(_))));
    }

    #[test]
    fn a0_pairs_low_then_high() {
        let word = (99u64 << 10) | 0b1000;
        let (low, high) = (word as u32, (word >> 32) as u32);
        let file = write_temp(&format!("{:08x}\n{:08x}\n", low, high));
        assert_eq!(
            read_a0(file.path()).unwrap(),
            vec![Event { tof: 99, pattern: 0b1000 }]
        );
    }

    #[test]
    fn a0_with_an_odd_line_count_is_truncated() {
        let file = write_temp("0000aa00\n");
        assert!(matches!(read_a0(file.path()), Err(Error::TruncatedRecord)));
    }

    #[test]
    fn a2_round_trips_through_the_writer() {
        let events = vec![
            Event { tof: 100, pattern: 0b0001 },
            Event { tof: 5_000_000_000, pattern: 0b1111 },
        ];
        let file = NamedTempFile::new().unwrap();
        write_a2(file.path(), &events).unwrap();
        assert_eq!(read_a2(file.path()).unwrap(), events);
    }

    #[test]
    fn a0_round_trips_through_the_writer() {
        // out of order on purpose: the writer consolidates and sorts
        let events = vec![
            Event { tof: 700, pattern: 0b0100 },
            Event { tof: 40, pattern: 0b0001 },
        ];
        let file = NamedTempFile::new().unwrap();
        write_a0(file.path(), &events).unwrap();
        assert_eq!(
            read_a0(file.path()).unwrap(),
            vec![
                Event { tof: 40, pattern: 0b0001 },
                Event { tof: 700, pattern: 0b0100 },
            ]
        );
    }
}
