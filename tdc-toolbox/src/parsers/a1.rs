const BUFFER_SIZE: usize = 1024 * 16;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::errors::Error;
use crate::parsers::{consolidate_events, unpack_event, ROLLOVER_FLAG};
use crate::Event;

/// A raw `.a1` timestamp file.
///
/// Every record is one 64-bit event word stored as two little-endian 32-bit
/// halves. Current firmware writes the low half first; `legacy` flips the
/// order for files written by the older readout. Rollover dummy records
/// (flag bit set in the low half) carry no detection and are dropped unless
/// `ignore_rollover` is disabled.
pub struct A1File {
    pub path: PathBuf,
    pub legacy: bool,
    pub ignore_rollover: bool,
}

impl A1File {
    /// Create an A1File from its filepath.
    ///
    /// If the file does not exist a FileNotAvailable error will be returned.
    pub fn new(path: PathBuf, legacy: bool, ignore_rollover: bool) -> Result<Self, Error> {
        if path.exists() {
            Ok(Self {
                path,
                legacy,
                ignore_rollover,
            })
        } else {
            let path_string = path.display().to_string();
            Err(Error::FileNotAvailable(path_string))
        }
    }

    /// Stream records without materializing the whole file.
    pub fn stream(&self) -> Result<A1Stream, Error> {
        let file = File::open(&self.path)?;
        Ok(A1Stream {
            reader: BufReader::with_capacity(BUFFER_SIZE, file),
            legacy: self.legacy,
            ignore_rollover: self.ignore_rollover,
        })
    }

    /// Read every event in the file.
    pub fn events(&self) -> Result<Vec<Event>, Error> {
        self.stream()?.collect()
    }
}

pub struct A1Stream {
    reader: BufReader<File>,
    legacy: bool,
    ignore_rollover: bool,
}

impl A1Stream {
    fn next_record(&mut self) -> Result<Option<Event>, Error> {
        loop {
            let first = match self.reader.read_u32::<LittleEndian>() {
                Ok(word) => word,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            let second = match self.reader.read_u32::<LittleEndian>() {
                Ok(word) => word,
                // half a record means the acquisition was cut mid-write
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(Error::TruncatedRecord)
                }
                Err(e) => return Err(e.into()),
            };
            let (high, low) = if self.legacy {
                (first, second)
            } else {
                (second, first)
            };
            if self.ignore_rollover && (low & ROLLOVER_FLAG) != 0 {
                continue;
            }
            let word = ((high as u64) << 32) | low as u64;
            return Ok(Some(unpack_event(word)));
        }
    }
}

impl Iterator for A1Stream {
    type Item = Result<Event, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Write events as a binary `.a1` file.
///
/// Events are consolidated into time-sorted 64-bit words first, matching the
/// layout the acquisition software produces. `legacy` swaps the two 32-bit
/// halves, mirroring what [`A1File`] expects when reading.
pub fn write_a1(path: &Path, events: &[Event], legacy: bool) -> Result<(), Error> {
    let mut writer = BufWriter::with_capacity(BUFFER_SIZE, File::create(path)?);
    for word in consolidate_events(events) {
        let (low, high) = (word as u32, (word >> 32) as u32);
        let (first, second) = if legacy { (high, low) } else { (low, high) };
        writer.write_u32::<LittleEndian>(first)?;
        writer.write_u32::<LittleEndian>(second)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn write_words(words: &[(u32, u32)]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for &(first, second) in words {
            file.write_all(&first.to_le_bytes()).unwrap();
            file.write_all(&second.to_le_bytes()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn record(tof: u64, pattern: u32) -> (u32, u32) {
        let word = (tof << 10) | pattern as u64;
        // low half first, as current firmware writes it
        (word as u32, (word >> 32) as u32)
    }

    fn read(file: &NamedTempFile, legacy: bool, ignore_rollover: bool) -> Result<Vec<Event>, Error> {
        A1File::new(file.path().to_path_buf(), legacy, ignore_rollover)?.events()
    }

    #[test]
    fn records_parse_to_tof_and_pattern() {
        let file = write_words(&[record(1000, 0b0001), record(2000, 0b1010)]);
        assert_eq!(
            read(&file, false, true).unwrap(),
            vec![
                Event { tof: 1000, pattern: 0b0001 },
                Event { tof: 2000, pattern: 0b1010 },
            ]
        );
    }

    #[test]
    fn legacy_files_swap_the_word_order() {
        let (low, high) = record(4096, 0b0100);
        let file = write_words(&[(high, low)]);
        assert_eq!(
            read(&file, true, true).unwrap(),
            vec![Event { tof: 4096, pattern: 0b0100 }]
        );
    }

    #[test]
    fn rollover_records_are_dropped_by_default() {
        let (low, high) = record(500, 0);
        let file = write_words(&[(low | ROLLOVER_FLAG, high), record(600, 0b0001)]);

        assert_eq!(
            read(&file, false, true).unwrap(),
            vec![Event { tof: 600, pattern: 0b0001 }]
        );
        assert_eq!(read(&file, false, false).unwrap().len(), 2);
    }

    #[test]
    fn a_dangling_half_record_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&0xDEADBEEFu32.to_le_bytes()).unwrap();
        file.flush().unwrap();

        assert!(matches!(read(&file, false, true), Err(Error::TruncatedRecord)));
    }

    #[test]
    fn missing_files_are_reported_up_front() {
        let result = A1File::new(PathBuf::from("/no/such/file.a1"), false, true);
        assert!(matches!(result, Err(Error::FileNotAvailable(_))));
    }

    #[test]
    fn written_files_read_back_identically() {
        let events = vec![
            Event { tof: 100, pattern: 0b0001 },
            Event { tof: 5_000_000_000, pattern: 0b1111 },
        ];
        for legacy in [false, true] {
            let file = NamedTempFile::new().unwrap();
            write_a1(file.path(), &events, legacy).unwrap();
            assert_eq!(read(&file, legacy, true).unwrap(), events);
        }
    }

    #[test]
    fn the_writer_sorts_out_of_order_events() {
        let events = vec![
            Event { tof: 900, pattern: 0b0010 },
            Event { tof: 100, pattern: 0b0001 },
        ];
        let file = NamedTempFile::new().unwrap();
        write_a1(file.path(), &events, false).unwrap();
        assert_eq!(
            read(&file, false, true).unwrap(),
            vec![
                Event { tof: 100, pattern: 0b0001 },
                Event { tof: 900, pattern: 0b0010 },
            ]
        );
    }
}
