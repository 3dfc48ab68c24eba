//! File-handle table (spec.md §3 FileHandle, §4.4.7, §5 External
//! Interfaces): maps a `BASIC` file number (`#1`, `#2`, ...) to an open
//! file and its mode. `Random`-mode files default to a 128-byte record
//! length, matching classic BASIC, unless `OPEN ... LEN = n` overrides it.

use rustc_hash::FxHashMap;
use sbasic_par::FileMode;
use sbasic_util::{BasicError, BasicResult, Span};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};

pub const DEFAULT_RECORD_LEN: usize = 128;

pub struct FileHandle {
    pub mode: FileMode,
    pub record_len: usize,
    file: File,
    reader_buf: Option<BufReader<File>>,
}

impl FileHandle {
    fn open(path: &str, mode: FileMode, record_len: usize, span: Span) -> BasicResult<Self> {
        let mut options = OpenOptions::new();
        match mode {
            FileMode::Input => {
                options.read(true);
            }
            FileMode::Output => {
                options.write(true).create(true).truncate(true);
            }
            FileMode::Append => {
                options.append(true).create(true);
            }
            FileMode::Binary | FileMode::Random => {
                options.read(true).write(true).create(true);
            }
        }
        let file = options
            .open(path)
            .map_err(|e| BasicError::io_error(format!("cannot open {path}: {e}"), span))?;
        Ok(FileHandle {
            mode,
            record_len,
            file,
            reader_buf: None,
        })
    }

    pub fn write_line(&mut self, text: &str, span: Span) -> BasicResult<()> {
        let mut writer = BufWriter::new(&self.file);
        writeln!(writer, "{text}").map_err(|e| BasicError::io_error(e.to_string(), span))?;
        writer
            .flush()
            .map_err(|e| BasicError::io_error(e.to_string(), span))
    }

    /// Writes raw text with no newline appended — `PRINT #n` already
    /// decides for itself whether the rendered line ends in one.
    pub fn write_text(&mut self, text: &str, span: Span) -> BasicResult<()> {
        let mut writer = BufWriter::new(&self.file);
        writer
            .write_all(text.as_bytes())
            .map_err(|e| BasicError::io_error(e.to_string(), span))?;
        writer
            .flush()
            .map_err(|e| BasicError::io_error(e.to_string(), span))
    }

    pub fn read_line(&mut self, span: Span) -> BasicResult<Option<String>> {
        use std::io::BufRead;
        if self.reader_buf.is_none() {
            let clone = self
                .file
                .try_clone()
                .map_err(|e| BasicError::io_error(e.to_string(), span))?;
            self.reader_buf = Some(BufReader::new(clone));
        }
        let reader = self.reader_buf.as_mut().unwrap();
        let mut line = String::new();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| BasicError::io_error(e.to_string(), span))?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    pub fn is_eof(&mut self, span: Span) -> BasicResult<bool> {
        let pos = self
            .file
            .stream_position()
            .map_err(|e| BasicError::io_error(e.to_string(), span))?;
        let len = self
            .file
            .metadata()
            .map_err(|e| BasicError::io_error(e.to_string(), span))?
            .len();
        Ok(pos >= len)
    }

    pub fn len(&self, span: Span) -> BasicResult<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| BasicError::io_error(e.to_string(), span))
    }

    pub fn position(&mut self, span: Span) -> BasicResult<u64> {
        self.file
            .stream_position()
            .map_err(|e| BasicError::io_error(e.to_string(), span))
    }

    /// `SEEK`: 1-based byte (or, for Random mode, record) position.
    pub fn seek_to(&mut self, position: u64, span: Span) -> BasicResult<()> {
        let offset = match self.mode {
            FileMode::Random => (position.saturating_sub(1)) * self.record_len as u64,
            _ => position.saturating_sub(1),
        };
        self.file
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(|e| BasicError::io_error(e.to_string(), span))
    }

    pub fn read_record(&mut self, record: Option<u64>, span: Span) -> BasicResult<Vec<u8>> {
        if let Some(r) = record {
            self.seek_to(r, span)?;
        }
        let mut buf = vec![0u8; self.record_len];
        self.file
            .read_exact(&mut buf)
            .map_err(|e| BasicError::io_error(e.to_string(), span))?;
        Ok(buf)
    }

    pub fn write_record(&mut self, record: Option<u64>, bytes: &[u8], span: Span) -> BasicResult<()> {
        if let Some(r) = record {
            self.seek_to(r, span)?;
        }
        let mut buf = vec![0u8; self.record_len];
        let n = bytes.len().min(self.record_len);
        buf[..n].copy_from_slice(&bytes[..n]);
        self.file
            .write_all(&buf)
            .map_err(|e| BasicError::io_error(e.to_string(), span))
    }
}

/// The open-file table (spec.md §3 FileHandle), keyed by the BASIC file
/// number a program names in `#n`.
#[derive(Default)]
pub struct FileTable {
    handles: FxHashMap<i32, FileHandle>,
    /// Channel `#0` is the classic BASIC convention for the console's input
    /// stream: always readable without an `OPEN`, so `DO WHILE NOT
    /// EOF(0): LINE INPUT #0, L$: LOOP` can drain piped stdin in a batch
    /// script (spec.md §8 S6). Lazily created on first use since most
    /// programs never touch it.
    console: Option<BufReader<std::io::Stdin>>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn console_reader(&mut self) -> &mut BufReader<std::io::Stdin> {
        self.console.get_or_insert_with(|| BufReader::new(std::io::stdin()))
    }

    pub fn console_is_eof(&mut self) -> bool {
        matches!(self.console_reader().fill_buf(), Ok(buf) if buf.is_empty())
    }

    pub fn console_read_line(&mut self, span: Span) -> BasicResult<Option<String>> {
        let mut line = String::new();
        let n = self
            .console_reader()
            .read_line(&mut line)
            .map_err(|e| BasicError::io_error(e.to_string(), span))?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    pub fn open(
        &mut self,
        number: i32,
        path: &str,
        mode: FileMode,
        record_len: Option<usize>,
        span: Span,
    ) -> BasicResult<()> {
        if self.handles.contains_key(&number) {
            return Err(BasicError::io_error(
                format!("file #{number} already open"),
                span,
            ));
        }
        let record_len = record_len.unwrap_or(DEFAULT_RECORD_LEN);
        let handle = FileHandle::open(path, mode, record_len, span)?;
        self.handles.insert(number, handle);
        Ok(())
    }

    pub fn close(&mut self, number: i32) {
        self.handles.remove(&number);
    }

    pub fn close_all(&mut self) {
        self.handles.clear();
    }

    pub fn get_mut(&mut self, number: i32, span: Span) -> BasicResult<&mut FileHandle> {
        self.handles
            .get_mut(&number)
            .ok_or_else(|| BasicError::io_error(format!("file #{number} is not open"), span))
    }

    /// `FREEFILE`: the lowest unused file number, 1-based.
    pub fn free_file(&self) -> i32 {
        let mut n = 1;
        while self.handles.contains_key(&n) {
            n += 1;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn open_write_read_round_trip() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap().to_string();
        let mut table = FileTable::new();
        table
            .open(1, &path, FileMode::Output, None, Span::DUMMY)
            .unwrap();
        table
            .get_mut(1, Span::DUMMY)
            .unwrap()
            .write_line("hello", Span::DUMMY)
            .unwrap();
        table.close(1);

        table
            .open(1, &path, FileMode::Input, None, Span::DUMMY)
            .unwrap();
        let line = table.get_mut(1, Span::DUMMY).unwrap().read_line(Span::DUMMY).unwrap();
        assert_eq!(line, Some("hello".to_string()));
    }

    #[test]
    fn free_file_finds_lowest_unused_number() {
        let table = FileTable::new();
        assert_eq!(table.free_file(), 1);
    }
}
