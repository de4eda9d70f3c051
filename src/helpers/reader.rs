use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;

/// Byte source behind an open workbook: a local file or bytes already in memory.
pub(crate) enum SourceReader {
    Local(BufReader<File>),
    Memory(Cursor<Vec<u8>>),
}

impl SourceReader {
    /// Reads up to `N` leading bytes and rewinds, for container sniffing.
    pub(crate) fn peek_magic<const N: usize>(&mut self) -> std::io::Result<([u8; N], usize)> {
        let mut buffer = [0u8; N];
        let mut filled = 0usize;
        while filled < N {
            let count = self.read(&mut buffer[filled..])?;
            if count == 0 {
                break;
            }
            filled += count;
        }
        self.rewind()?;
        Ok((buffer, filled))
    }
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            SourceReader::Local(reader) => reader.read(buf),
            SourceReader::Memory(reader) => reader.read(buf),
        }
    }
}

impl Seek for SourceReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        match self {
            SourceReader::Local(reader) => reader.seek(pos),
            SourceReader::Memory(reader) => reader.seek(pos),
        }
    }
}
