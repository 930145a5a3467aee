//! Branch traces.

pub mod synthetic;
pub use synthetic::*;

use std::path::Path;
use log::debug;

use crate::branch::*;
use crate::error::TraceError;

/// Size of a single record in a binary trace.
///
/// Each record is a little-endian `pc: u64`, `tgt: u64`, `flags: u32`,
/// followed by four bytes of padding.
pub const RECORD_SIZE: usize = 24;

/// Iterate over a list of trace files, loading one at a time.
pub struct BinaryTraceSet {
    /// A list of filenames
    pub files: Vec<String>,

    cur: usize,
}
impl BinaryTraceSet {
    pub fn new_from_slice(strings: &[String]) -> Self {
        let mut files = Vec::new();
        files.extend_from_slice(strings);
        Self { files, cur: 0 }
    }

    pub fn add_file(&mut self, s: impl ToString) {
        self.files.push(s.to_string());
    }
}
impl Iterator for BinaryTraceSet {
    type Item = Result<BinaryTrace, TraceError>;
    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.get(self.cur)?;
        self.cur += 1;
        Some(BinaryTrace::from_file(path))
    }
}


/// A binary trace of branch records.
#[derive(Debug)]
pub struct BinaryTrace {
    pub name: String,
    records: Vec<BranchRecord>,
}
impl BinaryTrace {

    /// Load a [BinaryTrace] from a file, named after the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path.file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let trace = Self::from_bytes(&name, &data)?;
        debug!("loaded {} records from {}", trace.num_entries(),
            path.display());
        Ok(trace)
    }

    /// Decode a trace from raw bytes.
    pub fn from_bytes(name: &str, data: &[u8]) -> Result<Self, TraceError> {
        if data.len() % RECORD_SIZE != 0 {
            return Err(TraceError::Truncated {
                len: data.len(), record_size: RECORD_SIZE
            });
        }
        let records = data.chunks_exact(RECORD_SIZE).enumerate()
            .map(|(index, chunk)| Self::decode(index, chunk))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { name: name.to_string(), records })
    }

    pub fn from_records(name: &str, records: Vec<BranchRecord>) -> Self {
        Self { name: name.to_string(), records }
    }

    fn decode(index: usize, chunk: &[u8]) -> Result<BranchRecord, TraceError> {
        let mut pc = [0u8; 8];
        let mut tgt = [0u8; 8];
        let mut flags = [0u8; 4];
        pc.copy_from_slice(&chunk[0..8]);
        tgt.copy_from_slice(&chunk[8..16]);
        flags.copy_from_slice(&chunk[16..20]);

        let flags = BranchFlags(u32::from_le_bytes(flags));
        if let Err(bits) = flags.kind() {
            return Err(TraceError::InvalidFlags { index, flags: bits });
        }
        Ok(BranchRecord {
            pc: u64::from_le_bytes(pc) as usize,
            tgt: u64::from_le_bytes(tgt) as usize,
            flags,
        })
    }

    /// Encode records in the binary trace format.
    pub fn encode(records: &[BranchRecord]) -> Vec<u8> {
        let mut res = Vec::with_capacity(records.len() * RECORD_SIZE);
        for r in records {
            res.extend_from_slice(&(r.pc as u64).to_le_bytes());
            res.extend_from_slice(&(r.tgt as u64).to_le_bytes());
            res.extend_from_slice(&r.flags.0.to_le_bytes());
            res.extend_from_slice(&[0; 4]);
        }
        res
    }

    /// Return the number of records
    pub fn num_entries(&self) -> usize { self.records.len() }

    pub fn name(&self) -> &str { &self.name }

    /// Return a truncated slice of records
    pub fn as_slice_trunc(&self, limit: usize) -> &[BranchRecord] {
        &self.records[..limit.min(self.records.len())]
    }

    /// Return a slice of records.
    pub fn as_slice(&self) -> &[BranchRecord] {
        &self.records
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn records() -> Vec<BranchRecord> {
        vec![
            BranchRecord::conditional(0x4000_1000, 0x4000_1040, Outcome::T),
            BranchRecord::jump(0x4000_1044, 0x4000_2000),
            BranchRecord::new(0x4000_2010, 0x4000_1048, BranchKind::Return,
                Outcome::T),
            BranchRecord::conditional(0x4000_1000, 0x4000_1040, Outcome::N),
        ]
    }

    #[test]
    fn decodes_encoded_records() {
        let bytes = BinaryTrace::encode(&records());
        assert_eq!(bytes.len(), 4 * RECORD_SIZE);
        let trace = BinaryTrace::from_bytes("t", &bytes).unwrap();
        assert_eq!(trace.as_slice(), records().as_slice());
        assert_eq!(trace.as_slice_trunc(2).len(), 2);
        assert_eq!(trace.as_slice_trunc(100).len(), 4);
    }

    #[test]
    fn rejects_partial_records() {
        let bytes = BinaryTrace::encode(&records());
        let err = BinaryTrace::from_bytes("t", &bytes[..30]).unwrap_err();
        assert!(matches!(err, TraceError::Truncated { len: 30, .. }));
    }

    #[test]
    fn rejects_unknown_flags() {
        let mut bytes = BinaryTrace::encode(&records());
        // Mark the second record as both a jump and a call
        bytes[RECORD_SIZE + 16] = 0b0000_0110;
        let err = BinaryTrace::from_bytes("t", &bytes).unwrap_err();
        assert!(matches!(err,
            TraceError::InvalidFlags { index: 1, flags: 0b0110 }));
    }

    #[test]
    fn loads_from_files() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&BinaryTrace::encode(&records())).unwrap();
        let path = f.path().to_string_lossy().into_owned();

        let mut set = BinaryTraceSet::new_from_slice(&[path.clone()]);
        set.add_file("/nonexistent/trace.bin");
        let trace = set.next().unwrap().unwrap();
        assert_eq!(trace.num_entries(), 4);
        assert!(path.ends_with(trace.name()));
        assert!(matches!(set.next(), Some(Err(TraceError::Io(_)))));
        assert!(set.next().is_none());
    }
}
