//! Append-only JSONL command journal with a SHA-256 hash chain.
//!
//! Line 1 is a header carrying `format_version`, `build_id`, `content_hash` and `seed`. Each
//! following line is one accepted command plus `prev_sha256_hex` and `sha256_hex`, where the
//! record hash covers the record body and the previous hash. Every append is flushed so an
//! interrupted session leaves a loadable prefix behind.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::journal::{InputJournal, InputRecord, JOURNAL_FORMAT_VERSION};
use crate::types::Command;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct FileHeader {
    format_version: u16,
    build_id: String,
    content_hash: u64,
    seed: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct FileRecord {
    seq: u64,
    payload: Command,
    prev_sha256_hex: String,
    sha256_hex: String,
}

const INITIAL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

impl FileRecord {
    /// Builds the record for `payload` at `seq`, chained onto `prev_sha256_hex`.
    ///
    /// The hash covers the JSON of `{seq, payload}` followed by the previous hash.
    fn seal(seq: u64, payload: Command, prev_sha256_hex: &str) -> serde_json::Result<Self> {
        #[derive(Serialize)]
        struct Body<'a> {
            seq: u64,
            payload: &'a Command,
        }

        let body = serde_json::to_string(&Body { seq, payload: &payload })?;
        let digest = Sha256::new()
            .chain_update(body.as_bytes())
            .chain_update(prev_sha256_hex.as_bytes())
            .finalize();
        Ok(Self {
            seq,
            payload,
            prev_sha256_hex: prev_sha256_hex.to_string(),
            sha256_hex: format!("{digest:064x}"),
        })
    }
}

pub struct JournalWriter {
    writer: BufWriter<File>,
    last_sha256_hex: String,
    next_seq: u64,
}

impl JournalWriter {
    /// Creates (or truncates) the journal at `path` and writes its header.
    pub fn create(path: &Path, seed: u64, build_id: &str, content_hash: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let header = FileHeader {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: build_id.to_string(),
            content_hash,
            seed,
        };
        let mut journal = Self {
            writer: BufWriter::new(File::create(path)?),
            last_sha256_hex: INITIAL_HASH.to_string(),
            next_seq: 0,
        };
        journal.write_line(&header)?;
        Ok(journal)
    }

    /// Continues a journal previously read with [`load_journal_from_file`].
    pub fn resume(path: &Path, loaded: &LoadedJournal) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            last_sha256_hex: loaded.last_sha256_hex.clone(),
            next_seq: loaded.next_seq,
        })
    }

    pub fn append(&mut self, payload: &Command) -> io::Result<()> {
        let record = FileRecord::seal(self.next_seq, payload.clone(), &self.last_sha256_hex)
            .map_err(io::Error::other)?;
        self.write_line(&record)?;
        self.last_sha256_hex = record.sha256_hex;
        self.next_seq += 1;
        Ok(())
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, value).map_err(io::Error::other)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: InputJournal,
    /// Hash of the last record, or the all-zero hash for a header-only file.
    pub last_sha256_hex: String,
    pub next_seq: u64,
}

#[derive(Debug, Error)]
pub enum JournalLoadError {
    #[error("journal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("journal file is empty")]
    EmptyFile,

    #[error("invalid journal header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },

    #[error("unsupported journal format version {0}")]
    UnsupportedVersion(u16),

    #[error("invalid journal record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    /// The file ends without a trailing newline.
    #[error("incomplete journal line at line {line}")]
    IncompleteLine { line: usize },

    #[error("SHA-256 hash chain broken at line {line}")]
    HashChainBroken { line: usize },
}

/// Reads and verifies a journal, failing on the first bad line.
pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalLoadError> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines().zip(1usize..);
    let Some((header_line, _)) = lines.next() else {
        return Err(JournalLoadError::EmptyFile);
    };
    if !content.ends_with('\n') {
        return Err(JournalLoadError::IncompleteLine { line: content.lines().count() });
    }

    let header: FileHeader = serde_json::from_str(header_line)
        .map_err(|e| JournalLoadError::InvalidHeader { line: 1, message: e.to_string() })?;
    if header.format_version != JOURNAL_FORMAT_VERSION {
        return Err(JournalLoadError::UnsupportedVersion(header.format_version));
    }

    let mut loaded = LoadedJournal {
        journal: InputJournal {
            format_version: header.format_version,
            build_id: header.build_id,
            content_hash: header.content_hash,
            seed: header.seed,
            inputs: Vec::new(),
        },
        last_sha256_hex: INITIAL_HASH.to_string(),
        next_seq: 0,
    };
    for (text, line) in lines {
        loaded.accept(text, line)?;
    }

    tracing::debug!("loaded journal {} with {} inputs", path.display(), loaded.journal.len());
    Ok(loaded)
}

impl LoadedJournal {
    /// Checks one record line against the chain so far and adds it to the journal.
    fn accept(&mut self, text: &str, line: usize) -> Result<(), JournalLoadError> {
        let invalid = |message: String| JournalLoadError::InvalidRecord { line, message };
        if text.is_empty() {
            return Err(invalid("empty line".to_string()));
        }

        let record: FileRecord = serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?;
        if record.seq != self.next_seq {
            return Err(invalid(format!("expected seq {}, found {}", self.next_seq, record.seq)));
        }
        let expected = FileRecord::seal(record.seq, record.payload.clone(), &self.last_sha256_hex)
            .map_err(|e| invalid(e.to_string()))?;
        if record != expected {
            return Err(JournalLoadError::HashChainBroken { line });
        }

        self.journal.inputs.push(InputRecord { seq: record.seq, payload: record.payload });
        self.last_sha256_hex = record.sha256_hex;
        self.next_seq += 1;
        Ok(())
    }
}
