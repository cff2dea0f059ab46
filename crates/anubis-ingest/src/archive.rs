//! The batch adapter: line-delimited JSON archive dumps.
//!
//! Archives are read one line at a time, never whole. One broken archive
//! (missing file, network error, a malformed line) is logged and skipped; the
//! remaining archives are still read.

use std::{collections::VecDeque, mem, path::Path};

use anubis_core::ArchiveRecord;
use reqwest::{Client, Response};
use tokio::{
  fs::File,
  io::{AsyncBufReadExt as _, BufReader, Lines},
};

use crate::{Result, location::Location};

/// Capacity kept by the carry-over buffer between network chunks.
const RETAINED_CARRY: usize = 64 * 1024;

// ─── Line sources ────────────────────────────────────────────────────────────

/// Reassembles lines from arbitrarily cut byte chunks.
#[derive(Default)]
struct LineSplitter {
  /// Bytes of a line that is not yet complete.
  carry: Vec<u8>,
  ready: VecDeque<String>,
}

impl LineSplitter {
  /// Append a chunk and move every completed line into `ready`.
  fn absorb(&mut self, chunk: &[u8]) -> Result<()> {
    self.carry.extend_from_slice(chunk);

    if let Some(last_newline) = self.carry.iter().rposition(|b| *b == b'\n') {
      let complete: Vec<u8> = self.carry.drain(..=last_newline).collect();
      for line in complete[..last_newline].split(|b| *b == b'\n') {
        self.ready.push_back(String::from_utf8(line.to_vec())?);
      }
    }

    self.carry.shrink_to(RETAINED_CARRY);
    Ok(())
  }

  /// Flush a final line that had no trailing newline.
  fn finish(&mut self) -> Result<()> {
    if !self.carry.is_empty() {
      let tail = mem::take(&mut self.carry);
      self.ready.push_back(String::from_utf8(tail)?);
    }
    Ok(())
  }

  fn pop(&mut self) -> Option<String> { self.ready.pop_front() }
}

/// Splits an HTTP body into lines as chunks arrive.
struct ChunkedLines {
  response: Response,
  splitter: LineSplitter,
  done:     bool,
}

impl ChunkedLines {
  fn new(response: Response) -> Self {
    Self { response, splitter: LineSplitter::default(), done: false }
  }

  async fn next_line(&mut self) -> Result<Option<String>> {
    loop {
      if let Some(line) = self.splitter.pop() {
        return Ok(Some(line));
      }
      if self.done {
        return Ok(None);
      }

      match self.response.chunk().await? {
        Some(chunk) => self.splitter.absorb(&chunk)?,
        None => {
          self.done = true;
          self.splitter.finish()?;
        }
      }
    }
  }
}

enum LineSource {
  File(Lines<BufReader<File>>),
  Http(ChunkedLines),
}

impl LineSource {
  async fn open(http: &Client, location: &Location) -> Result<Self> {
    match location {
      Location::Local(path) => Ok(Self::File(open_file(path).await?)),
      Location::Remote(url) => {
        let response = http.get(url).send().await?.error_for_status()?;
        Ok(Self::Http(ChunkedLines::new(response)))
      }
    }
  }

  async fn next_line(&mut self) -> Result<Option<String>> {
    match self {
      Self::File(lines) => Ok(lines.next_line().await?),
      Self::Http(lines) => lines.next_line().await,
    }
  }
}

async fn open_file(path: &Path) -> Result<Lines<BufReader<File>>> {
  let file = File::open(path).await?;
  Ok(BufReader::new(file).lines())
}

/// An archive that is currently being read.
struct OpenArchive {
  location: Location,
  lines:    LineSource,
  line_no:  usize,
  records:  usize,
}

impl OpenArchive {
  async fn next_record(&mut self) -> Result<Option<ArchiveRecord>> {
    while let Some(line) = self.lines.next_line().await? {
      self.line_no += 1;
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      let record: ArchiveRecord = serde_json::from_str(line)?;
      self.records += 1;
      return Ok(Some(record));
    }
    Ok(None)
  }
}

// ─── Reader ──────────────────────────────────────────────────────────────────

/// Yields the records of several archives, one archive after another.
pub struct ArchiveReader {
  http:     Client,
  pending:  VecDeque<Location>,
  current:  Option<OpenArchive>,
  failures: usize,
}

impl ArchiveReader {
  pub fn new(locations: impl IntoIterator<Item = Location>) -> Result<Self> {
    Ok(Self::with_client(Client::builder().build()?, locations))
  }

  pub fn with_client(http: Client, locations: impl IntoIterator<Item = Location>) -> Self {
    Self {
      http,
      pending: locations.into_iter().collect(),
      current: None,
      failures: 0,
    }
  }

  /// Number of archives abandoned because of an error so far.
  pub fn failures(&self) -> usize { self.failures }

  /// Pull the next record. Returns `None` once every archive has been read
  /// or abandoned; errors are logged here and never surface to the caller.
  pub async fn next(&mut self) -> Option<ArchiveRecord> {
    loop {
      if self.current.is_none() {
        let location = self.pending.pop_front()?;
        match LineSource::open(&self.http, &location).await {
          Ok(lines) => {
            tracing::info!(%location, "reading archive");
            self.current = Some(OpenArchive { location, lines, line_no: 0, records: 0 });
          }
          Err(error) => {
            tracing::warn!(%location, %error, "could not open archive; skipping it");
            self.failures += 1;
            continue;
          }
        }
      }

      let archive = self.current.as_mut()?;
      match archive.next_record().await {
        Ok(Some(record)) => return Some(record),
        Ok(None) => {
          tracing::info!(
            location = %archive.location,
            records = archive.records,
            "finished archive"
          );
          self.current = None;
        }
        Err(error) => {
          tracing::warn!(
            location = %archive.location,
            line = archive.line_no,
            records = archive.records,
            %error,
            "archive failed; skipping the rest of it"
          );
          self.failures += 1;
          self.current = None;
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn write(dir: &Path, name: &str, contents: &str) -> Location {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    Location::Local(path)
  }

  async fn drain(reader: &mut ArchiveReader) -> Vec<String> {
    let mut ids = vec![];
    while let Some(record) = reader.next().await {
      ids.push(record.id().unwrap_or("<none>").to_owned());
    }
    ids
  }

  #[tokio::test]
  async fn reads_every_archive_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "a.ndjson", "{\"id\":\"a1\"}\n{\"id\":\"a2\"}\n");
    let second = write(dir.path(), "b.ndjson", "\n{\"id\":\"b1\"}\r\n\n{\"id\":\"b2\"}");

    let mut reader = ArchiveReader::new([first, second]).unwrap();
    assert_eq!(drain(&mut reader).await, ["a1", "a2", "b1", "b2"]);
    assert_eq!(reader.failures(), 0);
  }

  #[tokio::test]
  async fn malformed_archive_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write(dir.path(), "broken.ndjson", "{\"id\":\"x1\"}\nnot json at all\n{\"id\":\"x2\"}\n");
    let good = write(dir.path(), "good.ndjson", "{\"id\":\"g1\"}\n{\"id\":\"g2\"}\n{\"id\":\"g3\"}\n");

    let mut reader = ArchiveReader::new([broken, good]).unwrap();
    let ids = drain(&mut reader).await;

    // The broken archive is abandoned at its bad line.
    assert_eq!(ids, ["x1", "g1", "g2", "g3"]);
    assert_eq!(reader.failures(), 1);
  }

  #[tokio::test]
  async fn missing_archive_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let missing = Location::Local(dir.path().join("nope.ndjson"));
    let good = write(dir.path(), "good.ndjson", "{\"id\":\"g1\"}\n");

    let mut reader = ArchiveReader::new([missing, good]).unwrap();
    assert_eq!(drain(&mut reader).await, ["g1"]);
    assert_eq!(reader.failures(), 1);
  }

  #[tokio::test]
  async fn non_object_line_fails_the_archive() {
    let dir = tempfile::tempdir().unwrap();
    let odd = write(dir.path(), "odd.ndjson", "[1, 2, 3]\n{\"id\":\"never\"}\n");

    let mut reader = ArchiveReader::new([odd]).unwrap();
    assert!(drain(&mut reader).await.is_empty());
    assert_eq!(reader.failures(), 1);
  }

  #[test]
  fn splitter_reassembles_lines_across_chunks() {
    let mut splitter = LineSplitter::default();
    splitter.absorb(b"{\"id\":").unwrap();
    assert!(splitter.pop().is_none());

    splitter.absorb(b"\"a\"}\n{\"id\"").unwrap();
    assert_eq!(splitter.pop().as_deref(), Some("{\"id\":\"a\"}"));
    assert!(splitter.pop().is_none());

    splitter.absorb(b":\"b\"}\n\n{\"id\":\"c\"}").unwrap();
    splitter.finish().unwrap();
    assert_eq!(splitter.pop().as_deref(), Some("{\"id\":\"b\"}"));
    assert_eq!(splitter.pop().as_deref(), Some(""));
    assert_eq!(splitter.pop().as_deref(), Some("{\"id\":\"c\"}"));
    assert!(splitter.pop().is_none());
    assert!(splitter.carry.is_empty());
  }

  #[test]
  fn splitter_rejects_invalid_utf8() {
    let mut splitter = LineSplitter::default();
    assert!(splitter.absorb(b"\xff\xfe\n").is_err());
  }

  #[tokio::test]
  async fn empty_reader_yields_nothing() {
    let mut reader = ArchiveReader::new([]).unwrap();
    assert!(reader.next().await.is_none());
  }
}
