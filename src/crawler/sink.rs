//! Side-channel link buckets and the crawl log
//!
//! Out-of-scope links are appended, raw, to daily files in the crawled
//! domain's folder (`<yymmdd>_ext-links.txt`, `_telephones.txt`,
//! `_mails.txt`, `_files.txt`). Crawl events go to `crawler.log`.
//!
//! Every line is written with a single `write_all` on a file opened in
//! append mode, so concurrent writers never interleave partial lines.
//! Write failures are reported through `tracing` and otherwise ignored.
//!
//! Writes are blocking `std::fs` calls made from async crawl tasks. Each
//! one opens a local file and appends a single short line, so callers do
//! not move them onto the blocking pool.

use crate::url::LinkBucket;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const CRAWL_LOG_FILE: &str = "crawler.log";

/// Append-only writer for one domain's side outputs
#[derive(Debug, Clone)]
pub struct LinkSink {
    folder: PathBuf,
    write_logs: bool,
}

impl LinkSink {
    /// Creates a sink writing into `folder`, creating it if needed
    ///
    /// A folder that cannot be created is not an error: later writes fail
    /// individually and are logged.
    pub fn new(folder: impl Into<PathBuf>, write_logs: bool) -> Self {
        let folder = folder.into();
        if let Err(e) = std::fs::create_dir_all(&folder) {
            tracing::warn!(folder = %folder.display(), error = %e, "Cannot create output folder");
        }
        Self { folder, write_logs }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Path of today's file for a bucket
    pub fn bucket_path(&self, bucket: LinkBucket) -> PathBuf {
        let today = Local::now().format("%y%m%d");
        self.folder
            .join(format!("{}{}", today, bucket.file_suffix()))
    }

    pub fn log_path(&self) -> PathBuf {
        self.folder.join(CRAWL_LOG_FILE)
    }

    /// Appends a raw link to its bucket file
    pub fn record(&self, bucket: LinkBucket, link: &str) {
        let path = self.bucket_path(bucket);
        if let Err(e) = append_line(&path, link) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to record link");
        }
    }

    /// Appends a timestamped line to the crawl log
    pub fn log(&self, message: &str) {
        if !self.write_logs {
            return;
        }

        let line = format!(
            "{} [crawler] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
            message
        );
        let path = self.log_path();
        if let Err(e) = append_line(&path, &line) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write crawl log");
        }
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut buf = String::with_capacity(line.len() + 1);
    buf.push_str(line);
    buf.push('\n');
    file.write_all(buf.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_appends_raw_links() {
        let dir = TempDir::new().unwrap();
        let sink = LinkSink::new(dir.path(), true);

        sink.record(LinkBucket::External, "http://other.onion/x");
        sink.record(LinkBucket::External, "http://other.onion/x");
        sink.record(LinkBucket::Telephone, "tel:123");

        let external = std::fs::read_to_string(sink.bucket_path(LinkBucket::External)).unwrap();
        assert_eq!(external, "http://other.onion/x\nhttp://other.onion/x\n");

        let phones = std::fs::read_to_string(sink.bucket_path(LinkBucket::Telephone)).unwrap();
        assert_eq!(phones, "tel:123\n");

        assert!(!sink.bucket_path(LinkBucket::Mail).exists());
    }

    #[test]
    fn test_bucket_file_names() {
        let dir = TempDir::new().unwrap();
        let sink = LinkSink::new(dir.path(), true);
        let name = sink
            .bucket_path(LinkBucket::File)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();

        assert!(name.ends_with("_files.txt"));
        assert_eq!(name.len(), "yymmdd_files.txt".len());
    }

    #[test]
    fn test_log_disabled() {
        let dir = TempDir::new().unwrap();
        let sink = LinkSink::new(dir.path(), false);
        sink.log("should not appear");
        assert!(!sink.log_path().exists());
    }

    #[test]
    fn test_log_lines() {
        let dir = TempDir::new().unwrap();
        let sink = LinkSink::new(dir.path(), true);
        sink.log("first");
        sink.log("second");

        let log = std::fs::read_to_string(sink.log_path()).unwrap();
        let lines: Vec<_> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[crawler] first"));
        assert!(lines[1].ends_with("[crawler] second"));
    }

    #[test]
    fn test_unwritable_folder_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a folder").unwrap();

        let sink = LinkSink::new(blocker.join("domain"), true);
        sink.record(LinkBucket::Mail, "mailto:x@y.onion");
        sink.log("still fine");
    }
}
