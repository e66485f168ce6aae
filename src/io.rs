//! Transparent stream handling
//!
//! Every tool reads and writes through these two helpers: `-` means
//! stdin/stdout, gzip input is detected from the two magic bytes (not the
//! file name), and gzip output is selected by a `.gz` suffix.

use crate::errors::Result;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a path for reading, transparently handling stdin and gzip.
pub fn reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let mut file = BufReader::new(File::open(path)?);
    let magic = file.fill_buf()?;
    if magic.len() >= 2 && magic[..2] == GZIP_MAGIC {
        // MultiGzDecoder: bgzip and concatenated-member files decode fully
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(file))
    }
}

/// Open a path for writing, transparently handling stdout and gzip.
pub fn writer<P: AsRef<Path>>(path: P) -> Result<Box<dyn Write + Send>> {
    let path = path.as_ref();
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(path)?;
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(BufWriter::new(GzEncoder::new(
            file,
            Compression::default(),
        ))))
    } else {
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Read an entire stream to a string (used by small-table tools).
pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut buf = String::new();
    reader(path)?.read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn plain_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        std::fs::write(&path, "hello\nworld\n").unwrap();
        let mut lines = Vec::new();
        for line in reader(&path).unwrap().lines() {
            lines.push(line.unwrap());
        }
        assert_eq!(lines, vec!["hello", "world"]);
    }

    #[test]
    fn gzip_sniffed_by_magic_not_name() {
        let dir = tempfile::tempdir().unwrap();
        // Deliberately no .gz extension
        let path = dir.path().join("t.txt");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"compressed content\n").unwrap();
        enc.finish().unwrap();
        let got = read_to_string(&path).unwrap();
        assert_eq!(got, "compressed content\n");
    }

    #[test]
    fn gz_suffix_selects_gzip_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt.gz");
        {
            let mut w = writer(&path).unwrap();
            w.write_all(b"round trip\n").unwrap();
        }
        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &GZIP_MAGIC);
        assert_eq!(read_to_string(&path).unwrap(), "round trip\n");
    }
}
