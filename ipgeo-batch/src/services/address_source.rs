//! Address input
//!
//! Newline-delimited text from a file or stdin, or one manually entered
//! address. Lines are trimmed and blank lines skipped; an empty path segment
//! would otherwise make the service report the caller's own address.

use crate::error::{Error, Result};
use crate::models::AddressRecord;
use std::io::{self, BufRead, Read};
use std::path::{Path, PathBuf};

/// Parse newline-delimited addresses, keeping order and duplicates
pub fn parse_addresses(text: &str) -> Vec<AddressRecord> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(AddressRecord::new)
        .collect()
}

/// Read addresses from a text file; `-` reads standard input
pub fn read_addresses(path: &Path) -> Result<Vec<AddressRecord>> {
    let input_error = |source| Error::Input {
        path: path.to_path_buf(),
        source,
    };

    let text = if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().lock().read_to_string(&mut text).map_err(input_error)?;
        text
    } else {
        std::fs::read_to_string(path).map_err(input_error)?
    };

    let addresses = parse_addresses(&text);
    tracing::info!(
        path = %path.display(),
        count = addresses.len(),
        "Loaded addresses"
    );
    Ok(addresses)
}

/// Read addresses from any buffered reader
pub fn read_addresses_from<R: BufRead>(reader: R) -> Result<Vec<AddressRecord>> {
    let mut addresses = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|source| Error::Input {
            path: PathBuf::from("<reader>"),
            source,
        })?;
        let line = line.trim();
        if !line.is_empty() {
            addresses.push(AddressRecord::new(line));
        }
    }
    Ok(addresses)
}

/// Single manually entered address; blank input is rejected
pub fn manual_address(input: &str) -> Result<AddressRecord> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(AddressRecord::new(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let addresses = parse_addresses("1.1.1.1\r\n\n  8.8.8.8 \n1.1.1.1\n");
        let texts: Vec<&str> = addresses.iter().map(AddressRecord::as_str).collect();
        assert_eq!(texts, vec!["1.1.1.1", "8.8.8.8", "1.1.1.1"]);
    }

    #[test]
    fn test_read_from_reader() {
        let addresses = read_addresses_from(Cursor::new("9.9.9.9\n\n2001:4860:4860::8888\n")).unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[1].as_str(), "2001:4860:4860::8888");
    }

    #[test]
    fn test_read_file_and_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ips.txt");
        std::fs::write(&path, "1.1.1.1\n8.8.8.8\n").unwrap();
        assert_eq!(read_addresses(&path).unwrap().len(), 2);

        let missing = dir.path().join("missing.txt");
        assert!(matches!(read_addresses(&missing), Err(Error::Input { .. })));
    }

    #[test]
    fn test_manual_address() {
        assert_eq!(manual_address("  1.1.1.1 ").unwrap().as_str(), "1.1.1.1");
        assert!(matches!(manual_address("   "), Err(Error::EmptyInput)));
    }
}
