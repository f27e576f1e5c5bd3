//! Header-row delimiter sniffing
//!
//! Counts literal occurrences of each candidate delimiter in the first line.
//! Quoted fields are not understood: a delimiter inside quotes still counts and
//! still splits.

use serde::{Deserialize, Serialize};

/// Candidate delimiters in priority order; earlier entries win ties
pub const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '|', ':'];

/// Headers split from the first line of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SniffedHeaders {
    pub delimiter: char,
    pub headers: Vec<String>,
}

/// Return the first line of `text`, without its line terminator
pub fn header_line(text: &str) -> &str {
    let line = match text.find('\n') {
        Some(end) => &text[..end],
        None => text,
    };
    line.strip_suffix('\r').unwrap_or(line)
}

/// Pick the candidate with the strictly highest count in `line`
pub fn detect_delimiter(line: &str) -> Option<char> {
    let mut best = None;
    let mut best_count = 0usize;

    for candidate in CANDIDATE_DELIMITERS {
        let count = line.matches(candidate).count();
        if count > best_count {
            best_count = count;
            best = Some(candidate);
        }
    }

    best
}

/// Detect the delimiter of the header line and split it into names
pub fn sniff_headers(text: &str) -> Option<SniffedHeaders> {
    let line = header_line(text);
    let delimiter = detect_delimiter(line)?;
    let headers = line.split(delimiter).map(str::to_string).collect();
    Some(SniffedHeaders { delimiter, headers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_beats_comma() {
        let sniffed = sniff_headers("a,b;c;d\n1;2;3").unwrap();
        assert_eq!(sniffed.delimiter, ';');
        assert_eq!(sniffed.headers, vec!["a,b", "c", "d"]);
    }

    #[test]
    fn test_tie_goes_to_earlier_candidate() {
        let sniffed = sniff_headers("a,b,c;d;e").unwrap();
        assert_eq!(sniffed.delimiter, ',');
        assert_eq!(sniffed.headers, vec!["a", "b", "c;d;e"]);
    }

    #[test]
    fn test_no_delimiter_aborts() {
        assert_eq!(detect_delimiter("singlecolumn"), None);
        assert!(sniff_headers("singlecolumn\nvalue").is_none());
        assert!(sniff_headers("").is_none());
    }

    #[test]
    fn test_only_first_line_is_counted() {
        let sniffed = sniff_headers("name|city\nx;y;z;w;v").unwrap();
        assert_eq!(sniffed.delimiter, '|');
        assert_eq!(sniffed.headers, vec!["name", "city"]);
    }

    #[test]
    fn test_crlf_is_stripped() {
        let sniffed = sniff_headers("street:city:zip\r\n1:2:3\r\n").unwrap();
        assert_eq!(sniffed.headers, vec!["street", "city", "zip"]);
    }

    #[test]
    fn test_quoted_fields_are_not_special() {
        let sniffed = sniff_headers("\"a,b\";c").unwrap();
        assert_eq!(sniffed.delimiter, ',');
        assert_eq!(sniffed.headers, vec!["\"a", "b\";c"]);
    }

    #[test]
    fn test_empty_segments_are_kept() {
        let sniffed = sniff_headers("a,,b,").unwrap();
        assert_eq!(sniffed.headers, vec!["a", "", "b", ""]);
    }
}
