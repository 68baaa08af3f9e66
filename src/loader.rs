use std::borrow::Cow;
use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::text::RawRow;

/// Reads the article export, trying each encoding label in order until one
/// decodes cleanly and parses as CSV.
pub fn load_rows(path: &Path, encodings: &[String], delimiter: u8) -> Result<Vec<RawRow>, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (rows, encoding) = decode_rows(&bytes, encodings, delimiter)?.ok_or_else(|| {
        LoadError::Undecodable {
            path: path.to_path_buf(),
            tried: encodings.to_vec(),
        }
    })?;
    info!(path = ?path, encoding = encoding.name(), rows = rows.len(), "loaded rows");
    Ok(rows)
}

/// `Ok(None)` when every encoding failed; `Err` only for an unknown label.
pub fn decode_rows(
    bytes: &[u8],
    encodings: &[String],
    delimiter: u8,
) -> Result<Option<(Vec<RawRow>, &'static Encoding)>, LoadError> {
    for label in encodings {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| LoadError::UnknownEncoding(label.clone()))?;
        let Some(text) = decode_strict(bytes, encoding) else {
            debug!(encoding = encoding.name(), "malformed input, trying next encoding");
            continue;
        };
        match parse_rows(&text, delimiter) {
            Ok(rows) => return Ok(Some((rows, encoding))),
            Err(err) => {
                debug!(encoding = encoding.name(), error = %err, "csv parse failed, trying next encoding");
            }
        }
    }
    Ok(None)
}

/// Short rows are padded and long rows cut to the header width, so a ragged
/// row degrades to empty fields instead of failing the file.
pub fn parse_rows(text: &str, delimiter: u8) -> Result<Vec<RawRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    reader
        .records()
        .map(|record| {
            let mut record = record?;
            record.truncate(headers.len());
            while record.len() < headers.len() {
                record.push_field("");
            }
            record.deserialize::<RawRow>(Some(&headers))
        })
        .collect()
}

fn decode_strict<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };
    encoding.decode_without_bom_handling_and_without_replacement(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const CSV: &str = "title,content,url,date,account\n地理学院支教队招募,甘肃临夏,https://a/1,2024-11-01,地理支教\n";

    #[test]
    fn utf8_with_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(CSV.as_bytes());
        let (rows, enc) = decode_rows(&bytes, &labels(&["utf-8", "gbk"]), b',')
            .unwrap()
            .unwrap();
        assert_eq!(enc, encoding_rs::UTF_8);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "地理学院支教队招募");
        assert_eq!(rows[0].contact, None);
    }

    #[test]
    fn falls_back_to_gbk() {
        let (encoded, _, had_errors) = encoding_rs::GBK.encode(CSV);
        assert!(!had_errors);
        let (rows, enc) = decode_rows(&encoded, &labels(&["utf-8", "gbk"]), b',')
            .unwrap()
            .unwrap();
        assert_eq!(enc, encoding_rs::GBK);
        assert_eq!(rows[0].content, "甘肃临夏");
    }

    #[test]
    fn every_encoding_fails() {
        let (encoded, _, _) = encoding_rs::GBK.encode(CSV);
        let out = decode_rows(&encoded, &labels(&["utf-8"]), b',').unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn unknown_label_is_an_error() {
        let err = decode_rows(CSV.as_bytes(), &labels(&["klingon"]), b',').unwrap_err();
        assert!(matches!(err, LoadError::UnknownEncoding(_)));
    }

    #[test]
    fn optional_columns_and_short_rows() {
        let text = "title,content,contact\n支教招募,正文,\n只有标题\n";
        let rows = parse_rows(text, b',').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].contact, None);
        assert_eq!(rows[1].title, "只有标题");
        assert_eq!(rows[1].content, "");
    }

    #[test]
    fn ragged_rows_do_not_reject_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        let text = "title,content,url,date,account\n\
                    支教招募,正文,https://a/1,2024-11-01,地理支教\n\
                    只有标题\n\
                    志愿报名,正文,https://a/3,2024-11-03,心理支教,多余,字段\n";
        fs::write(&path, text).unwrap();
        let rows = load_rows(&path, &labels(&["utf-8", "gbk"]), b',').unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].title, "只有标题");
        assert_eq!(rows[1].url, "");
        assert_eq!(rows[2].account, "心理支教");
    }

    #[test]
    fn undecodable_file_names_every_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gbk.csv");
        let (encoded, _, _) = encoding_rs::GBK.encode(CSV);
        fs::write(&path, &encoded).unwrap();
        let err = load_rows(&path, &labels(&["utf-8"]), b',').unwrap_err();
        match err {
            LoadError::Undecodable { tried, .. } => assert_eq!(tried, labels(&["utf-8"])),
            other => panic!("expected Undecodable, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_reports_io() {
        let err = load_rows(Path::new("does/not/exist.csv"), &labels(&["utf-8"]), b',').unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
