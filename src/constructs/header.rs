use std::io::{Read, Seek, SeekFrom};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{
    constructs::coordinates::{FIRST_BOX_CENTER, LAST_BOX_CENTER, SECOND_BOX_CENTER},
    io::read_full,
    OneddError,
};

/// Size of the text header block at the start of every 1DD file.
pub const HEADER_SIZE: usize = 1440;

/// Fields every header must declare.
const REQUIRED_FIELDS: [&str; 3] = ["year", "month", "days"];

/// Start of a `key=` token. The header has no pair delimiter, so a value runs
/// until the next key token (values may contain spaces).
static KEY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]+=").expect("valid header key pattern"));

/// Splits a header block into ordered `(key, value)` pairs.
///
/// Text before the first `key=` token is ignored and trailing whitespace is
/// stripped from every value.
pub fn parse_fields(block: &str) -> Vec<(String, String)> {
    let tokens: Vec<_> = KEY_TOKEN.find_iter(block).collect();
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            let key = &block[token.start()..token.end() - 1];
            let value_end = tokens.get(i + 1).map_or(block.len(), |next| next.start());
            let value = block[token.end()..value_end].trim_end();
            (key.to_string(), value.to_string())
        })
        .collect()
}

/// Reads the header block of a stream and returns its raw fields in file order.
///
/// Unlike [`Header::parse`] this does not check for the required fields, so it
/// is suitable for dumping the header of a damaged or unusual file.
pub fn read_header_fields<S: Read + Seek>(stream: &mut S) -> crate::Result<Vec<(String, String)>> {
    let block = read_block(stream)?;
    let fields = parse_fields(String::from_utf8_lossy(&block).trim_end());
    if fields.is_empty() {
        return Err(OneddError::EmptyHeader);
    }
    Ok(fields)
}

fn read_block<S: Read + Seek>(stream: &mut S) -> crate::Result<[u8; HEADER_SIZE]> {
    stream.seek(SeekFrom::Start(0))?;
    let mut block = [0u8; HEADER_SIZE];
    let read = read_full(stream, &mut block)?;
    if read < HEADER_SIZE {
        return Err(OneddError::TruncatedRecord {
            pos: 0,
            expected: HEADER_SIZE,
            actual: read,
        });
    }
    Ok(block)
}

/// Decoded 1DD header: an ordered set of `key=value` text fields.
///
/// The header is read once when a reader is opened and never changes afterwards.
/// Typed accessors parse the raw strings on demand.
///
/// # Examples
///
/// ```rust
/// use onedd::Header;
///
/// # fn main() -> onedd::Result<()> {
/// let header = Header::new(1997, 1, 31, -99999.0);
/// assert_eq!(header.year()?, 1997);
/// assert_eq!(header.month()?, 1);
/// assert_eq!(header.days()?, 31);
/// assert_eq!(header.missing_value()?, -99999.0);
/// assert_eq!(header.get("days"), Some("1-31"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    fields: Vec<(String, String)>,
}
impl Header {
    /// Builds a header for `days` days of `year`-`month` using the standard
    /// north-to-south, west-to-east scan order.
    pub fn new(year: i32, month: u32, days: usize, missing_value: f64) -> Self {
        let fields = [
            ("year", format!("{year:04}")),
            ("month", format!("{month:02}")),
            ("days", format!("1-{days}")),
            ("variable", "precipitation".to_string()),
            ("units", "mm/day".to_string()),
            ("missing_value", format!("{missing_value:?}")),
            ("1st_box_center", FIRST_BOX_CENTER.to_string()),
            ("2nd_box_center", SECOND_BOX_CENTER.to_string()),
            ("last_box_center", LAST_BOX_CENTER.to_string()),
        ];
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    /// Seeks to the start of `stream`, reads the header block and validates it.
    ///
    /// # Errors
    ///
    /// - [`OneddError::TruncatedRecord`] if the stream is shorter than the block
    /// - [`OneddError::EmptyHeader`] if no `key=value` pairs are found
    /// - [`OneddError::MissingField`] if `year`, `month` or `days` is absent
    pub fn parse<S: Read + Seek>(stream: &mut S) -> crate::Result<Self> {
        let block = read_block(stream)?;
        Self::from_block(&block)
    }

    /// Decodes a header from the raw bytes of a header block.
    pub fn from_block(block: &[u8]) -> crate::Result<Self> {
        let text = String::from_utf8_lossy(block);
        let header = Self::from_fields(parse_fields(text.trim_end()))?;
        debug!(fields = header.fields.len(), "parsed 1DD header");
        Ok(header)
    }

    /// Builds a header from already tokenized fields.
    pub fn from_fields(fields: Vec<(String, String)>) -> crate::Result<Self> {
        if fields.is_empty() {
            return Err(OneddError::EmptyHeader);
        }
        let header = Self { fields };
        for field in REQUIRED_FIELDS {
            header.require(field)?;
        }
        Ok(header)
    }

    /// All fields in file order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<(String, String)> {
        self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Raw value of a field. When a key repeats, the last occurrence wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the value of `key`, appending the field if it is new.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().rev().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn year(&self) -> crate::Result<i32> {
        self.parse_field("year")
    }

    pub fn month(&self) -> crate::Result<u32> {
        self.parse_field("month")
    }

    /// Number of days in the file: the upper bound of the `start-end` range in
    /// the `days` field.
    pub fn days(&self) -> crate::Result<usize> {
        let raw = self.require("days")?;
        raw.split_once('-')
            .and_then(|(_, end)| end.trim().parse().ok())
            .ok_or_else(|| OneddError::InvalidField {
                field: "days".to_string(),
                value: raw.to_string(),
            })
    }

    /// Sentinel value that marks a cell without an observation.
    pub fn missing_value(&self) -> crate::Result<f64> {
        self.parse_field("missing_value")
    }

    /// Renders the header as a space-padded header block.
    pub fn to_block(&self) -> crate::Result<[u8; HEADER_SIZE]> {
        let text = self
            .fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        if text.len() > HEADER_SIZE {
            return Err(OneddError::HeaderTooLong(text.len()));
        }
        let mut block = [b' '; HEADER_SIZE];
        block[..text.len()].copy_from_slice(text.as_bytes());
        Ok(block)
    }

    fn require(&self, field: &str) -> crate::Result<&str> {
        self.get(field)
            .ok_or_else(|| OneddError::MissingField(field.to_string()))
    }

    fn parse_field<T: FromStr>(&self, field: &str) -> crate::Result<T> {
        let raw = self.require(field)?;
        raw.trim().parse().map_err(|_| OneddError::InvalidField {
            field: field.to_string(),
            value: raw.to_string(),
        })
    }
}
