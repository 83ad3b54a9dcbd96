// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Packages index header block.

`02packages.details.txt` begins with a MIME-style header:

```text
File:         02packages.details.txt
URL:          http://www.perl.com/CPAN/modules/02packages.details.txt
Description:  Package names found in directory $CPAN/authors/id/
Columns:      package name, version, path
Intended-For: Automated fetch routines, namespace documentation.
Written-By:   PAUSE version 1.005
Line-Count:   256215
Last-Updated: Sat, 15 Oct 2022 10:29:02 GMT

```

Fields may be folded: a line starting with a space or tab continues the value
of the previous field. A blank line terminates the header.
*/

use {
    crate::error::{CpanIndexError, Result},
    chrono::{DateTime, TimeZone, Utc},
    futures::{AsyncBufRead, AsyncBufReadExt},
    mailparse::dateparse,
    std::collections::BTreeMap,
};

/// A field in a [PackagesIndexHeader].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeaderField {
    name: String,
    value: String,
}

impl HeaderField {
    /// The name of this field, as it appeared in the source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value of this field, with folded lines joined by a single space.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The header of a packages index.
///
/// Field names are matched case-insensitively. A field may appear more than
/// once; values are kept in file order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PackagesIndexHeader {
    fields: Vec<HeaderField>,
}

impl PackagesIndexHeader {
    /// Whether the header has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all fields in file order.
    pub fn iter_fields(&self) -> impl Iterator<Item = &HeaderField> {
        self.fields.iter()
    }

    /// Append a field.
    pub fn add_field(&mut self, name: impl ToString, value: impl ToString) {
        self.fields.push(HeaderField {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Whether a field is present.
    pub fn has_field(&self, name: &str) -> bool {
        self.field_values(name).next().is_some()
    }

    /// Iterate over every value of a named field.
    pub fn field_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_str())
    }

    /// The first value of a named field.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_str())
    }

    /// Obtain the first value of a field parsed as a [usize].
    pub fn field_usize(&self, name: &str) -> Option<Result<usize>> {
        self.field_str(name).map(|v| Ok(v.parse::<usize>()?))
    }

    /// Obtain the first value of a field parsed as an RFC 5322 date.
    ///
    /// The timezone is normalized to UTC.
    pub fn field_datetime_rfc5322(&self, name: &str) -> Option<Result<DateTime<Utc>>> {
        self.field_str(name)
            .map(|v| Ok(Utc.timestamp(dateparse(v)?, 0)))
    }

    /// Obtain the header as a mapping of field name to values.
    ///
    /// Keys use the spelling of the first occurrence of each field.
    pub fn as_multi_map(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut res: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for field in &self.fields {
            let key = res
                .keys()
                .find(|k| k.eq_ignore_ascii_case(&field.name))
                .copied()
                .unwrap_or(field.name.as_str());

            res.entry(key).or_default().push(field.value.as_str());
        }

        res
    }

    /// The `File` field.
    pub fn file(&self) -> Option<&str> {
        self.field_str("File")
    }

    /// The `URL` field.
    pub fn url(&self) -> Option<&str> {
        self.field_str("URL")
    }

    /// The `Description` field.
    pub fn description(&self) -> Option<&str> {
        self.field_str("Description")
    }

    /// The `Columns` field, split on commas.
    pub fn columns(&self) -> Option<Vec<&str>> {
        self.field_str("Columns")
            .map(|v| v.split(',').map(|c| c.trim()).collect())
    }

    /// The `Intended-For` field.
    pub fn intended_for(&self) -> Option<&str> {
        self.field_str("Intended-For")
    }

    /// The `Written-By` field.
    pub fn written_by(&self) -> Option<&str> {
        self.field_str("Written-By")
    }

    /// The `Line-Count` field: number of entries following the header.
    pub fn line_count(&self) -> Option<Result<usize>> {
        self.field_usize("Line-Count")
    }

    /// The `Last-Updated` field, as a [DateTime].
    pub fn last_updated(&self) -> Option<Result<DateTime<Utc>>> {
        self.field_datetime_rfc5322("Last-Updated")
    }
}

/// A streaming parser for [PackagesIndexHeader].
///
/// Instances are fed lines of text and return the header once the terminating
/// blank line is seen.
#[derive(Clone, Debug, Default)]
pub struct HeaderParser {
    header: PackagesIndexHeader,
    field: Option<String>,
}

impl HeaderParser {
    /// Write a line to the parser.
    ///
    /// Returns the completed header if the line terminates it. `Err` is
    /// returned if the header is malformed.
    pub fn write_line(&mut self, line: &str) -> Result<Option<PackagesIndexHeader>> {
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
        let is_continuation = line.starts_with(' ') || line.starts_with('\t');

        // Whitespace-only lines are continuations. Only an empty line ends the header.
        if line.is_empty() {
            if let Some(field) = self.field.take() {
                self.flush_field(field)?;
            }

            return Ok(Some(std::mem::take(&mut self.header)));
        }

        match (self.field.take(), is_continuation) {
            (Some(v), false) => {
                self.flush_field(v)?;
                self.field = Some(line.to_string());
            }
            (None, false) => {
                self.field = Some(line.to_string());
            }
            (Some(v), true) => {
                let continuation = line.trim();

                self.field = Some(if continuation.is_empty() {
                    v
                } else {
                    format!("{} {}", v.trim_end(), continuation)
                });
            }
            (None, true) => {
                return Err(CpanIndexError::Format(format!(
                    "header continuation line before any field: '{}'",
                    line
                )));
            }
        }

        Ok(None)
    }

    /// Finish parsing at end of input.
    ///
    /// Always an error: the header must be terminated by a blank line.
    pub fn finish(self) -> Result<PackagesIndexHeader> {
        Err(CpanIndexError::Format(
            "end of input before end of header".into(),
        ))
    }

    fn flush_field(&mut self, v: String) -> Result<()> {
        let (name, value) = v.split_once(':').ok_or_else(|| {
            CpanIndexError::Format(format!("error parsing header line '{}'; missing colon", v))
        })?;

        if name.is_empty() || name.contains(|c: char| c.is_ascii_whitespace()) {
            return Err(CpanIndexError::Format(format!(
                "error parsing header line '{}'; invalid field name",
                v
            )));
        }

        self.header.add_field(name, value.trim());

        Ok(())
    }
}

/// Read a [PackagesIndexHeader] from a reader.
///
/// Consumes input up to and including the terminating blank line. Returns the
/// header and the number of lines consumed.
pub async fn read_header<R>(reader: &mut R) -> Result<(PackagesIndexHeader, usize)>
where
    R: AsyncBufRead + Unpin,
{
    let mut parser = HeaderParser::default();
    let mut line_count = 0;
    let mut line = vec![];

    loop {
        line.clear();

        if reader.read_until(b'\n', &mut line).await? == 0 {
            return parser.finish().map(|header| (header, line_count));
        }
        line_count += 1;

        let text = std::str::from_utf8(&line).map_err(|_| {
            CpanIndexError::Format(format!("header line {} is not valid UTF-8", line_count))
        })?;

        if let Some(header) = parser.write_line(text)? {
            return Ok((header, line_count));
        }
    }
}
