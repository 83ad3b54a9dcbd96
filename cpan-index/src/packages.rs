// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Streaming reader of `02packages.details.txt.gz`.

The packages index maps every indexed Perl package to the version and
distribution providing it. After a header block (see [crate::header]), each
line has the form:

```text
Foo::Bar                            1.23  A/AB/AUTHOR/Foo-Bar-1.23.tar.gz
```

The file has hundreds of thousands of lines. [PackagesIndexReader::open()]
decompresses and parses the header up front, then hands the rest of the input
to a background task which parses entries and sends them through a bounded
queue to [PackagesIndexEntries]. The task waits when the queue is full and
stops as soon as the consumer goes away.
*/

use {
    crate::{
        error::{CpanIndexError, EntryLineError, Result},
        header::{read_header, PackagesIndexHeader},
        io::{read_decompressed, Compression},
    },
    futures::{ready, AsyncBufRead, AsyncBufReadExt, Stream, StreamExt},
    log::{debug, warn},
    serde::{Deserialize, Serialize},
    std::{
        future::Future,
        pin::Pin,
        str::FromStr,
        task::{Context, Poll},
    },
    tokio::{
        sync::{mpsc, oneshot},
        task::JoinHandle,
    },
};

/// Default number of parsed entries buffered ahead of the consumer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;

/// An entry in a packages index.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PackageIndexEntry {
    /// Package name. e.g. `Foo::Bar`.
    pub package: String,

    /// Package version. May be empty or `undef`.
    pub version: String,

    /// Distribution path relative to `authors/id/`.
    pub path: String,
}

impl PackageIndexEntry {
    /// Parse an entry from a line of the packages index.
    ///
    /// The package is everything before the first space and the path is
    /// everything after the last space. Whatever lies between, minus
    /// surrounding spaces, is the version.
    pub fn from_line(line: &str) -> std::result::Result<Self, EntryLineError> {
        let first = line.find(' ').ok_or(EntryLineError::MissingSeparator)?;
        if first == 0 {
            return Err(EntryLineError::NoPackage);
        }

        let last = line.rfind(' ').ok_or(EntryLineError::MissingSeparator)?;
        if last == line.len() - 1 {
            return Err(EntryLineError::NoDist);
        }

        Ok(Self {
            package: line[..first].to_string(),
            version: line[first..last].trim_matches(' ').to_string(),
            path: line[last + 1..].to_string(),
        })
    }
}

impl FromStr for PackageIndexEntry {
    type Err = EntryLineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_line(s)
    }
}

/// Parse a raw line of the packages index.
///
/// The line must not contain its line terminator.
pub fn parse_entry_line(line: &[u8]) -> std::result::Result<PackageIndexEntry, EntryLineError> {
    let line = std::str::from_utf8(line).map_err(|_| EntryLineError::InvalidUtf8)?;

    PackageIndexEntry::from_line(line)
}

/// Options controlling how a packages index is read.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PackagesIndexOptions {
    /// Maximum number of parsed entries waiting for the consumer.
    ///
    /// Values below 1 are treated as 1.
    pub queue_capacity: usize,

    /// Fail the stream if the number of entries differs from the header's
    /// `Line-Count` field.
    pub enforce_line_count: bool,

    /// Compression of the input stream.
    pub compression: Compression,
}

impl Default for PackagesIndexOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            enforce_line_count: false,
            compression: Compression::Gzip,
        }
    }
}

/// Opens packages index streams.
#[derive(Clone, Debug, Default)]
pub struct PackagesIndexReader {
    options: PackagesIndexOptions,
}

impl PackagesIndexReader {
    /// Construct an instance with the given options.
    pub fn new(options: PackagesIndexOptions) -> Self {
        Self { options }
    }

    /// The options of this instance.
    pub fn options(&self) -> &PackagesIndexOptions {
        &self.options
    }

    /// Open a packages index stream.
    ///
    /// The header is read and validated before this resolves. Entries are
    /// parsed by a background task spawned on the current tokio runtime.
    pub async fn open<R>(&self, reader: R) -> Result<(PackagesIndexHeader, PackagesIndexEntries)>
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        let mut reader =
            futures::io::BufReader::new(read_decompressed(reader, self.options.compression));

        let (header, header_lines) = read_header(&mut reader).await?;
        debug!(
            "read packages index header with {} fields ({} lines)",
            header.iter_fields().count(),
            header_lines
        );

        let expected_count = if self.options.enforce_line_count {
            Some(header.line_count().ok_or_else(|| {
                CpanIndexError::Format("header lacks Line-Count field".into())
            })??)
        } else {
            None
        };

        let (sender, receiver) = mpsc::channel(self.options.queue_capacity.max(1));
        let (done_sender, done_receiver) = oneshot::channel();

        let task = tokio::spawn(async move {
            let res = produce_entries(reader, header_lines, expected_count, sender).await;

            match &res {
                Ok(count) => debug!("packages index stream finished after {} entries", count),
                Err(e) => warn!("packages index stream failed: {}", e),
            }

            // The consumer may have gone away.
            let _ = done_sender.send(res.map(|_| ()));
        });

        Ok((
            header,
            PackagesIndexEntries {
                entries: receiver,
                completion: Some(done_receiver),
                task: Some(task),
            },
        ))
    }
}

/// Open a packages index stream with default options.
pub async fn read_packages_index<R>(reader: R) -> Result<(PackagesIndexHeader, PackagesIndexEntries)>
where
    R: AsyncBufRead + Send + Unpin + 'static,
{
    PackagesIndexReader::default().open(reader).await
}

/// Parse entry lines and send them to the consumer.
///
/// Resolves to the number of entries sent.
async fn produce_entries<R>(
    mut reader: R,
    mut line_number: usize,
    expected_count: Option<usize>,
    sender: mpsc::Sender<PackageIndexEntry>,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut count = 0;
    let mut line = vec![];

    loop {
        if sender.is_closed() {
            warn!("packages index consumer went away at line {}", line_number);
            return Ok(count);
        }

        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        line_number += 1;

        let content = line.strip_suffix(b"\n").unwrap_or(&line);
        let content = content.strip_suffix(b"\r").unwrap_or(content);

        if content.is_empty() {
            continue;
        }

        let entry = parse_entry_line(content).map_err(|source| CpanIndexError::Stream {
            line: line_number,
            source,
        })?;

        if sender.send(entry).await.is_err() {
            warn!("packages index consumer went away at line {}", line_number);
            return Ok(count);
        }
        count += 1;
    }

    match expected_count {
        Some(expected) if expected != count => Err(CpanIndexError::LineCountMismatch {
            expected,
            actual: count,
        }),
        _ => Ok(count),
    }
}

/// The entries of an open packages index.
///
/// Entries are yielded in file order. If parsing fails, the entries parsed
/// before the failure are yielded first, followed by the error. Nothing is
/// yielded after an error.
///
/// Dropping an instance stops the background task the next time it tries to
/// deliver an entry.
pub struct PackagesIndexEntries {
    entries: mpsc::Receiver<PackageIndexEntry>,
    completion: Option<oneshot::Receiver<Result<()>>>,
    task: Option<JoinHandle<()>>,
}

impl PackagesIndexEntries {
    /// Obtain the next entry.
    ///
    /// Resolves to [None] at the end of the stream.
    pub async fn next_entry(&mut self) -> Option<Result<PackageIndexEntry>> {
        self.next().await
    }

    /// Consume all remaining entries, discarding them.
    ///
    /// Resolves to the terminal status of the stream.
    pub async fn finish(mut self) -> Result<()> {
        while let Some(entry) = self.next().await {
            entry?;
        }

        Ok(())
    }

    /// Stop reading and wait for the background task to exit.
    ///
    /// Buffered entries are discarded.
    pub async fn cancel(mut self) {
        self.entries.close();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("packages index task did not exit cleanly: {}", e);
            }
        }

        debug!("packages index stream cancelled");
    }
}

impl Stream for PackagesIndexEntries {
    type Item = Result<PackageIndexEntry>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let Some(entry) = ready!(self.entries.poll_recv(cx)) {
            return Poll::Ready(Some(Ok(entry)));
        }

        // The queue is closed and drained. Report how the producer finished.
        let completion = match self.completion.as_mut() {
            Some(completion) => completion,
            None => return Poll::Ready(None),
        };

        let res = ready!(Pin::new(completion).poll(cx));
        self.completion = None;

        Poll::Ready(match res {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(Err(e)),
            Err(_) => Some(Err(CpanIndexError::StreamAbandoned)),
        })
    }
}
