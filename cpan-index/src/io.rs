// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! I/O helpers. */

use {
    crate::{
        cleartext::CleartextHasher,
        error::{CpanIndexError, Result},
    },
    async_compression::futures::bufread::{GzipDecoder, GzipEncoder},
    futures::{AsyncBufRead, AsyncRead},
    pgp::crypto::Hasher,
    serde::{Deserialize, Serialize},
    std::{fmt::Formatter, pin::Pin},
};

/// Represents a content digest as advertised by a `CHECKSUMS` record.
#[derive(Clone, Eq, PartialEq)]
pub enum ContentDigest {
    /// An MD5 digest.
    Md5(Vec<u8>),
    /// A SHA-256 digest.
    Sha256(Vec<u8>),
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5(data) => write!(f, "Md5({})", hex::encode(data)),
            Self::Sha256(data) => write!(f, "Sha256({})", hex::encode(data)),
        }
    }
}

impl ContentDigest {
    /// Create a new MD5 instance by parsing a hex digest.
    pub fn md5_hex(digest: &str) -> Result<Self> {
        Ok(Self::Md5(hex::decode(digest)?))
    }

    /// Create a new SHA-256 instance by parsing a hex digest.
    pub fn sha256_hex(digest: &str) -> Result<Self> {
        Ok(Self::Sha256(hex::decode(digest)?))
    }

    /// Human readable name of the digest algorithm.
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            Self::Md5(_) => "MD5",
            Self::Sha256(_) => "SHA-256",
        }
    }

    /// Create a new hasher matching for the type of this digest.
    pub fn new_hasher(&self) -> Box<dyn Hasher + Send> {
        Box::new(match self {
            Self::Md5(_) => CleartextHasher::md5(),
            Self::Sha256(_) => CleartextHasher::sha256(),
        })
    }

    /// Obtain the digest bytes for this content digest.
    pub fn digest_bytes(&self) -> &[u8] {
        match self {
            Self::Md5(x) => x,
            Self::Sha256(x) => x,
        }
    }

    /// Obtain the hex encoded content digest.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest_bytes())
    }

    /// Digest `data` and compare the result against this digest.
    pub fn verify(&self, data: &[u8]) -> Result<()> {
        let mut hasher = self.new_hasher();
        hasher.update(data);
        let got = hasher.finish();

        if got == self.digest_bytes() {
            Ok(())
        } else {
            Err(CpanIndexError::DigestMismatch {
                algorithm: self.algorithm_name(),
                expected: self.digest_hex(),
                actual: hex::encode(got),
            })
        }
    }
}

/// Compression format of a packages index.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No compression (`02packages.details.txt`).
    None,

    /// Gzip compression (`02packages.details.txt.gz`).
    Gzip,
}

impl Default for Compression {
    fn default() -> Self {
        Self::Gzip
    }
}

impl Compression {
    /// Filename extension for files compressed in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Gzip => ".gz",
        }
    }

    /// Resolve the compression format from a filename.
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(Self::Gzip.extension()) {
            Self::Gzip
        } else {
            Self::None
        }
    }
}

/// Wrap a reader with transparent decompression.
pub fn read_decompressed<'a>(
    stream: impl AsyncBufRead + Send + 'a,
    compression: Compression,
) -> Pin<Box<dyn AsyncRead + Send + 'a>> {
    match compression {
        Compression::None => Box::pin(stream),
        Compression::Gzip => Box::pin(GzipDecoder::new(stream)),
    }
}

/// Wrap a reader with transparent compression.
pub fn read_compressed<'a>(
    stream: impl AsyncBufRead + Send + 'a,
    compression: Compression,
) -> Pin<Box<dyn AsyncRead + Send + 'a>> {
    match compression {
        Compression::None => Box::pin(stream),
        Compression::Gzip => Box::pin(GzipEncoder::new(stream)),
    }
}

#[cfg(test)]
mod test {
    use {super::*, futures::AsyncReadExt};

    #[test]
    fn content_digest_verify() -> Result<()> {
        let digest =
            ContentDigest::sha256_hex("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")?;
        digest.verify(b"hello")?;

        assert!(matches!(
            digest.verify(b"hellO"),
            Err(CpanIndexError::DigestMismatch {
                algorithm: "SHA-256",
                ..
            })
        ));

        let digest = ContentDigest::md5_hex("5d41402abc4b2a76b9719d911017c592")?;
        digest.verify(b"hello")?;

        assert!(ContentDigest::md5_hex("not hex").is_err());

        Ok(())
    }

    #[test]
    fn compression_from_path() {
        assert_eq!(
            Compression::from_path("modules/02packages.details.txt.gz"),
            Compression::Gzip
        );
        assert_eq!(
            Compression::from_path("modules/02packages.details.txt"),
            Compression::None
        );
    }

    #[tokio::test]
    async fn gzip_roundtrip() -> Result<()> {
        let mut compressed = vec![];
        read_compressed(
            futures::io::Cursor::new(b"hello world".to_vec()),
            Compression::Gzip,
        )
        .read_to_end(&mut compressed)
        .await?;
        assert_ne!(compressed, b"hello world");

        let mut decompressed = vec![];
        read_decompressed(futures::io::Cursor::new(compressed), Compression::Gzip)
            .read_to_end(&mut decompressed)
            .await?;
        assert_eq!(decompressed, b"hello world");

        Ok(())
    }
}
