// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! `CHECKSUMS` files.

Every directory under `authors/id/` on a CPAN mirror holds a `CHECKSUMS` file
describing the files in it. The file is a Perl hash literal wrapped in a PGP
cleartext signature made by the PAUSE indexer:

```text
-----BEGIN PGP SIGNED MESSAGE-----
Hash: SHA1

# CHECKSUMS file written on Sat Oct 15 10:29:02 2022 GMT by PAUSE::CHECKSUMS 1.0
$cksum = {
  'Foo-Bar-1.23.tar.gz' => {
    'md5' => '...',
    'mtime' => '2022-10-15',
    'sha256' => '...',
    'size' => 34911
  }
};
-----BEGIN PGP SIGNATURE-----
...
```

Reading one is a two step process. [verify()] checks the signature against a
[TrustAnchor] and yields the exact bytes that were signed. [transcode()] turns
those bytes into a [ChecksumsDocument]. [read_checksums()] does both.

The transcoder is not a Perl parser. It rewrites the narrow subset of hash
literal syntax PAUSE emits into JSON and rejects anything containing a
backslash or double quote, since those could change the meaning of the
rewrite.
*/

use {
    crate::{
        cleartext::{ClearSignedEnvelope, CleartextSignature},
        error::{CpanIndexError, Result},
        io::ContentDigest,
        trust_anchor::TrustAnchor,
    },
    log::{debug, warn},
    pgp::types::KeyId,
    serde::{de::Unexpected, Deserialize, Deserializer, Serialize},
    std::{collections::BTreeMap, io::Read},
};

/// `CHECKSUMS` of `authors/id/` records this size as a string.
const LEGACY_QUOTED_SIZE: &[u8] = b"'size' => '35228'";

fn deserialize_isdir<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u8::deserialize(deserializer)?;

    match value {
        0 | 1 => Ok(value),
        _ => Err(serde::de::Error::invalid_value(
            Unexpected::Unsigned(value as u64),
            &"0 or 1",
        )),
    }
}

/// Metadata about a single file in a `CHECKSUMS` file.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChecksumRecord {
    /// Hex MD5 of the file. Empty for directories.
    #[serde(default)]
    pub md5: String,

    /// Modification date, e.g. `2022-10-15`.
    pub mtime: String,

    /// Hex SHA-256 of the file. Empty for directories.
    #[serde(default)]
    pub sha256: String,

    /// Size in bytes.
    pub size: u64,

    /// 1 if the entry is a directory.
    #[serde(default, deserialize_with = "deserialize_isdir")]
    pub isdir: u8,
}

impl ChecksumRecord {
    /// Whether this record describes a directory.
    pub fn is_dir(&self) -> bool {
        self.isdir == 1
    }

    /// Advertised digests, strongest first.
    pub fn digests(&self) -> Result<Vec<ContentDigest>> {
        let mut res = vec![];

        if !self.sha256.is_empty() {
            res.push(ContentDigest::sha256_hex(&self.sha256)?);
        }
        if !self.md5.is_empty() {
            res.push(ContentDigest::md5_hex(&self.md5)?);
        }

        Ok(res)
    }

    /// Verify the content of a file against this record.
    ///
    /// The size is checked first, then every advertised digest.
    pub fn verify_content(&self, data: &[u8]) -> Result<()> {
        if data.len() as u64 != self.size {
            return Err(CpanIndexError::SizeMismatch {
                expected: self.size,
                actual: data.len() as u64,
            });
        }

        for digest in self.digests()? {
            digest.verify(data)?;
        }

        Ok(())
    }
}

/// The parsed content of a `CHECKSUMS` file.
///
/// Maps filenames to their [ChecksumRecord].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChecksumsDocument {
    entries: BTreeMap<String, ChecksumRecord>,
}

impl ChecksumsDocument {
    /// Obtain the record for a filename.
    pub fn get(&self, filename: &str) -> Option<&ChecksumRecord> {
        self.entries.get(filename)
    }

    /// Iterate over `(filename, record)` pairs, sorted by filename.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChecksumRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume self, returning the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, ChecksumRecord> {
        self.entries
    }
}

/// Cleartext whose signature has been verified against a [TrustAnchor].
#[derive(Clone, Debug)]
pub struct VerifiedPlaintext {
    plaintext: Vec<u8>,
    signer: KeyId,
}

impl VerifiedPlaintext {
    /// The canonical bytes covered by the signature.
    pub fn as_bytes(&self) -> &[u8] {
        &self.plaintext
    }

    /// Consume self, returning the canonical bytes covered by the signature.
    pub fn into_bytes(self) -> Vec<u8> {
        self.plaintext
    }

    /// ID of the trusted key that produced the signature.
    pub fn signer(&self) -> &KeyId {
        &self.signer
    }
}

/// Verify a cleartext signed document against a trust anchor.
///
/// All keys in the anchor matching the signature's issuer are tried in turn
/// and the first to verify wins. On success the canonical signed bytes are
/// returned unmodified.
pub fn verify(data: &[u8], anchor: &TrustAnchor) -> Result<VerifiedPlaintext> {
    let envelope = ClearSignedEnvelope::decode(data)?;
    let signature = envelope.signature();

    let issuer = signature.issuer_key_id()?;
    let issuer_hex = hex::encode_upper(issuer.as_ref());

    let mut signer = None;
    let mut last_error = None;

    for key in anchor.keys_by_id(&issuer) {
        match key.verify(signature, envelope.plaintext()) {
            Ok(()) => {
                signer = Some(key.key_id().clone());
                break;
            }
            Err(e) => {
                debug!(
                    "signature verification with key {} ({:?}) failed: {:?}",
                    key.key_id_hex(),
                    key.algorithm(),
                    e
                );
                last_error = Some(e);
            }
        }
    }

    match (signer, last_error) {
        (Some(signer), _) => {
            debug!("signature verified with key {}", issuer_hex);

            Ok(VerifiedPlaintext {
                plaintext: envelope.into_plaintext(),
                signer,
            })
        }
        (None, Some(source)) => {
            warn!("signature from {} does not verify", issuer_hex);

            Err(CpanIndexError::SignatureMismatch {
                key_id: issuer_hex,
                source,
            })
        }
        (None, None) => {
            warn!("signature from {} is not from a trusted key", issuer_hex);

            Err(CpanIndexError::UnknownSigner(issuer_hex))
        }
    }
}

/// Convert the Perl hash literal in verified `CHECKSUMS` content into records.
///
/// Leading `#` comment lines are skipped. Everything outside the outermost
/// braces is ignored. The literal must not contain `\` or `"`.
pub fn transcode(plaintext: Vec<u8>) -> Result<ChecksumsDocument> {
    let mut start = 0;

    loop {
        let remaining = &plaintext[start..];

        if remaining.is_empty() {
            return Err(CpanIndexError::NoData);
        }
        if remaining[0] != b'#' {
            break;
        }

        match remaining.iter().position(|b| *b == b'\n') {
            Some(pos) => start += pos + 1,
            None => return Err(CpanIndexError::NoData),
        }
    }

    let open = plaintext[start..]
        .iter()
        .position(|b| *b == b'{')
        .map(|pos| start + pos)
        .ok_or(CpanIndexError::Syntax {
            offset: start,
            reason: "no opening brace",
        })?;
    let close = plaintext[open..]
        .iter()
        .rposition(|b| *b == b'}')
        .map(|pos| open + pos)
        .ok_or(CpanIndexError::Syntax {
            offset: open,
            reason: "no closing brace",
        })?;

    let mut literal = plaintext[open..=close].to_vec();

    if let Some(idx) = literal
        .windows(LEGACY_QUOTED_SIZE.len())
        .position(|w| w == LEGACY_QUOTED_SIZE)
    {
        literal[idx + 10] = b' ';
        literal[idx + 16] = b' ';
    }

    let mut i = 0;
    while i < literal.len() {
        match literal[i] {
            b'\\' => {
                return Err(CpanIndexError::Syntax {
                    offset: open + i,
                    reason: "backslash in literal",
                })
            }
            b'"' => {
                return Err(CpanIndexError::Syntax {
                    offset: open + i,
                    reason: "double quote in literal",
                })
            }
            b'\'' => literal[i] = b'"',
            b'=' if literal.get(i + 1) == Some(&b'>') => {
                literal[i] = b':';
                literal[i + 1] = b' ';
                i += 1;
            }
            _ => {}
        }

        i += 1;
    }

    Ok(serde_json::from_slice(&literal)?)
}

/// Read, verify, and parse a `CHECKSUMS` file.
pub fn read_checksums(mut reader: impl Read, anchor: &TrustAnchor) -> Result<ChecksumsDocument> {
    let mut data = vec![];
    reader.read_to_end(&mut data)?;

    transcode(verify(&data, anchor)?.into_bytes())
}
