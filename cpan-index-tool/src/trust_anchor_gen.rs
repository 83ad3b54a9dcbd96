// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Generation of embedded trust anchor source code. */

use {
    crate::cli::{Result, ToolError},
    log::{info, warn},
    pgp::{
        ser::Serialize,
        types::{KeyTrait, PublicKeyTrait},
        Deserializable, SignedPublicKey,
    },
    std::{fmt::Write, io::Cursor},
};

const BYTES_PER_LINE: usize = 12;

/// Parse an armored public key suitable for the embedded trust anchor.
///
/// Exactly one primary key capable of signing is accepted.
pub fn parse_armored_key(data: &str) -> Result<SignedPublicKey> {
    let (keys, _) = SignedPublicKey::from_armor_many(Cursor::new(data.as_bytes()))?;
    let mut keys = keys.collect::<std::result::Result<Vec<_>, _>>()?;

    if keys.len() != 1 {
        return Err(ToolError::TrustAnchor(format!(
            "expected a single public key; found {}",
            keys.len()
        )));
    }
    let key = keys.remove(0);

    if !key.primary_key.is_signing_key() {
        return Err(ToolError::TrustAnchor(format!(
            "primary key {} cannot be used for signatures",
            hex::encode_upper(key.key_id().as_ref())
        )));
    }

    // Older keys may use self-signatures we can't verify. The key material is
    // what matters.
    if let Err(e) = key.verify() {
        warn!(
            "unable to verify self-signatures of {}: {:?}",
            hex::encode_upper(key.key_id().as_ref()),
            e
        );
    }

    Ok(key)
}

fn write_bytes(out: &mut String, indent: usize, data: &[u8]) -> std::fmt::Result {
    for chunk in data.chunks(BYTES_PER_LINE) {
        let line = chunk
            .iter()
            .map(|b| format!("0x{:02x},", b))
            .collect::<Vec<_>>()
            .join(" ");

        writeln!(out, "{:indent$}{}", "", line, indent = indent)?;
    }

    Ok(())
}

fn describe_key(key: &impl PublicKeyTrait, created_at: &chrono::DateTime<chrono::Utc>) -> String {
    format!(
        "{} ({:?}, created {})",
        hex::encode_upper(key.key_id().as_ref()),
        key.algorithm(),
        created_at.format("%Y-%m-%dT%H:%M:%SZ")
    )
}

/// Render Rust source code embedding the public key material of `keys`.
pub fn render_trust_anchor(keys: &[SignedPublicKey]) -> Result<String> {
    let mut out = String::new();

    writeln!(
        out,
        "// Code generated by `cpan-index generate-trust-anchor`. DO NOT EDIT."
    )?;
    writeln!(out)?;
    writeln!(out, "/*! Public key material of the PAUSE indexer. */")?;
    writeln!(out)?;
    writeln!(out, "use crate::trust_anchor::EmbeddedKey;")?;
    writeln!(out)?;
    writeln!(out, "/// Keys used by PAUSE to sign `CHECKSUMS` files.")?;
    writeln!(out, "pub const PAUSE_KEYS: &[EmbeddedKey] = &[")?;

    for key in keys {
        let mut primary = vec![];
        key.primary_key.to_writer(&mut primary)?;

        writeln!(
            out,
            "    // {}",
            describe_key(&key.primary_key, key.primary_key.created_at())
        )?;
        writeln!(out, "    EmbeddedKey {{")?;
        writeln!(out, "        primary: &[")?;
        write_bytes(&mut out, 12, &primary)?;
        writeln!(out, "        ],")?;

        if key.public_subkeys.is_empty() {
            writeln!(out, "        subkeys: &[],")?;
        } else {
            writeln!(out, "        subkeys: &[")?;

            for subkey in &key.public_subkeys {
                let mut data = vec![];
                subkey.key.to_writer(&mut data)?;

                writeln!(
                    out,
                    "            // {}",
                    describe_key(&subkey.key, subkey.key.created_at())
                )?;
                writeln!(out, "            &[")?;
                write_bytes(&mut out, 16, &data)?;
                writeln!(out, "            ],")?;
            }

            writeln!(out, "        ],")?;
        }

        writeln!(out, "    }},")?;

        info!(
            "embedding {} with {} subkeys",
            hex::encode_upper(key.key_id().as_ref()),
            key.public_subkeys.len()
        );
    }

    writeln!(out, "];")?;

    Ok(out)
}
