// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Sets of trusted PGP public keys.

A [TrustAnchor] is the immutable set of keys a verification is willing to
accept signatures from. Keys are looked up by key ID. Both primary keys and
subkeys participate in lookups.

The keys of the PAUSE indexer are embedded in this crate as serialized public
key packets (see [crate::pause_key]). That file is produced offline from an
armored key file by `cpan-index generate-trust-anchor` and can be regenerated
whenever PAUSE rotates keys.
*/

use {
    crate::{
        cleartext::{CleartextSignature, SignaturePacket},
        error::Result,
        pause_key::PAUSE_KEYS,
    },
    chrono::{DateTime, Utc},
    pgp::{
        crypto::PublicKeyAlgorithm,
        packet::{PublicKey, PublicSubkey},
        types::{KeyId, KeyTrait, Version},
        Deserializable, SignedPublicKey,
    },
    std::io::Cursor,
    strum::EnumIter,
};

/// Serialized public key packet bodies compiled into the binary.
#[derive(Clone, Copy, Debug)]
pub struct EmbeddedKey {
    /// Body of the primary public key packet.
    pub primary: &'static [u8],
    /// Bodies of public subkey packets.
    pub subkeys: &'static [&'static [u8]],
}

/// Defines well-known trust anchors embedded within this crate.
#[derive(Clone, Copy, Debug, EnumIter)]
pub enum EmbeddedTrustAnchor {
    /// The PAUSE indexer, signer of `CHECKSUMS` files.
    Pause,
}

impl EmbeddedTrustAnchor {
    /// Obtain the raw key material for this variant.
    pub fn embedded_keys(&self) -> &'static [EmbeddedKey] {
        match self {
            Self::Pause => PAUSE_KEYS,
        }
    }

    /// Obtain the parsed [TrustAnchor] for this variant.
    pub fn trust_anchor(&self) -> Result<TrustAnchor> {
        TrustAnchor::from_embedded(self.embedded_keys())
    }
}

/// Public key material of a [TrustedKey].
#[derive(Clone, Debug)]
pub enum TrustedKeyMaterial {
    Primary(PublicKey),
    Subkey(PublicSubkey),
}

/// A single key in a [TrustAnchor].
#[derive(Clone, Debug)]
pub struct TrustedKey {
    key_id: KeyId,
    material: TrustedKeyMaterial,
}

impl From<PublicKey> for TrustedKey {
    fn from(key: PublicKey) -> Self {
        Self {
            key_id: key.key_id(),
            material: TrustedKeyMaterial::Primary(key),
        }
    }
}

impl From<PublicSubkey> for TrustedKey {
    fn from(key: PublicSubkey) -> Self {
        Self {
            key_id: key.key_id(),
            material: TrustedKeyMaterial::Subkey(key),
        }
    }
}

impl TrustedKey {
    /// Construct an instance claiming an arbitrary key ID.
    #[cfg(test)]
    pub(crate) fn with_key_id(key_id: KeyId, material: TrustedKeyMaterial) -> Self {
        Self { key_id, material }
    }

    /// The key ID of this key.
    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// The key ID formatted as upper case hex.
    pub fn key_id_hex(&self) -> String {
        hex::encode_upper(self.key_id.as_ref())
    }

    /// The public key algorithm.
    pub fn algorithm(&self) -> PublicKeyAlgorithm {
        match &self.material {
            TrustedKeyMaterial::Primary(key) => key.algorithm(),
            TrustedKeyMaterial::Subkey(key) => key.algorithm(),
        }
    }

    /// When the key was created.
    pub fn created_at(&self) -> &DateTime<Utc> {
        match &self.material {
            TrustedKeyMaterial::Primary(key) => key.created_at(),
            TrustedKeyMaterial::Subkey(key) => key.created_at(),
        }
    }

    /// Whether this is a subkey of another key.
    pub fn is_subkey(&self) -> bool {
        matches!(self.material, TrustedKeyMaterial::Subkey(_))
    }

    /// The public key material.
    pub fn material(&self) -> &TrustedKeyMaterial {
        &self.material
    }

    /// Verify a signature over canonical cleartext with this key.
    pub fn verify(&self, signature: &SignaturePacket, plaintext: &[u8]) -> pgp::errors::Result<()> {
        match &self.material {
            TrustedKeyMaterial::Primary(key) => signature.verify(plaintext, key),
            TrustedKeyMaterial::Subkey(key) => signature.verify(plaintext, key),
        }
    }
}

/// An immutable set of trusted public keys.
#[derive(Clone, Debug, Default)]
pub struct TrustAnchor {
    keys: Vec<TrustedKey>,
}

impl FromIterator<TrustedKey> for TrustAnchor {
    fn from_iter<T: IntoIterator<Item = TrustedKey>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl TrustAnchor {
    /// The keys of the PAUSE indexer.
    pub fn pause() -> Result<Self> {
        EmbeddedTrustAnchor::Pause.trust_anchor()
    }

    /// Construct an instance from serialized public key packet bodies.
    pub fn from_embedded(keys: &[EmbeddedKey]) -> Result<Self> {
        let mut res = Vec::new();

        for key in keys {
            res.push(PublicKey::from_slice(Version::New, key.primary)?.into());

            for subkey in key.subkeys {
                res.push(PublicSubkey::from_slice(Version::New, subkey)?.into());
            }
        }

        Ok(Self { keys: res })
    }

    /// Construct an instance from parsed public keys.
    ///
    /// Primary keys and all their subkeys become trusted.
    pub fn from_signed_public_keys(keys: impl IntoIterator<Item = SignedPublicKey>) -> Self {
        keys.into_iter()
            .flat_map(|key| {
                std::iter::once(TrustedKey::from(key.primary_key)).chain(
                    key.public_subkeys
                        .into_iter()
                        .map(|subkey| TrustedKey::from(subkey.key)),
                )
            })
            .collect()
    }

    /// Construct an instance from ASCII armored public keys.
    ///
    /// Each string must hold a single `-----BEGIN PGP PUBLIC KEY BLOCK-----`.
    /// Self-signatures are verified.
    pub fn from_armored<'a>(armored: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut keys = vec![];

        for data in armored {
            let key = SignedPublicKey::from_armor_single(Cursor::new(data.as_bytes()))?.0;
            key.verify()?;
            keys.push(key);
        }

        Ok(Self::from_signed_public_keys(keys))
    }

    /// Iterate over all keys in this anchor.
    pub fn iter_keys(&self) -> impl Iterator<Item = &TrustedKey> {
        self.keys.iter()
    }

    /// Iterate over keys having the given key ID.
    ///
    /// More than one key can share an ID, e.g. across key rollover.
    pub fn keys_by_id<'slf, 'id: 'slf>(
        &'slf self,
        key_id: &'id KeyId,
    ) -> impl Iterator<Item = &'slf TrustedKey> {
        self.keys.iter().filter(move |key| key.key_id() == key_id)
    }

    /// Number of keys in this anchor.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether this anchor holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{
            cleartext::ClearSignedEnvelope,
            test_keys::{dsa_cleartext_sign, dsa_public_key, self_signed_key_pair, unrelated_key_pair},
        },
        pgp::{crypto::HashAlgorithm, ser::Serialize},
        std::io::Cursor,
        strum::IntoEnumIterator,
    };

    #[test]
    fn all_embedded_trust_anchors() -> Result<()> {
        for anchor in EmbeddedTrustAnchor::iter() {
            assert!(!anchor.trust_anchor()?.is_empty());
        }

        Ok(())
    }

    #[test]
    fn pause_key() -> Result<()> {
        let anchor = TrustAnchor::pause()?;
        assert_eq!(anchor.len(), 1);

        let key_id = KeyId::from_slice(&hex::decode("328DA867450F89EC")?)?;
        let keys = anchor.keys_by_id(&key_id).collect::<Vec<_>>();
        assert_eq!(keys.len(), 1);

        let key = keys[0];
        assert_eq!(key.key_id_hex(), "328DA867450F89EC");
        assert_eq!(key.algorithm(), PublicKeyAlgorithm::DSA);
        assert_eq!(key.created_at().timestamp(), 1044279440);
        assert!(!key.is_subkey());

        Ok(())
    }

    #[test]
    fn embedded_dsa_key_verifies() -> Result<()> {
        let key = dsa_public_key();

        let mut body = vec![];
        key.to_writer(&mut body)?;
        let embedded = [EmbeddedKey {
            primary: Box::leak(body.into_boxed_slice()),
            subkeys: &[],
        }];

        let anchor = TrustAnchor::from_embedded(&embedded)?;
        let key_id = key.key_id();
        let trusted = anchor.keys_by_id(&key_id).next().unwrap();
        assert_eq!(trusted.algorithm(), PublicKeyAlgorithm::DSA);

        let signed = dsa_cleartext_sign(HashAlgorithm::SHA1, Cursor::new(b"{ }\n".as_ref()))?;
        let envelope = ClearSignedEnvelope::decode(signed.as_bytes())?;

        trusted.verify(envelope.signature(), envelope.plaintext())?;
        assert!(trusted.verify(envelope.signature(), b"{}").is_err());

        Ok(())
    }

    #[test]
    fn armored_keys() -> Result<()> {
        let (_, public_key) = self_signed_key_pair();
        let (_, other_key) = unrelated_key_pair();

        let armored = [
            public_key.to_armored_string(None)?,
            other_key.to_armored_string(None)?,
        ];
        let anchor = TrustAnchor::from_armored(armored.iter().map(|s| s.as_str()))?;

        assert_eq!(anchor.len(), 2);
        assert_eq!(anchor.keys_by_id(&public_key.key_id()).count(), 1);
        assert_eq!(anchor.keys_by_id(&other_key.key_id()).count(), 1);

        let missing = KeyId::from_slice(&[0u8; 8])?;
        assert_eq!(anchor.keys_by_id(&missing).count(), 0);

        Ok(())
    }

    #[test]
    fn duplicate_key_ids_all_returned() {
        let (_, public_key) = self_signed_key_pair();

        let anchor = TrustAnchor::from_signed_public_keys([public_key.clone(), public_key.clone()]);
        assert_eq!(anchor.keys_by_id(&public_key.key_id()).count(), 2);
    }

    #[test]
    fn bad_armor_rejected() {
        assert!(TrustAnchor::from_armored(["not a key"]).is_err());
    }
}
