// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! PGP cleartext signed documents.

PAUSE publishes `CHECKSUMS` files using the PGP cleartext signature framework
defined by [RFC 4880 Section 7](https://datatracker.ietf.org/doc/html/rfc4880.html#section-7).
They have the form:

```text
-----BEGIN PGP SIGNED MESSAGE-----
Hash: <digest>

<dash-escaped signed content>
-----BEGIN PGP SIGNATURE-----
<headers>

<signature data>
-----END PGP SIGNATURE-----
```

[ClearSignedEnvelope] decodes such a document into the canonical signed bytes
and the embedded signature packet. The canonical bytes are exactly what the
signature digests: dash-escaping is reversed, trailing whitespace is removed
from every line, and lines are joined by CRLF with no line ending after the
last one. Nothing in this module consults a trust anchor.

[SignaturePacket] distinguishes legacy (version 2 and 3) signatures from modern
(version 4 and 5) ones. Both can be verified against a candidate public key.
*/

use {
    crate::error::{CpanIndexError, Result},
    digest::Digest,
    num_bigint_dig::BigUint,
    pgp::{
        crypto::{HashAlgorithm, Hasher},
        packet::{Packet, PublicKey, PublicSubkey, SignatureConfig, SignatureVersion, Subpacket},
        types::{KeyId, KeyVersion, Mpi, PublicKeyTrait, PublicParams},
        Signature,
    },
    signature::hazmat::PrehashVerifier,
    std::io::{self, Cursor},
};

const HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";
const SIGNATURE_ARMOR: &str = "-----BEGIN PGP SIGNATURE-----";

/// Wrapper around content digesting to work around lack of clone() in pgp crate.
#[derive(Clone)]
pub enum CleartextHasher {
    Md5(md5::Md5),
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Sha384(sha2::Sha384),
    Sha512(sha2::Sha512),
}

impl CleartextHasher {
    pub fn md5() -> Self {
        Self::Md5(md5::Md5::new())
    }

    pub fn sha1() -> Self {
        Self::Sha1(sha1::Sha1::new())
    }

    pub fn sha256() -> Self {
        Self::Sha256(sha2::Sha256::new())
    }

    pub fn sha384() -> Self {
        Self::Sha384(sha2::Sha384::new())
    }

    pub fn sha512() -> Self {
        Self::Sha512(sha2::Sha512::new())
    }

    /// Obtain a hasher for a PGP hash algorithm, if we support it.
    pub fn for_algorithm(algorithm: HashAlgorithm) -> Option<Self> {
        match algorithm {
            HashAlgorithm::MD5 => Some(Self::md5()),
            HashAlgorithm::SHA1 => Some(Self::sha1()),
            HashAlgorithm::SHA2_256 => Some(Self::sha256()),
            HashAlgorithm::SHA2_384 => Some(Self::sha384()),
            HashAlgorithm::SHA2_512 => Some(Self::sha512()),
            _ => None,
        }
    }

    /// Resolve an instance from the name used by `Hash:` armor headers.
    pub fn from_armor_name(name: &str) -> Option<Self> {
        match name {
            "MD5" => Some(Self::md5()),
            "SHA1" => Some(Self::sha1()),
            "SHA256" => Some(Self::sha256()),
            "SHA384" => Some(Self::sha384()),
            "SHA512" => Some(Self::sha512()),
            _ => None,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Md5(_) => HashAlgorithm::MD5,
            Self::Sha1(_) => HashAlgorithm::SHA1,
            Self::Sha256(_) => HashAlgorithm::SHA2_256,
            Self::Sha384(_) => HashAlgorithm::SHA2_384,
            Self::Sha512(_) => HashAlgorithm::SHA2_512,
        }
    }

    /// The name of this algorithm in `Hash:` armor headers.
    pub fn armor_name(&self) -> &'static str {
        match self {
            Self::Md5(_) => "MD5",
            Self::Sha1(_) => "SHA1",
            Self::Sha256(_) => "SHA256",
            Self::Sha384(_) => "SHA384",
            Self::Sha512(_) => "SHA512",
        }
    }
}

impl std::io::Write for CleartextHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Hasher for CleartextHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(digest) => digest.update(data),
            Self::Sha1(digest) => digest.update(data),
            Self::Sha256(digest) => digest.update(data),
            Self::Sha384(digest) => digest.update(data),
            Self::Sha512(digest) => digest.update(data),
        }
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        match *self {
            Self::Md5(digest) => digest.finalize().to_vec(),
            Self::Sha1(digest) => digest.finalize().to_vec(),
            Self::Sha256(digest) => digest.finalize().to_vec(),
            Self::Sha384(digest) => digest.finalize().to_vec(),
            Self::Sha512(digest) => digest.finalize().to_vec(),
        }
    }
}

/// Public key packets whose algorithm parameters can be inspected.
///
/// DSA verification is performed here rather than by the key itself.
pub trait VerifyingKey: PublicKeyTrait {
    fn public_params(&self) -> &PublicParams;
}

impl VerifyingKey for PublicKey {
    fn public_params(&self) -> &PublicParams {
        PublicKey::public_params(self)
    }
}

impl VerifyingKey for PublicSubkey {
    fn public_params(&self) -> &PublicParams {
        PublicSubkey::public_params(self)
    }
}

/// Compute the digest a signature is made over.
///
/// This is the canonical cleartext followed by the hashed signature metadata
/// and the version specific trailer.
pub fn signature_digest(config: &SignatureConfig, plaintext: &[u8]) -> pgp::errors::Result<Vec<u8>> {
    let mut hasher = Box::new(CleartextHasher::for_algorithm(config.hash_alg).ok_or_else(|| {
        pgp::errors::Error::Unsupported(format!("hash algorithm {:?}", config.hash_alg))
    })?);

    hasher.update(plaintext);
    let len = config.hash_signature_data(&mut *hasher)?;
    hasher.update(&config.trailer(len));

    Ok(hasher.finish())
}

fn dsa_error(e: signature::Error) -> pgp::errors::Error {
    pgp::errors::Error::Message(format!("DSA: {}", e))
}

/// Verify a DSA signature given as `r` and `s` MPIs over a digest.
///
/// Digests wider than `q` are truncated to its width.
fn verify_dsa(
    (p, q, g, y): (&Mpi, &Mpi, &Mpi, &Mpi),
    digest: &[u8],
    sig: &[Mpi],
) -> pgp::errors::Result<()> {
    if sig.len() != 2 {
        return Err(pgp::errors::Error::Message(format!(
            "invalid DSA signature: expected 2 MPIs; got {}",
            sig.len()
        )));
    }

    let components =
        dsa::Components::from_components(BigUint::from(p), BigUint::from(q), BigUint::from(g))
            .map_err(dsa_error)?;
    let key = dsa::VerifyingKey::from_components(components, BigUint::from(y)).map_err(dsa_error)?;
    let signature = dsa::Signature::from_components(BigUint::from(&sig[0]), BigUint::from(&sig[1]))
        .map_err(dsa_error)?;

    key.verify_prehash(digest, &signature).map_err(dsa_error)
}

/// Digest canonical cleartext plus signature metadata and check it against a key.
fn verify_signature_over(
    signature: &Signature,
    plaintext: &[u8],
    key: &impl VerifyingKey,
) -> pgp::errors::Result<()> {
    let digest = signature_digest(&signature.config, plaintext)?;

    if digest[0..2] != signature.signed_hash_value {
        return Err(pgp::errors::Error::Message(
            "invalid signed hash value".into(),
        ));
    }

    match key.public_params() {
        PublicParams::DSA { p, q, g, y } => verify_dsa((p, q, g, y), &digest, &signature.signature),
        _ => key.verify_signature(signature.config.hash_alg, &digest, &signature.signature),
    }
}

/// Common behavior of signature packet flavors.
pub trait CleartextSignature {
    /// The key ID of the key claiming to have produced this signature.
    fn issuer_key_id(&self) -> Result<KeyId>;

    /// The digest algorithm the signature was computed with.
    fn hash_algorithm(&self) -> HashAlgorithm;

    /// Verify this signature over canonical cleartext using a candidate key.
    fn verify(&self, plaintext: &[u8], key: &impl VerifyingKey) -> pgp::errors::Result<()>;
}

/// A version 2 or 3 signature packet.
///
/// These have a fixed layout with the issuer key ID and creation time stored
/// directly in the packet.
#[derive(Clone, Debug)]
pub struct LegacySignature(Signature);

impl CleartextSignature for LegacySignature {
    fn issuer_key_id(&self) -> Result<KeyId> {
        self.0.config.issuer.clone().ok_or_else(|| {
            CpanIndexError::Format("invalid signature: legacy signature lacks issuer".into())
        })
    }

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.0.config.hash_alg
    }

    fn verify(&self, plaintext: &[u8], key: &impl VerifyingKey) -> pgp::errors::Result<()> {
        verify_signature_over(&self.0, plaintext, key)
    }
}

/// Derive the key ID of a key from its fingerprint.
fn fingerprint_key_id(version: KeyVersion, fingerprint: &[u8]) -> pgp::errors::Result<KeyId> {
    match version {
        KeyVersion::V5 => KeyId::from_slice(&fingerprint[..8]),
        _ => KeyId::from_slice(&fingerprint[fingerprint.len() - 8..]),
    }
}

/// A version 4 or 5 signature packet.
///
/// The issuer is carried in a subpacket: either `Issuer` or, for signers that
/// only emit it, the key ID derived from `IssuerFingerprint`. Version 4 key IDs
/// are the low 64 bits of the fingerprint, version 5 key IDs the high 64 bits.
#[derive(Clone, Debug)]
pub struct ModernSignature(Signature);

impl CleartextSignature for ModernSignature {
    fn issuer_key_id(&self) -> Result<KeyId> {
        if let Some(issuer) = self.0.issuer() {
            return Ok(issuer.clone());
        }

        let (version, fingerprint) = self
            .0
            .config
            .hashed_subpackets
            .iter()
            .chain(self.0.config.unhashed_subpackets.iter())
            .find_map(|packet| match packet {
                Subpacket::IssuerFingerprint(version, fingerprint) if fingerprint.len() >= 8 => {
                    Some((version, fingerprint))
                }
                _ => None,
            })
            .ok_or_else(|| {
                CpanIndexError::Format("invalid signature: no issuer subpacket".into())
            })?;

        Ok(fingerprint_key_id(*version, fingerprint)?)
    }

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.0.config.hash_alg
    }

    fn verify(&self, plaintext: &[u8], key: &impl VerifyingKey) -> pgp::errors::Result<()> {
        verify_signature_over(&self.0, plaintext, key)
    }
}

/// A signature packet embedded in a cleartext signed document.
#[derive(Clone, Debug)]
pub enum SignaturePacket {
    Legacy(LegacySignature),
    Modern(ModernSignature),
}

impl From<Signature> for SignaturePacket {
    fn from(signature: Signature) -> Self {
        match signature.config.version {
            SignatureVersion::V2 | SignatureVersion::V3 => Self::Legacy(LegacySignature(signature)),
            SignatureVersion::V4 | SignatureVersion::V5 => Self::Modern(ModernSignature(signature)),
        }
    }
}

impl SignaturePacket {
    /// Obtain the underlying PGP signature.
    pub fn signature(&self) -> &Signature {
        match self {
            Self::Legacy(sig) => &sig.0,
            Self::Modern(sig) => &sig.0,
        }
    }
}

impl CleartextSignature for SignaturePacket {
    fn issuer_key_id(&self) -> Result<KeyId> {
        match self {
            Self::Legacy(sig) => sig.issuer_key_id(),
            Self::Modern(sig) => sig.issuer_key_id(),
        }
    }

    fn hash_algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Legacy(sig) => sig.hash_algorithm(),
            Self::Modern(sig) => sig.hash_algorithm(),
        }
    }

    fn verify(&self, plaintext: &[u8], key: &impl VerifyingKey) -> pgp::errors::Result<()> {
        match self {
            Self::Legacy(sig) => sig.verify(plaintext, key),
            Self::Modern(sig) => sig.verify(plaintext, key),
        }
    }
}

enum DecodeState {
    /// Expecting the `-----BEGIN PGP SIGNED MESSAGE-----` line.
    Initial,

    /// In `Hash: ` headers section following cleartext armor header.
    Hashes,

    /// Reading the dash-escaped cleartext message.
    Cleartext,
}

/// Strip a line terminator and any trailing spaces and tabs.
fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\r' | b'\n' | b' ' | b'\t') {
        end -= 1;
    }

    &line[..end]
}

/// A decoded PGP cleartext signed document.
#[derive(Clone, Debug)]
pub struct ClearSignedEnvelope {
    plaintext: Vec<u8>,
    hash_algorithms: Vec<HashAlgorithm>,
    signature: SignaturePacket,
}

impl ClearSignedEnvelope {
    /// Decode a cleartext signed document.
    ///
    /// Only the first signature packet of the signature block is retained.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut state = DecodeState::Initial;
        let mut plaintext = Vec::with_capacity(data.len());
        let mut hash_algorithms = vec![];
        let mut have_line = false;
        let mut offset = 0;
        let mut signature_offset = None;

        for line in data.split_inclusive(|b| *b == b'\n') {
            let line_offset = offset;
            offset += line.len();

            match state {
                DecodeState::Initial => {
                    if trim_line_end(line) != HEADER.as_bytes() {
                        return Err(CpanIndexError::Format(format!(
                            "no signed block: expected `{}`",
                            HEADER
                        )));
                    }

                    state = DecodeState::Hashes;
                }
                DecodeState::Hashes => {
                    let line = trim_line_end(line);

                    if line.is_empty() {
                        state = DecodeState::Cleartext;
                    } else if let Some(names) = line.strip_prefix(b"Hash: ") {
                        // Comma delimited list.
                        for name in String::from_utf8_lossy(names).split(',') {
                            let name = name.trim();

                            if name.is_empty() {
                                continue;
                            }

                            let hasher = CleartextHasher::from_armor_name(name).ok_or_else(|| {
                                CpanIndexError::Format(format!(
                                    "no signed block: unsupported hash type {}",
                                    name
                                ))
                            })?;

                            if !hash_algorithms.contains(&hasher.algorithm()) {
                                hash_algorithms.push(hasher.algorithm());
                            }
                        }
                    } else {
                        return Err(CpanIndexError::Format(format!(
                            "no signed block: expected Hash: header; got {}",
                            String::from_utf8_lossy(line)
                        )));
                    }
                }
                // From RFC 4880 Section 7.1:
                //
                //    When reversing dash-escaping, an implementation MUST strip the string
                //    "- " if it occurs at the beginning of a line.
                //
                //    The line ending (i.e., the <CR><LF>) before the '-----BEGIN PGP
                //    SIGNATURE-----' line that terminates the signed text is not
                //    considered part of the signed text.
                DecodeState::Cleartext => {
                    if trim_line_end(line) == SIGNATURE_ARMOR.as_bytes() {
                        signature_offset = Some(line_offset);
                        break;
                    }

                    let content = trim_line_end(line.strip_prefix(b"- ").unwrap_or(line));

                    if have_line {
                        plaintext.extend_from_slice(b"\r\n");
                    }
                    plaintext.extend_from_slice(content);
                    have_line = true;
                }
            }
        }

        let signature_offset = signature_offset.ok_or_else(|| {
            CpanIndexError::Format("no signed block: signature armor not found".into())
        })?;

        let signature = Self::parse_signature_block(&data[signature_offset..])?;

        if !hash_algorithms.is_empty() && !hash_algorithms.contains(&signature.hash_algorithm()) {
            return Err(CpanIndexError::Format(format!(
                "invalid signature: hash algorithm {:?} not advertised by Hash: header",
                signature.hash_algorithm()
            )));
        }

        Ok(Self {
            plaintext,
            hash_algorithms,
            signature,
        })
    }

    fn parse_signature_block(data: &[u8]) -> Result<SignaturePacket> {
        let mut dearmor = pgp::armor::Dearmor::new(Cursor::new(data));
        dearmor.read_header().map_err(|e| {
            CpanIndexError::Format(format!("no signed block: bad signature armor: {:?}", e))
        })?;

        if !matches!(dearmor.typ, Some(pgp::armor::BlockType::Signature)) {
            return Err(CpanIndexError::Format(
                "no signed block: armor is not a PGP signature".into(),
            ));
        }

        match pgp::packet::PacketParser::new(dearmor).next() {
            Some(Ok(Packet::Signature(signature))) => Ok(signature.into()),
            Some(Ok(packet)) => Err(CpanIndexError::Format(format!(
                "invalid signature: expected Signature packet; got {:?}",
                packet.tag()
            ))),
            Some(Err(e)) => Err(CpanIndexError::Format(format!(
                "invalid signature: {:?}",
                e
            ))),
            None => Err(CpanIndexError::Format(
                "invalid signature: no signature packet".into(),
            )),
        }
    }

    /// The canonical signed bytes.
    pub fn plaintext(&self) -> &[u8] {
        &self.plaintext
    }

    /// Consume self, returning the canonical signed bytes.
    pub fn into_plaintext(self) -> Vec<u8> {
        self.plaintext
    }

    /// Hash algorithms advertised by the `Hash:` armor headers.
    pub fn hash_algorithms(&self) -> &[HashAlgorithm] {
        &self.hash_algorithms
    }

    /// The embedded signature packet.
    pub fn signature(&self) -> &SignaturePacket {
        &self.signature
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::test_keys::{
            cleartext_sign, dsa_cleartext_sign, dsa_public_key, self_signed_key,
            self_signed_key_pair, KEY_PASSPHRASE,
        },
        chrono::SubsecRound,
        indoc::indoc,
        pgp::{packet::SignatureType, types::KeyTrait},
        smallvec::SmallVec,
    };

    const MESSAGE: &str = indoc! {"
        # comment
        -dash line
        trailing whitespace   \t
        From the start
        last line
    "};

    #[test]
    fn decode_canonicalizes_plaintext() -> Result<()> {
        let (key, public_key) = self_signed_key_pair();
        let signed = cleartext_sign(
            &key,
            KEY_PASSPHRASE,
            HashAlgorithm::SHA2_256,
            Cursor::new(MESSAGE.as_bytes()),
        )?;

        assert!(signed.contains("\n- -dash line\n"));
        assert!(signed.contains("\n- From the start\n"));

        let envelope = ClearSignedEnvelope::decode(signed.as_bytes())?;

        assert_eq!(
            envelope.plaintext(),
            b"# comment\r\n-dash line\r\ntrailing whitespace\r\nFrom the start\r\nlast line"
        );
        assert_eq!(envelope.hash_algorithms(), &[HashAlgorithm::SHA2_256]);
        assert!(matches!(envelope.signature(), SignaturePacket::Modern(_)));
        assert_eq!(envelope.signature().issuer_key_id()?, key.key_id());
        assert_eq!(envelope.signature().hash_algorithm(), HashAlgorithm::SHA2_256);

        envelope
            .signature()
            .verify(envelope.plaintext(), &public_key.primary_key)
            .expect("signature should verify");

        Ok(())
    }

    #[test]
    fn crlf_document_decodes_identically() -> Result<()> {
        let (key, public_key) = self_signed_key_pair();
        let signed = cleartext_sign(
            &key,
            KEY_PASSPHRASE,
            HashAlgorithm::SHA2_512,
            Cursor::new(MESSAGE.as_bytes()),
        )?;

        let crlf = signed.replace('\n', "\r\n");
        let envelope = ClearSignedEnvelope::decode(crlf.as_bytes())?;

        envelope
            .signature()
            .verify(envelope.plaintext(), &public_key.primary_key)
            .expect("signature should verify");

        Ok(())
    }

    #[test]
    fn missing_header_rejected() {
        let res = ClearSignedEnvelope::decode(b"Hash: SHA256\n\nfoo\n");
        assert!(matches!(res, Err(CpanIndexError::Format(_))));

        let res = ClearSignedEnvelope::decode(b"");
        assert!(matches!(res, Err(CpanIndexError::Format(_))));
    }

    #[test]
    fn missing_signature_rejected() {
        let res = ClearSignedEnvelope::decode(
            indoc! {"
                -----BEGIN PGP SIGNED MESSAGE-----
                Hash: SHA256

                hello
            "}
            .as_bytes(),
        );
        assert!(matches!(res, Err(CpanIndexError::Format(_))));
    }

    #[test]
    fn bad_armor_headers_rejected() {
        let res = ClearSignedEnvelope::decode(
            indoc! {"
                -----BEGIN PGP SIGNED MESSAGE-----
                Charset: UTF-8

                hello
            "}
            .as_bytes(),
        );
        assert!(matches!(res, Err(CpanIndexError::Format(_))));

        let res = ClearSignedEnvelope::decode(
            indoc! {"
                -----BEGIN PGP SIGNED MESSAGE-----
                Hash: WHIRLPOOL

                hello
            "}
            .as_bytes(),
        );
        assert!(matches!(res, Err(CpanIndexError::Format(_))));
    }

    #[test]
    fn non_signature_packet_rejected() -> Result<()> {
        let (_, public_key) = self_signed_key_pair();
        let armored = public_key.to_armored_string(None)?;

        // Relabel a public key block so the armor type matches but the packet doesn't.
        let document = format!(
            "{}\nHash: SHA256\n\nhello\n{}",
            HEADER,
            armored.replace("PUBLIC KEY BLOCK", "SIGNATURE")
        );

        let err = ClearSignedEnvelope::decode(document.as_bytes()).unwrap_err();
        assert!(matches!(&err, CpanIndexError::Format(msg) if msg.starts_with("invalid signature")));

        Ok(())
    }

    #[test]
    fn unadvertised_hash_rejected() -> Result<()> {
        let key = self_signed_key();
        let signed = cleartext_sign(
            &key,
            KEY_PASSPHRASE,
            HashAlgorithm::SHA2_256,
            Cursor::new(b"hello\n".as_ref()),
        )?;

        let signed = signed.replace("Hash: SHA256", "Hash: SHA512");

        assert!(matches!(
            ClearSignedEnvelope::decode(signed.as_bytes()),
            Err(CpanIndexError::Format(_))
        ));

        Ok(())
    }

    #[test]
    fn legacy_signature_verifies() -> Result<()> {
        let (key, public_key) = self_signed_key_pair();
        let plaintext = b"{ 'a' => 1 }".to_vec();

        let config = SignatureConfig {
            version: SignatureVersion::V3,
            typ: SignatureType::Text,
            pub_alg: key.algorithm(),
            hash_alg: HashAlgorithm::SHA1,
            hashed_subpackets: vec![],
            unhashed_subpackets: vec![],
            created: Some(chrono::Utc::now().trunc_subsecs(0)),
            issuer: Some(key.key_id()),
        };
        let signature = config.sign(&key, KEY_PASSPHRASE, Cursor::new(plaintext.clone()))?;

        let packet = SignaturePacket::from(signature);
        assert!(matches!(packet, SignaturePacket::Legacy(_)));
        assert_eq!(packet.issuer_key_id()?, key.key_id());
        assert_eq!(packet.hash_algorithm(), HashAlgorithm::SHA1);

        packet
            .verify(&plaintext, &public_key.primary_key)
            .expect("legacy signature should verify");
        assert!(packet
            .verify(b"{ 'a' => 2 }", &public_key.primary_key)
            .is_err());

        Ok(())
    }

    #[test]
    fn dsa_signature_verifies() -> Result<()> {
        let key = dsa_public_key();
        let signed = dsa_cleartext_sign(HashAlgorithm::SHA2_256, Cursor::new(MESSAGE.as_bytes()))?;

        let envelope = ClearSignedEnvelope::decode(signed.as_bytes())?;
        assert_eq!(envelope.signature().issuer_key_id()?, key.key_id());
        assert_eq!(envelope.signature().signature().signature.len(), 2);

        envelope
            .signature()
            .verify(envelope.plaintext(), &key)
            .expect("DSA signature should verify");

        let mut tampered = envelope.plaintext().to_vec();
        tampered[0] = b'!';
        assert!(envelope.signature().verify(&tampered, &key).is_err());

        Ok(())
    }

    #[test]
    fn dsa_signature_with_sha1() -> Result<()> {
        let key = dsa_public_key();
        let signed = dsa_cleartext_sign(HashAlgorithm::SHA1, Cursor::new(b"{ }\n".as_ref()))?;

        let envelope = ClearSignedEnvelope::decode(signed.as_bytes())?;
        assert_eq!(envelope.plaintext(), b"{ }");

        envelope
            .signature()
            .verify(envelope.plaintext(), &key)
            .expect("DSA signature should verify");

        // An RSA key never verifies a DSA signature.
        let (_, rsa_key) = self_signed_key_pair();
        assert!(envelope
            .signature()
            .verify(envelope.plaintext(), &rsa_key.primary_key)
            .is_err());

        Ok(())
    }

    #[test]
    fn issuer_from_fingerprint() -> Result<()> {
        let v4 = (1..=20).collect::<Vec<u8>>();
        assert_eq!(
            fingerprint_key_id(KeyVersion::V4, &v4)?,
            KeyId::from_slice(&v4[12..])?
        );

        let v5 = (1..=32).collect::<Vec<u8>>();
        assert_eq!(
            fingerprint_key_id(KeyVersion::V5, &v5)?,
            KeyId::from_slice(&v5[..8])?
        );

        let key = self_signed_key();
        let config = SignatureConfig::new_v4(
            Default::default(),
            SignatureType::Text,
            key.algorithm(),
            HashAlgorithm::SHA2_256,
            vec![Subpacket::IssuerFingerprint(
                KeyVersion::V5,
                SmallVec::from_slice(&v5),
            )],
            vec![],
        );
        let packet = SignaturePacket::from(Signature::from_config(config, [0, 0], vec![]));

        assert!(matches!(packet, SignaturePacket::Modern(_)));
        assert_eq!(packet.issuer_key_id()?, KeyId::from_slice(&v5[..8])?);

        Ok(())
    }
}
