// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Throwaway signing keys and cleartext signing for tests. */

use {
    crate::{
        cleartext::{signature_digest, CleartextHasher},
        error::Result,
    },
    chrono::SubsecRound,
    once_cell::sync::Lazy,
    pgp::{
        crypto::{HashAlgorithm, PublicKeyAlgorithm, SymmetricKeyAlgorithm},
        packet::{Packet, PublicKey, SignatureConfig, SignatureType, Subpacket},
        types::{
            CompressionAlgorithm, KeyTrait, KeyVersion, Mpi, PublicParams, SecretKeyTrait, Version,
        },
        KeyType, SecretKeyParamsBuilder, Signature, SignedPublicKey, SignedSecretKey,
    },
    signature::hazmat::PrehashSigner,
    smallvec::{smallvec, SmallVec},
    std::io::{BufRead, Cursor},
};

static PRIMARY: Lazy<(SignedSecretKey, SignedPublicKey)> = Lazy::new(generate_key_pair);
static UNRELATED: Lazy<(SignedSecretKey, SignedPublicKey)> = Lazy::new(generate_key_pair);
static DSA: Lazy<(dsa::SigningKey, PublicKey)> = Lazy::new(generate_dsa_key);

const HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";

/// Passphrase function for keys produced by this module.
pub const KEY_PASSPHRASE: fn() -> String = String::new;

fn generate_key_pair() -> (SignedSecretKey, SignedPublicKey) {
    let mut key_params = SecretKeyParamsBuilder::default();
    key_params
        .key_type(KeyType::Rsa(2048))
        .preferred_symmetric_algorithms(smallvec![SymmetricKeyAlgorithm::AES256])
        .preferred_hash_algorithms(smallvec![HashAlgorithm::SHA2_256])
        .preferred_compression_algorithms(smallvec![CompressionAlgorithm::ZLIB])
        .can_create_certificates(false)
        .can_sign(true)
        .primary_user_id("PAUSE Test <pause@example.com>".into());

    let secret_key = key_params
        .build()
        .expect("key params should build")
        .generate()
        .expect("key generation should succeed");
    let secret_key = secret_key
        .sign(KEY_PASSPHRASE)
        .expect("self-signing secret key should succeed");

    let public_key = secret_key
        .public_key()
        .sign(&secret_key, KEY_PASSPHRASE)
        .expect("self-signing public key should succeed");

    (secret_key, public_key)
}

// The PAUSE key is DSA 1024/160, so tests use the same parameter sizes.
#[allow(deprecated)]
fn generate_dsa_key() -> (dsa::SigningKey, PublicKey) {
    let mut rng = rand::thread_rng();

    let components = dsa::Components::generate(&mut rng, dsa::KeySize::DSA_1024_160);
    let signing_key = dsa::SigningKey::generate(&mut rng, components);

    let verifying_key = signing_key.verifying_key();
    let components = verifying_key.components();

    let public_key = PublicKey::new(
        Version::New,
        KeyVersion::V4,
        PublicKeyAlgorithm::DSA,
        chrono::Utc::now().trunc_subsecs(0),
        None,
        PublicParams::DSA {
            p: Mpi::from(components.p()),
            q: Mpi::from(components.q()),
            g: Mpi::from(components.g()),
            y: Mpi::from(verifying_key.y()),
        },
    )
    .expect("DSA public key packet should build");

    (signing_key, public_key)
}

/// A self-signed PGP key pair suitable for producing signatures.
///
/// RSA key generation is slow, so the pair is generated once per test process.
pub fn self_signed_key_pair() -> (SignedSecretKey, SignedPublicKey) {
    PRIMARY.clone()
}

/// The secret half of [self_signed_key_pair()].
pub fn self_signed_key() -> SignedSecretKey {
    PRIMARY.0.clone()
}

/// A key pair unrelated to [self_signed_key_pair()].
pub fn unrelated_key_pair() -> (SignedSecretKey, SignedPublicKey) {
    UNRELATED.clone()
}

/// The public key packet of the DSA key used by [dsa_cleartext_sign()].
pub fn dsa_public_key() -> PublicKey {
    DSA.1.clone()
}

/// Encode data in the cleartext signature framework.
///
/// `sign` receives the signature configuration and the canonical cleartext
/// and produces the signature packet.
fn cleartext_encode<R, F>(
    key: &impl KeyTrait,
    hash_algorithm: HashAlgorithm,
    data: R,
    sign: F,
) -> Result<String>
where
    R: BufRead,
    F: FnOnce(SignatureConfig, &[u8]) -> Result<Signature>,
{
    let hash_name = CleartextHasher::for_algorithm(hash_algorithm)
        .ok_or_else(|| {
            pgp::errors::Error::Unsupported(
                "hash algorithm unsupported for cleartext signatures".to_string(),
            )
        })?
        .armor_name();

    // Dash-escaped cleartext is the ordinary cleartext where every line starting
    // with a dash is prefixed by "- ". Trailing whitespace is not signed.
    let mut dashed_lines = vec![];
    let mut source_lines = vec![];

    for line in data.lines() {
        let line = line?;
        let line = line.trim_end();

        dashed_lines.push(if line.starts_with('-') || line.starts_with("From ") {
            format!("- {}", line)
        } else {
            line.to_string()
        });

        source_lines.push(line.to_string());
    }

    let cleartext = source_lines.join("\r\n").into_bytes();

    let hashed_subpackets = vec![
        Subpacket::IssuerFingerprint(KeyVersion::V4, SmallVec::from_slice(&key.fingerprint())),
        Subpacket::SignatureCreationTime(chrono::Utc::now().trunc_subsecs(0)),
    ];
    let unhashed_subpackets = vec![Subpacket::Issuer(key.key_id())];

    let config = SignatureConfig::new_v4(
        Default::default(),
        SignatureType::Text,
        key.algorithm(),
        hash_algorithm,
        hashed_subpackets,
        unhashed_subpackets,
    );

    let signature = sign(config, &cleartext)?;

    let packet = Packet::Signature(signature);
    let mut writer = Cursor::new(Vec::<u8>::new());
    pgp::armor::write(&packet, pgp::armor::BlockType::Signature, &mut writer, None)?;

    let signature_string = String::from_utf8(writer.into_inner())
        .map_err(|e| pgp::errors::Error::Utf8Error(e.utf8_error()))?;

    let lines = vec![HEADER.to_string(), format!("Hash: {}", hash_name), "".to_string()]
        .into_iter()
        .chain(dashed_lines.into_iter())
        .chain(std::iter::once(signature_string))
        .collect::<Vec<_>>();

    Ok(lines.join("\n"))
}

/// Produce a cleartext signature over data.
///
/// The returned value is a multiline string with LF line endings containing the PGP
/// cleartext framework encoded cleartext and signature. The signature is produced by
/// the provided key using the specified hashing algorithm.
pub fn cleartext_sign<PW, R>(
    key: &impl SecretKeyTrait,
    key_pw: PW,
    hash_algorithm: HashAlgorithm,
    data: R,
) -> Result<String>
where
    PW: FnOnce() -> String,
    R: BufRead,
{
    cleartext_encode(key, hash_algorithm, data, |config, cleartext| {
        Ok(config.sign(key, key_pw, Cursor::new(cleartext))?)
    })
}

/// Produce a cleartext signature over data with the DSA key of [dsa_public_key()].
pub fn dsa_cleartext_sign<R: BufRead>(hash_algorithm: HashAlgorithm, data: R) -> Result<String> {
    let (signing_key, public_key) = &*DSA;

    cleartext_encode(public_key, hash_algorithm, data, |config, cleartext| {
        let digest = signature_digest(&config, cleartext)?;

        let signature: dsa::Signature = signing_key
            .sign_prehash(&digest)
            .expect("DSA signing should succeed");

        Ok(Signature::from_config(
            config,
            [digest[0], digest[1]],
            vec![Mpi::from(signature.r()), Mpi::from(signature.s())],
        ))
    })
}
