// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! CPAN index primitives.

This crate implements readers for the metadata files the PAUSE indexer
publishes to CPAN mirrors. Both formats are produced by a third party and
consumed by tools deciding what to download and install, so they are treated
as untrusted input: parsing is strict and fails closed.

The canonical home of this crate is <https://github.com/indygreg/PyOxidizer>. Please file issues
and pull requests there.

# A Tour of Functionality

`CHECKSUMS` files carry per-file digests for a directory under `authors/id/`.
They are PGP cleartext signed. The [cleartext] module decodes the cleartext
signature framework into canonical signed bytes plus a [cleartext::SignaturePacket].
The [trust_anchor] module defines [trust_anchor::TrustAnchor], the set of keys
whose signatures are accepted. The keys of PAUSE itself are embedded in this
crate and available via [trust_anchor::TrustAnchor::pause()].
[checksums::verify()] checks a document against an anchor and
[checksums::transcode()] converts the verified Perl hash literal into a
[checksums::ChecksumsDocument]. [checksums::read_checksums()] does it all.

`02packages.details.txt.gz` maps package names to the distribution providing
them. [packages::PackagesIndexReader] opens such a stream, parsing its header
(see [header::PackagesIndexHeader]) and then yielding
[packages::PackageIndexEntry] values from a background task through
[packages::PackagesIndexEntries], which implements [futures::Stream].

All errors are represented by [error::CpanIndexError].

# Scope

Nothing here performs network I/O. Callers fetch files however they want and
hand the bytes or an [futures::AsyncBufRead] to this crate.
*/

pub mod checksums;
pub mod cleartext;
pub mod error;
pub mod header;
pub mod io;
pub mod packages;
pub mod pause_key;
#[cfg(test)]
mod test_keys;
pub mod trust_anchor;
