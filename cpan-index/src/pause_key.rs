// Code generated by `cpan-index generate-trust-anchor`. DO NOT EDIT.

/*! Public key material of the PAUSE indexer. */

use crate::trust_anchor::EmbeddedKey;

/// Keys used by PAUSE to sign `CHECKSUMS` files.
pub const PAUSE_KEYS: &[EmbeddedKey] = &[
    // 328DA867450F89EC (DSA, created 2003-02-03T13:37:20Z)
    EmbeddedKey {
        primary: &[
            0x04, 0x3e, 0x3e, 0x70, 0x90, 0x11, 0x04, 0x00, 0xb1, 0x38, 0x1c, 0x98,
            0xd1, 0x22, 0x41, 0x06, 0xe2, 0x68, 0x16, 0xb1, 0xf6, 0x86, 0x8a, 0x91,
            0x16, 0x7c, 0xb8, 0xdb, 0x78, 0x18, 0xe9, 0x5d, 0xe3, 0xab, 0x5b, 0x93,
            0x80, 0x66, 0x3f, 0x3c, 0xf6, 0xb1, 0x3f, 0xe4, 0xaa, 0xaf, 0x74, 0x73,
            0xc4, 0xf7, 0x2d, 0xe2, 0xf2, 0x5c, 0xb2, 0x8a, 0x38, 0xf2, 0x9c, 0x01,
            0xb0, 0xc1, 0xcb, 0xad, 0x67, 0xce, 0x46, 0xad, 0xba, 0xcd, 0xbe, 0x9e,
            0x2a, 0x09, 0x8c, 0xab, 0xf0, 0x90, 0xa3, 0x68, 0x33, 0x69, 0x16, 0xde,
            0x47, 0x10, 0xa2, 0xde, 0x47, 0xb8, 0x28, 0x19, 0xae, 0x69, 0x11, 0x22,
            0xe9, 0x18, 0xda, 0x65, 0x25, 0x3d, 0xe3, 0x20, 0x01, 0xb4, 0x39, 0xac,
            0xa5, 0x40, 0x6b, 0xa5, 0x85, 0x7c, 0xcd, 0xf6, 0x4c, 0xbf, 0x96, 0x48,
            0x42, 0x58, 0x3d, 0x5b, 0x54, 0xee, 0xeb, 0xa0, 0x45, 0x39, 0x4a, 0xeb,
            0x35, 0xe0, 0xe9, 0x2b, 0x00, 0xa0, 0xa2, 0xc0, 0xa9, 0xf5, 0xdb, 0x4d,
            0x00, 0xc8, 0x47, 0x93, 0x3c, 0x6c, 0xf1, 0x42, 0x47, 0xe6, 0x2d, 0xd4,
            0xcd, 0xbd, 0x03, 0xff, 0x45, 0x4b, 0xa0, 0x01, 0x3c, 0xb0, 0xe7, 0xd4,
            0x5e, 0xa8, 0xdc, 0xdf, 0xca, 0xf1, 0x88, 0x7b, 0x86, 0x04, 0x54, 0x8d,
            0x0b, 0xbd, 0x08, 0x87, 0x89, 0xb3, 0x19, 0x40, 0x89, 0x30, 0x64, 0xf8,
            0xcf, 0x55, 0xf7, 0x2b, 0xab, 0x94, 0x6b, 0x09, 0xd7, 0x32, 0x87, 0x3c,
            0x5e, 0xa3, 0xda, 0x62, 0x71, 0x20, 0x3b, 0x3c, 0xed, 0x33, 0x29, 0xb2,
            0x76, 0xda, 0xfe, 0xba, 0xb8, 0xd4, 0xc1, 0xc1, 0xa7, 0xb9, 0x70, 0xd2,
            0xa5, 0x5e, 0xa7, 0xba, 0x51, 0x39, 0x8a, 0xbc, 0x61, 0xce, 0x58, 0xa4,
            0x49, 0x32, 0x72, 0xff, 0x8d, 0x90, 0xcd, 0x33, 0x1c, 0xad, 0xd4, 0x72,
            0x9d, 0xf7, 0xe6, 0x26, 0x8f, 0x4f, 0x46, 0x0c, 0xa6, 0x30, 0x8f, 0x06,
            0x81, 0x66, 0x98, 0x1b, 0x98, 0x37, 0xcf, 0x31, 0x80, 0x86, 0x2e, 0x41,
            0x03, 0xa1, 0xbc, 0x24, 0xa7, 0xc2, 0xf7, 0x72, 0x15, 0xc6, 0x24, 0x4f,
            0x04, 0x00, 0x97, 0x26, 0x92, 0xc1, 0x61, 0x09, 0x63, 0xa8, 0x96, 0x3d,
            0x50, 0x33, 0x49, 0xba, 0xaf, 0x27, 0x1e, 0x12, 0xa2, 0x58, 0x70, 0x57,
            0x75, 0x9c, 0xeb, 0x0b, 0x72, 0xcc, 0xd0, 0x54, 0x85, 0xdc, 0xf2, 0xae,
            0x3f, 0xfb, 0xa0, 0x73, 0xe2, 0x81, 0x20, 0xa5, 0xe6, 0x72, 0x53, 0x4f,
            0x34, 0x52, 0xa5, 0x6b, 0xf4, 0x91, 0x6c, 0x7e, 0x9d, 0x30, 0x7b, 0x06,
            0x23, 0x2f, 0x30, 0x9c, 0x63, 0xc8, 0xe4, 0x0b, 0x53, 0x4b, 0x4a, 0xe8,
            0x35, 0x0a, 0xed, 0xb6, 0xfd, 0xff, 0x82, 0x14, 0x53, 0xef, 0xe3, 0x8a,
            0x5e, 0xb1, 0xa6, 0x07, 0x16, 0x7f, 0x28, 0x75, 0x6b, 0xbf, 0x73, 0xd5,
            0x82, 0x24, 0x40, 0xe4, 0xc0, 0xeb, 0xd6, 0x62, 0x2c, 0xa2, 0xf7, 0xee,
            0x73, 0xd5, 0x90, 0x9c, 0x5b, 0xb6, 0x4e, 0x48, 0x27, 0x37, 0xf1, 0x77,
            0xa4, 0x37, 0x2b, 0x55, 0x54, 0xa2, 0xe5, 0xbf, 0xab, 0x64,
        ],
        subkeys: &[],
    },
];
