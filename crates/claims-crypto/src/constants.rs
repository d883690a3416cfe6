//! Key encoding constants.

/// Size of Ed25519 public keys in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of Ed25519 seeds in bytes
pub const SEED_SIZE: usize = 32;

/// Number of checksum bytes appended to encoded keys
pub const CHECKSUM_SIZE: usize = 2;

/// Length of an encoded public key: prefix(1) || hex(key || checksum)
pub const ENCODED_PUBLIC_KEY_LEN: usize = 1 + 2 * (PUBLIC_KEY_SIZE + CHECKSUM_SIZE);

/// Length of an encoded seed: 'S' || prefix(1) || hex(seed || checksum)
pub const ENCODED_SEED_LEN: usize = 2 + 2 * (SEED_SIZE + CHECKSUM_SIZE);

/// Leading character of every encoded seed
pub const SEED_PREFIX: char = 'S';

/// DER prefix of a PKCS#8 v1 Ed25519 private key; the 32 byte seed follows
pub const PKCS8_ED25519_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];
