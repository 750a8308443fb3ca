//! SHA-256 (FIPS 180-4) written against the standard, with no hashing crate.
//!
//! The hasher streams: [`Sha256::update`] may be called with arbitrary
//! splits of the input, and only full 64-byte chunks are ever compressed.
//! [`digest`] and [`digest_hex`] are the one-shot entry points the rest of
//! the crate uses.

use crate::constants::{BYTE, CHUNK_SIZE, HASH_SIZE, LENGTH_OFFSET};

pub type Hash = [u8; HASH_SIZE];

/// Initial hash value: fractional parts of the square roots of the first 8 primes.
const IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Round constants: fractional parts of the cube roots of the first 64 primes.
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

#[inline(always)]
fn ch(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (!x & z)
}

#[inline(always)]
fn maj(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

#[inline(always)]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline(always)]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline(always)]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline(always)]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

/// Run the 64-round compression function over one chunk.
fn compress(state: &mut [u32; 8], chunk: &[u8]) {
    debug_assert_eq!(chunk.len(), CHUNK_SIZE);

    let mut w = [0u32; 64];
    for (word, bytes) in w.iter_mut().zip(chunk.chunks_exact(4)) {
        *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    for i in 16..64 {
        w[i] = small_sigma1(w[i - 2])
            .wrapping_add(w[i - 7])
            .wrapping_add(small_sigma0(w[i - 15]))
            .wrapping_add(w[i - 16]);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;
    for i in 0..64 {
        let t1 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(K[i])
            .wrapping_add(w[i]);
        let t2 = big_sigma0(a).wrapping_add(maj(a, b, c));
        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (word, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *word = word.wrapping_add(v);
    }
}

/// Streaming SHA-256 state.
#[derive(Clone, Debug)]
pub struct Sha256 {
    state: [u32; 8],
    buffer: [u8; CHUNK_SIZE],
    /// Always in `0..CHUNK_SIZE` between calls.
    buffered: usize,
    /// Message length in bits; wraps past 2^64 - 1.
    bit_len: u64,
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha256 {
    pub fn new() -> Self {
        Self {
            state: IV,
            buffer: [0u8; CHUNK_SIZE],
            buffered: 0,
            bit_len: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.bit_len = self
            .bit_len
            .wrapping_add((data.len() as u64).wrapping_mul(BYTE as u64));

        let mut data = data;
        if self.buffered > 0 {
            let take = (CHUNK_SIZE - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered < CHUNK_SIZE {
                return;
            }
            compress(&mut self.state, &self.buffer);
            self.buffered = 0;
        }

        let mut chunks = data.chunks_exact(CHUNK_SIZE);
        for chunk in &mut chunks {
            compress(&mut self.state, chunk);
        }
        let rest = chunks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Apply Merkle–Damgård padding and return the digest.
    pub fn finalize(mut self) -> Hash {
        let mut pos = self.buffered;
        self.buffer[pos] = 0x80;
        pos += 1;

        // No room left for the length field: flush and pad a fresh chunk.
        if pos > LENGTH_OFFSET {
            self.buffer[pos..].fill(0);
            compress(&mut self.state, &self.buffer);
            pos = 0;
        }
        self.buffer[pos..LENGTH_OFFSET].fill(0);
        self.buffer[LENGTH_OFFSET..].copy_from_slice(&self.bit_len.to_be_bytes());
        compress(&mut self.state, &self.buffer);

        let mut out = [0u8; HASH_SIZE];
        for (bytes, word) in out.chunks_exact_mut(4).zip(self.state) {
            bytes.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}

pub fn digest(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize()
}

/// Digest of `data` as 64 lowercase hex characters.
pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use sha2::Digest as _;

    #[test]
    fn empty_input_vector() {
        assert_eq!(
            digest_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn abc_vector() {
        assert_eq!(
            digest_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn two_block_vector_448_bits() {
        // 56 bytes: the length field no longer fits, padding spills into a second chunk.
        assert_eq!(
            digest_hex(b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq"),
            "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"
        );
    }

    #[test]
    fn vector_896_bits() {
        let msg = b"abcdefghbcdefghicdefghijdefghijkefghijklfghijklmghijklmnhijklmnoijklmnopjklmnopqklmnopqrlmnopqrsmnopqrstnopqrstu";
        assert_eq!(
            digest_hex(msg),
            "cf5b16a778af8380036ce59e7b0492370b249b11e8f07a51afac45037afee9d1"
        );
    }

    #[test]
    fn quick_brown_fox_vector() {
        assert_eq!(
            digest_hex(b"The quick brown fox jumps over the lazy dog"),
            "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592"
        );
    }

    #[test]
    fn one_million_a_vector() {
        let mut hasher = Sha256::new();
        let chunk = [b'a'; 1000];
        for _ in 0..1000 {
            hasher.update(&chunk);
        }
        assert_eq!(
            hex::encode(hasher.finalize()),
            "cdc76e5c9914fb9281a1c7e284d73e67f1809a48a497200e046d39ccc7112cd0"
        );
    }

    #[test]
    fn matches_reference_across_padding_boundaries() {
        let input: Vec<u8> = (0..=200u8).collect();
        for len in 0..=input.len() {
            let expected = sha2::Sha256::digest(&input[..len]);
            assert_eq!(digest(&input[..len]), expected.as_slice(), "length {len}");
        }
    }

    #[test]
    fn streaming_splits_match_one_shot() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let len = rng.gen_range(0..1000);
            let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();

            let mut hasher = Sha256::new();
            let mut rest = data.as_slice();
            while !rest.is_empty() {
                let take = rng.gen_range(0..=rest.len().min(150));
                hasher.update(&rest[..take]);
                rest = &rest[take..];
            }
            assert_eq!(hasher.finalize(), digest(&data));
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let data = b"Alice pays Bob 5 BTC";
        assert_eq!(digest_hex(data), digest_hex(data));
        assert_eq!(Sha256::new().finalize(), Sha256::default().finalize());
    }

    #[test]
    fn hex_output_shape() {
        let hex = digest_hex(b"shape");
        assert_eq!(hex.len(), crate::constants::HASH_HEX_SIZE);
        assert!(hex
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn single_byte_flip_avalanches() {
        let original = b"Alice pays Bob 5 BTC".to_vec();
        let mut flipped = original.clone();
        flipped[0] ^= 0x01;

        let (a, b) = (digest(&original), digest(&flipped));
        let bits: u32 = a.iter().zip(&b).map(|(x, y)| (x ^ y).count_ones()).sum();
        assert!(bits > 64, "only {bits} of 256 bits changed");

        let (ha, hb) = (hex::encode(a), hex::encode(b));
        let chars = ha.chars().zip(hb.chars()).filter(|(x, y)| x != y).count();
        assert!(chars > 40, "only {chars} of 64 hex characters changed");
    }
}
