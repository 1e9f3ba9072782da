//! PRESENT-style 64-bit block cipher used by the `present-cbc` suite.
//!
//! A 32-round substitution-permutation network keyed by the first 16 bytes
//! of the shared secret. Key schedule: two 64-bit registers rotated left by
//! 61 bits as a pair each round, top nibble substituted through the 4-bit
//! S-box, round counter XORed in at bit offset 15 of the high register.
//! The block transform alternates a fixed 64-bit bit-permutation with a
//! 4-bit S-box layer; decryption applies the inverse layers in reverse.
//!
//! Only the decrypt direction ships; the encrypt direction exists behind
//! `test-utils` as the exact inverse so round-trip vectors stay
//! self-consistent.

const ROUNDS: usize = 32;

const SBOX: [u8; 16] = [
    0xC, 0x5, 0x6, 0xB, 0x9, 0x0, 0xA, 0xD, 0x3, 0xE, 0xF, 0x8, 0x4, 0x7, 0x1, 0x2,
];
const INV_SBOX: [u8; 16] = [
    0x5, 0xE, 0xF, 0x8, 0xC, 0x1, 0x2, 0xD, 0xB, 0x4, 0x6, 0x3, 0x0, 0x7, 0x9, 0xA,
];

/// PRESENT instance with a precomputed round-key schedule.
pub struct Present {
    round_keys: [[u8; 8]; ROUNDS],
}

impl Present {
    /// Build the 32-round key schedule from a 16-byte key.
    pub fn new(key: &[u8; 16]) -> Self {
        let mut k_high = u64::from_be_bytes([
            key[0], key[1], key[2], key[3], key[4], key[5], key[6], key[7],
        ]);
        let mut k_low = u64::from_be_bytes([
            key[8], key[9], key[10], key[11], key[12], key[13], key[14], key[15],
        ]);

        let mut round_keys = [[0u8; 8]; ROUNDS];
        for (i, rk) in round_keys.iter_mut().enumerate() {
            *rk = k_high.to_be_bytes();

            let temp = k_high;
            k_high = (k_high << 61) | (k_low >> 3);
            k_low = (k_low << 61) | (temp >> 3);

            let sbox_input = ((k_high >> 56) & 0x0F) as usize;
            k_high = (k_high & 0x0FFF_FFFF_FFFF_FFFF) | (u64::from(SBOX[sbox_input]) << 56);
            k_high ^= ((i as u64) + 1) << 15;
        }

        Self { round_keys }
    }

    /// Decrypt one 8-byte block in place.
    pub fn decrypt_block(&self, block: &mut [u8; 8]) {
        let mut state = u64::from_le_bytes(*block);
        state ^= u64::from_le_bytes(self.round_keys[ROUNDS - 1]);
        for i in (0..ROUNDS - 1).rev() {
            state = permute(state, 4);
            state = sub_bytes(state, &INV_SBOX);
            state ^= u64::from_le_bytes(self.round_keys[i]);
        }
        *block = state.to_le_bytes();
    }

    /// Encrypt one 8-byte block in place. Exact inverse of [`Self::decrypt_block`].
    #[cfg(any(test, feature = "test-utils"))]
    pub fn encrypt_block(&self, block: &mut [u8; 8]) {
        let mut state = u64::from_le_bytes(*block);
        for i in 0..ROUNDS - 1 {
            state ^= u64::from_le_bytes(self.round_keys[i]);
            state = sub_bytes(state, &SBOX);
            state = permute(state, 16);
        }
        state ^= u64::from_le_bytes(self.round_keys[ROUNDS - 1]);
        *block = state.to_le_bytes();
    }
}

/// Fixed bit-permutation layer: bit `i` moves to `(i * mul) % 63`, bit 63 is
/// fixed. `mul = 16` is the forward layer, `mul = 4` its inverse.
fn permute(state: u64, mul: u64) -> u64 {
    let mut out = 0u64;
    for i in 0..63u64 {
        let bit = (state >> i) & 1;
        out |= bit << ((i * mul) % 63);
    }
    out | (state & (1 << 63))
}

fn sub_bytes(state: u64, sbox: &[u8; 16]) -> u64 {
    let mut bytes = state.to_le_bytes();
    for b in &mut bytes {
        *b = (sbox[(*b >> 4) as usize] << 4) | sbox[(*b & 0x0F) as usize];
    }
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sboxes_are_inverses() {
        for i in 0..16u8 {
            assert_eq!(INV_SBOX[SBOX[i as usize] as usize], i);
        }
    }

    #[test]
    fn permutation_layers_are_inverses() {
        let state = 0xDEAD_BEEF_0123_4567u64;
        assert_eq!(permute(permute(state, 16), 4), state);
        assert_eq!(permute(permute(state, 4), 16), state);
    }

    #[test]
    fn permutation_fixes_bit_63() {
        assert_eq!(permute(1 << 63, 16), 1 << 63);
        assert_eq!(permute(1 << 63, 4), 1 << 63);
    }

    #[test]
    fn encrypt_decrypt_block_roundtrip() {
        let key = [0x42u8; 16];
        let cipher = Present::new(&key);
        let plain = *b"blockdat";
        let mut block = plain;
        cipher.encrypt_block(&mut block);
        assert_ne!(block, plain);
        cipher.decrypt_block(&mut block);
        assert_eq!(block, plain);
    }

    #[test]
    fn different_keys_produce_different_ciphertext() {
        let mut a = *b"sametext";
        let mut b = *b"sametext";
        Present::new(&[0u8; 16]).encrypt_block(&mut a);
        Present::new(&[1u8; 16]).encrypt_block(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn key_schedule_rounds_differ() {
        let cipher = Present::new(&[0u8; 16]);
        // Even the all-zero key must diverge once the round counter mixes in.
        assert_ne!(cipher.round_keys[1], cipher.round_keys[2]);
    }
}
