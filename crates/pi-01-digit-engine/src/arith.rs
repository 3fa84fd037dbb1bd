//! Integer kernels shared by the series backends.

/// `base^exp mod modulus`.
///
/// Products are formed in 128 bits, so any 64-bit modulus is safe. Moduli that
/// fit in 32 bits take a narrower path.
pub fn pow_mod(base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }

    if modulus <= u32::MAX as u64 {
        let mut result: u64 = 1;
        let mut base = base % modulus;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result * base % modulus;
            }
            exp >>= 1;
            base = base * base % modulus;
        }
        return result;
    }

    let modulus = modulus as u128;
    let mut result: u128 = 1;
    let mut base = base as u128 % modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % modulus;
        }
        exp >>= 1;
        base = base * base % modulus;
    }
    result as u64
}

/// `floor(numerator / denominator · 2^128)`, i.e. the quotient as a 0.128
/// fixed-point fraction.
///
/// Requires `numerator < denominator`. Computed as two 64-bit limbs of long
/// division so every intermediate fits in a `u128`.
pub fn fixed_fraction(numerator: u64, denominator: u64) -> u128 {
    debug_assert!(numerator < denominator);
    let d = denominator as u128;
    let wide = (numerator as u128) << 64;
    let high = wide / d;
    let low = ((wide % d) << 64) / d;
    (high << 64) | low
}

/// The `index`-th nibble (0 = most significant) of a 0.128 fraction.
pub fn nibble_at(fraction: u128, index: usize) -> u8 {
    debug_assert!(index < 32);
    ((fraction >> (124 - 4 * index)) & 0xF) as u8
}
