//! The 64-bit perceptual hash value and the mean-threshold bit packing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseHashError;
use crate::math::mean;

use super::select::Coefficients;

/// Number of hex digits in the rendered form of a hash.
pub const HEX_LEN: usize = 16;

/// A 64-bit DCT perceptual hash.
///
/// Bit `63 - i` is set when coefficient `i` lies strictly above the mean of
/// all 63 coefficients. Only 63 coefficients exist, so bit 0 is always clear.
/// Renders as 16 lowercase hex digits and serializes as that string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PerceptualHash(u64);

impl PerceptualHash {
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Hamming distance: number of differing bits, 0..=64.
    pub fn distance(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// True when the two hashes are within `threshold` bits of each other.
    pub fn is_similar(self, other: Self, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }

    /// 16-digit zero-padded lowercase hex.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }
}

/// Threshold `coefficients` against their mean and pack MSB-first.
pub fn pack_bits(coefficients: &Coefficients) -> PerceptualHash {
    let threshold = mean(coefficients);
    let mut bits = 0u64;
    for (i, value) in coefficients.iter().enumerate() {
        if *value > threshold {
            bits |= 1u64 << (63 - i);
        }
    }
    PerceptualHash(bits)
}

impl From<u64> for PerceptualHash {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl From<PerceptualHash> for u64 {
    fn from(hash: PerceptualHash) -> Self {
        hash.0
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::LowerHex for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl FromStr for PerceptualHash {
    type Err = ParseHashError;

    /// Parse exactly 16 hex digits (either case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HEX_LEN {
            return Err(ParseHashError::InvalidLength(s.chars().count()));
        }
        let mut bits = 0u64;
        for (position, digit) in s.chars().enumerate() {
            let nibble = digit
                .to_digit(16)
                .ok_or(ParseHashError::InvalidDigit { digit, position })?;
            bits = (bits << 4) | u64::from(nibble);
        }
        Ok(Self(bits))
    }
}

impl Serialize for PerceptualHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PerceptualHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::select::COEFFICIENT_COUNT;

    fn coefficients_from(f: impl Fn(usize) -> f64) -> Coefficients {
        let mut c = [0.0; COEFFICIENT_COUNT];
        for (i, v) in c.iter_mut().enumerate() {
            *v = f(i);
        }
        c
    }

    #[test]
    fn test_all_zero_coefficients_hash_to_zero() {
        let hash = pack_bits(&[0.0; COEFFICIENT_COUNT]);
        assert_eq!(hash.bits(), 0);
        assert_eq!(hash.to_hex(), "0000000000000000");
    }

    #[test]
    fn test_first_coefficient_maps_to_msb() {
        let hash = pack_bits(&coefficients_from(|i| if i == 0 { 100.0 } else { 0.0 }));
        assert_eq!(hash.bits(), 0x8000_0000_0000_0000);
    }

    #[test]
    fn test_last_coefficient_maps_to_bit_one() {
        let hash = pack_bits(&coefficients_from(|i| if i == 62 { 100.0 } else { 0.0 }));
        assert_eq!(hash.bits(), 0b10);
    }

    #[test]
    fn test_bit_zero_is_always_clear() {
        for seed in 0..20u64 {
            let hash = pack_bits(&coefficients_from(|i| {
                ((i as u64 * 2654435761 + seed * 97) % 1000) as f64 - 500.0
            }));
            assert_eq!(hash.bits() & 1, 0);
        }
    }

    #[test]
    fn test_value_equal_to_mean_is_not_set() {
        // Every entry equals the mean, so nothing is strictly greater.
        let hash = pack_bits(&[3.0; COEFFICIENT_COUNT]);
        assert_eq!(hash.bits(), 0);
    }

    #[test]
    fn test_set_bits_match_entries_above_mean() {
        for seed in 1..30u64 {
            let coeffs = coefficients_from(|i| {
                let x = (i as u64 + 1) * seed * 7919 % 211;
                x as f64 * if i % 3 == 0 { -1.0 } else { 1.5 }
            });
            let m = mean(&coeffs);
            let above = coeffs.iter().filter(|v| **v > m).count() as u32;
            let hash = pack_bits(&coeffs);
            assert_eq!(hash.bits().count_ones(), above);
            assert_eq!(64 - hash.bits().count_ones() - 1, 63 - above);
        }
    }

    #[test]
    fn test_distance() {
        let a = PerceptualHash::from_bits(0);
        let b = PerceptualHash::from_bits(0b1011);
        assert_eq!(a.distance(a), 0);
        assert_eq!(a.distance(b), 3);
        assert_eq!(b.distance(a), 3);
        assert_eq!(a.distance(PerceptualHash::from_bits(u64::MAX)), 64);
        assert!(a.is_similar(b, 3));
        assert!(!a.is_similar(b, 2));
    }

    #[test]
    fn test_hex_round_trip() {
        for bits in [0u64, 1, 0x8000_0000_0000_0000, 0x0123_4567_89ab_cdef, u64::MAX] {
            let hash = PerceptualHash::from_bits(bits);
            let hex = hash.to_string();
            assert_eq!(hex.len(), 16);
            assert_eq!(hex, hex.to_lowercase());
            assert_eq!(hex.parse::<PerceptualHash>().unwrap(), hash);
        }
    }

    #[test]
    fn test_parse_accepts_uppercase() {
        let hash: PerceptualHash = "DEADBEEF00000000".parse().unwrap();
        assert_eq!(hash.bits(), 0xdead_beef_0000_0000);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "abc".parse::<PerceptualHash>(),
            Err(ParseHashError::InvalidLength(3))
        );
        assert_eq!(
            "00000000000000zz".parse::<PerceptualHash>(),
            Err(ParseHashError::InvalidDigit {
                digit: 'z',
                position: 14
            })
        );
    }

    #[test]
    fn test_serde_as_hex_string() {
        let hash = PerceptualHash::from_bits(0xff);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"00000000000000ff\"");
        let back: PerceptualHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
        assert!(serde_json::from_str::<PerceptualHash>("\"nope\"").is_err());
    }
}
