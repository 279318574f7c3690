/// Ones' complement addition of two 16-bit words (RFC 1071).
///
/// The sum is taken in 32 bits and the carry out of bit 16 is added back
/// into bit 0, so `0xFFFF + 0xFFFF` is `0xFFFF` and not `0xFFFE`.
pub const fn ones_complement_add(acc: u16, word: u16) -> u16 {
    let sum = acc as u32 + word as u32;
    ((sum & 0xFFFF) + (sum >> 16)) as u16
}

/// Folds a sequence of words through [`ones_complement_add`], starting at 0.
///
/// This is the running sum before the final complement. Summing every word of
/// a header together with a correct checksum field yields `0xFFFF`.
pub fn ones_complement_sum<I>(words: I) -> u16
where
    I: IntoIterator<Item = u16>,
{
    words.into_iter().fold(0, ones_complement_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn carry_is_folded_back() {
        assert_eq!(ones_complement_add(0xFFFF, 0xFFFF), 0xFFFF);
        assert_eq!(ones_complement_add(0x0000, 0x0000), 0x0000);
        // 0x10000 -> low 0x0000 + carry 1
        assert_eq!(ones_complement_add(0xFFFF, 0x0001), 0x0001);
        assert_eq!(ones_complement_add(0x8000, 0x8000), 0x0001);
        assert_eq!(ones_complement_add(0x1234, 0x4321), 0x5555);
        assert_eq!(ones_complement_add(0xF0F0, 0x1F1F), 0x1010);
        assert_eq!(ones_complement_add(0xABCD, 0x6543), 0x1111);
    }

    #[test]
    fn sum_matches_wikipedia_ip_header() {
        // 4500 0073 0000 4000 4011 [b861] c0a8 0001 c0a8 00c7
        let words = [
            0x4500, 0x0073, 0x0000, 0x4000, 0x4011, 0xc0a8, 0x0001, 0xc0a8, 0x00c7,
        ];
        assert_eq!(!ones_complement_sum(words), 0xb861);
        assert_eq!(ones_complement_sum(words.into_iter().chain([0xb861])), 0xFFFF);
    }

    #[test]
    fn empty_sum_is_zero() {
        assert_eq!(ones_complement_sum(std::iter::empty()), 0);
    }

    proptest! {
        #[test]
        fn add_is_commutative(a in any::<u16>(), b in any::<u16>()) {
            prop_assert_eq!(ones_complement_add(a, b), ones_complement_add(b, a));
        }

        #[test]
        fn add_matches_wide_fold(a in any::<u16>(), b in any::<u16>()) {
            let mut wide = a as u32 + b as u32;
            while wide > 0xFFFF {
                wide = (wide & 0xFFFF) + (wide >> 16);
            }
            prop_assert_eq!(ones_complement_add(a, b) as u32, wide);
        }

        #[test]
        fn word_plus_complement_is_all_ones(a in any::<u16>()) {
            prop_assert_eq!(ones_complement_add(a, !a), 0xFFFF);
        }
    }
}
