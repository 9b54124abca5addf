use relay_types::GameError;

const HANGUL_BASE: u32 = 0xAC00;
const HANGUL_LAST: u32 = 0xD7A3;
// 21 vowels x 28 trailing consonants
const SYLLABLES_PER_CHOSEONG: u32 = 588;

const CHOSEONG_JAMO: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ',
    'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

const PARTITION_KEYS: [&str; 19] = [
    "dict_g", "dict_gg", "dict_n", "dict_d", "dict_dd", "dict_r", "dict_m",
    "dict_b", "dict_bb", "dict_s", "dict_ss", "dict_ng", "dict_j", "dict_jj",
    "dict_ch", "dict_k", "dict_t", "dict_p", "dict_h",
];

/// Allow-list checked before any partition key is handed to the dictionary.
/// Kept separate from the mapping table so corruption of one is caught by
/// the other.
const ALLOWED_PARTITIONS: [&str; 19] = [
    "dict_g", "dict_gg", "dict_n", "dict_d", "dict_dd", "dict_r", "dict_m",
    "dict_b", "dict_bb", "dict_s", "dict_ss", "dict_ng", "dict_j", "dict_jj",
    "dict_ch", "dict_k", "dict_t", "dict_p", "dict_h",
];

/// One of the 19 leading-consonant classes of a Hangul syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choseong {
    index: usize,
}

impl Choseong {
    pub fn jamo(&self) -> char {
        CHOSEONG_JAMO[self.index]
    }
}

/// Decompose a Hangul syllable into its leading-consonant class.
pub fn classify(syllable: char) -> Result<Choseong, GameError> {
    let code_point = syllable as u32;
    if !(HANGUL_BASE..=HANGUL_LAST).contains(&code_point) {
        return Err(GameError::InvalidCharacter {
            character: syllable,
        });
    }

    let index = ((code_point - HANGUL_BASE) / SYLLABLES_PER_CHOSEONG) as usize;
    Ok(Choseong { index })
}

pub fn is_allowed_partition(key: &str) -> bool {
    ALLOWED_PARTITIONS.contains(&key)
}

/// All allow-listed partition keys, in choseong order.
pub fn all_partitions() -> impl Iterator<Item = &'static str> {
    ALLOWED_PARTITIONS.into_iter()
}

/// Dictionary partition key for a syllable's leading consonant.
pub fn partition_key(syllable: char) -> Result<&'static str, GameError> {
    let choseong = classify(syllable)?;
    let key = PARTITION_KEYS[choseong.index];
    if !is_allowed_partition(key) {
        return Err(GameError::InvalidPartition {
            partition: key.to_string(),
        });
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_covers_all_rows() {
        assert_eq!(classify('가').unwrap().jamo(), 'ㄱ');
        assert_eq!(classify('까').unwrap().jamo(), 'ㄲ');
        assert_eq!(classify('나').unwrap().jamo(), 'ㄴ');
        assert_eq!(classify('작').unwrap().jamo(), 'ㅈ');
        assert_eq!(classify('하').unwrap().jamo(), 'ㅎ');
        // block boundaries
        assert_eq!(classify('\u{AC00}').unwrap().jamo(), 'ㄱ');
        assert_eq!(classify('\u{D7A3}').unwrap().jamo(), 'ㅎ');
    }

    #[test]
    fn test_classify_rejects_non_syllables() {
        for ch in ['a', '1', ' ', 'ㄱ', 'あ', '\u{ABFF}', '\u{D7A4}'] {
            assert!(matches!(
                classify(ch),
                Err(GameError::InvalidCharacter { .. })
            ));
        }
    }

    #[test]
    fn test_partition_key_mapping() {
        assert_eq!(partition_key('가').unwrap(), "dict_g");
        assert_eq!(partition_key('작').unwrap(), "dict_j");
        assert_eq!(partition_key('씨').unwrap(), "dict_ss");
        assert_eq!(partition_key('하').unwrap(), "dict_h");
    }

    #[test]
    fn test_every_mapped_partition_is_allowed() {
        for key in PARTITION_KEYS {
            assert!(is_allowed_partition(key), "{} missing from allow-list", key);
        }
        assert!(!is_allowed_partition("dict_x"));
        assert!(!is_allowed_partition(""));
    }
}
