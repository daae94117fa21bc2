//! Ways of writing a key down.

use clap::ValueEnum;
use keyfinder::analysis::key::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Notation {
    /// Flat spellings: A, Am, Bb, Bbm, …
    Standard,
    /// Sharp spellings: A, Am, A#, A#m, …
    Sharps,
    /// Camelot wheel: 8B is C major, 8A is A minor.
    Camelot,
    /// Open Key notation: 1d is C major, 1m is A minor.
    Openkey,
}

// Indexed like `Key::ALL`.
const STANDARD: [&str; 24] = [
    "A", "Am", "Bb", "Bbm", "B", "Bm", "C", "Cm", "Db", "Dbm", "D", "Dm", "Eb", "Ebm", "E", "Em",
    "F", "Fm", "Gb", "Gbm", "G", "Gm", "Ab", "Abm",
];

const SHARPS: [&str; 24] = [
    "A", "Am", "A#", "A#m", "B", "Bm", "C", "Cm", "C#", "C#m", "D", "Dm", "D#", "D#m", "E", "Em",
    "F", "Fm", "F#", "F#m", "G", "Gm", "G#", "G#m",
];

const CAMELOT: [&str; 24] = [
    "11B", "8A", "6B", "3A", "1B", "10A", "8B", "5A", "3B", "12A", "10B", "7A", "5B", "2A", "12B",
    "9A", "7B", "4A", "2B", "11A", "9B", "6A", "4B", "1A",
];

const OPEN_KEY: [&str; 24] = [
    "4d", "1m", "11d", "8m", "6d", "3m", "1d", "10m", "8d", "5m", "3d", "12m", "10d", "7m", "5d",
    "2m", "12d", "9m", "7d", "4m", "2d", "11m", "9d", "6m",
];

impl Notation {
    /// Label for `key`, `None` for silence.
    pub fn label(self, key: Key) -> Option<&'static str> {
        let table = match self {
            Notation::Standard => &STANDARD,
            Notation::Sharps => &SHARPS,
            Notation::Camelot => &CAMELOT,
            Notation::Openkey => &OPEN_KEY,
        };
        key.index().map(|i| table[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(label: &str) -> u32 {
        label[..label.len() - 1].parse().unwrap()
    }

    #[test]
    fn reference_keys() {
        assert_eq!(Notation::Standard.label(Key::BFlatMinor), Some("Bbm"));
        assert_eq!(Notation::Sharps.label(Key::BFlatMinor), Some("A#m"));
        assert_eq!(Notation::Camelot.label(Key::CMajor), Some("8B"));
        assert_eq!(Notation::Camelot.label(Key::AMinor), Some("8A"));
        assert_eq!(Notation::Openkey.label(Key::CMajor), Some("1d"));
        assert_eq!(Notation::Openkey.label(Key::DMinor), Some("12m"));
        assert_eq!(Notation::Standard.label(Key::Silence), None);
    }

    #[test]
    fn camelot_and_open_key_agree() {
        for key in Key::ALL {
            let camelot = Notation::Camelot.label(key).unwrap();
            let open_key = Notation::Openkey.label(key).unwrap();
            assert_eq!((number(open_key) + 6) % 12 + 1, number(camelot), "{key}");
            assert_eq!(camelot.ends_with('A'), key.is_minor());
            assert_eq!(open_key.ends_with('m'), key.is_minor());
        }
    }

    #[test]
    fn relative_keys_share_a_camelot_number() {
        for tonic in 0..12 {
            let major = Key::new(tonic, false);
            let relative_minor = Key::new(tonic + 9, true);
            let a = Notation::Camelot.label(major).unwrap();
            let b = Notation::Camelot.label(relative_minor).unwrap();
            assert_eq!(number(a), number(b), "{major} / {relative_minor}");
        }
    }
}
