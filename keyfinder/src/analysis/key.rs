use std::fmt::Display;

/// Musical keys in the order the estimator scores them, A first, each major key
/// directly followed by its parallel minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    AMajor,
    AMinor,
    BFlatMajor,
    BFlatMinor,
    BMajor,
    BMinor,
    CMajor,
    CMinor,
    DFlatMajor,
    DFlatMinor,
    DMajor,
    DMinor,
    EFlatMajor,
    EFlatMinor,
    EMajor,
    EMinor,
    FMajor,
    FMinor,
    GFlatMajor,
    GFlatMinor,
    GMajor,
    GMinor,
    AFlatMajor,
    AFlatMinor,
    /// No tonal content at all.
    Silence,
}

impl Key {
    pub const ALL: [Key; 24] = [
        Key::AMajor,
        Key::AMinor,
        Key::BFlatMajor,
        Key::BFlatMinor,
        Key::BMajor,
        Key::BMinor,
        Key::CMajor,
        Key::CMinor,
        Key::DFlatMajor,
        Key::DFlatMinor,
        Key::DMajor,
        Key::DMinor,
        Key::EFlatMajor,
        Key::EFlatMinor,
        Key::EMajor,
        Key::EMinor,
        Key::FMajor,
        Key::FMinor,
        Key::GFlatMajor,
        Key::GFlatMinor,
        Key::GMajor,
        Key::GMinor,
        Key::AFlatMajor,
        Key::AFlatMinor,
    ];

    /// Key on `tonic` semitones above A.
    pub fn new(tonic: usize, minor: bool) -> Self {
        Self::ALL[(tonic % 12) * 2 + usize::from(minor)]
    }

    /// Position in [`Key::ALL`], `None` for silence.
    pub fn index(self) -> Option<usize> {
        Self::ALL.iter().position(|&key| key == self)
    }

    /// Semitones above A, `None` for silence.
    pub fn tonic(self) -> Option<usize> {
        self.index().map(|i| i / 2)
    }

    pub fn is_minor(self) -> bool {
        self.index().is_some_and(|i| i % 2 == 1)
    }

    pub fn is_silence(self) -> bool {
        self == Key::Silence
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const TONICS: [&str; 12] = [
            "A", "B♭", "B", "C", "D♭", "D", "E♭", "E", "F", "G♭", "G", "A♭",
        ];
        match self.tonic() {
            Some(tonic) if self.is_minor() => write!(f, "{} minor", TONICS[tonic]),
            Some(tonic) => write!(f, "{} major", TONICS[tonic]),
            None => write!(f, "silence"),
        }
    }
}
