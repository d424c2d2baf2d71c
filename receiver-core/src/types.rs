//! Shared value types: timestamps, enumerations, and the small structs that
//! cross the façade boundary (gain stages, filter ranges).

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock time at event emission, `(seconds, nanos)` since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: u64,
    pub nanos: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        let dur = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: dur.as_secs(),
            nanos: dur.subsec_nanos(),
        }
    }
}

/// Demodulator mode selected on a VFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Demod {
    Off,
    Raw,
    Am,
    AmSync,
    Lsb,
    Usb,
    Cwl,
    Cwu,
    Nfm,
    WfmMono,
    WfmStereo,
    WfmStereoOirt,
}

impl Demod {
    pub const ALL: [Demod; 12] = [
        Demod::Off,
        Demod::Raw,
        Demod::Am,
        Demod::AmSync,
        Demod::Lsb,
        Demod::Usb,
        Demod::Cwl,
        Demod::Cwu,
        Demod::Nfm,
        Demod::WfmMono,
        Demod::WfmStereo,
        Demod::WfmStereoOirt,
    ];
}

/// Filter transition-bandwidth shape, expressed as a ratio of pass-band width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterShape {
    Soft,
    Normal,
    Sharp,
}

impl FilterShape {
    /// Transition-bandwidth ratio of the pass-band width.
    pub fn transition_ratio(self) -> f64 {
        match self {
            FilterShape::Soft => 0.5,
            FilterShape::Normal => 0.2,
            FilterShape::Sharp => 0.1,
        }
    }
}

/// FFT window function kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    BartlettHann,
    Bartlett,
    Blackman,
    BlackmanHarris,
    BlackmanNuttall,
    Bohman,
    Boxcar,
    FlatTop,
    Hamming,
    Hann,
    Kaiser,
    Nuttall,
    Parzen,
    Rectangular,
    Tukey,
    Welch,
}

/// A single gain stage advertised by the input device (e.g. "LNA", "VGA").
#[derive(Debug, Clone, PartialEq)]
pub struct GainStage {
    pub name: String,
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    pub value: f64,
}

/// Low/high passband edge bounds and a minimum width, per demod, used to
/// validate `set_filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRange {
    pub low_min: i64,
    pub low_max: i64,
    pub high_min: i64,
    pub high_max: i64,
    pub symmetric: bool,
}

/// A concrete filter passband: low/high edges and transition shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub shape: FilterShape,
    pub low: i64,
    pub high: i64,
}

/// Noise-blanker slot identifier: the DSP exposes two independent blankers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseBlankerId {
    Nb1,
    Nb2,
}
