//! Filter range/default tables per demod and the validation rule shared by
//! every `set_filter` call.

use crate::types::{Demod, Filter, FilterRange, FilterShape};

/// The DSP-imposed minimum passband width. Named here so the validation
/// rule (`high - low >= MIN_FILTER_WIDTH`) has one home; a real DSP backend
/// may reject narrower filters still, but this is the floor the façade
/// itself enforces.
pub const MIN_FILTER_WIDTH: i64 = 1;

pub fn range_for(demod: Demod) -> FilterRange {
    match demod {
        Demod::Off => FilterRange {
            low_min: 0,
            low_max: 0,
            high_min: 0,
            high_max: 0,
            symmetric: true,
        },
        Demod::Raw | Demod::Am | Demod::AmSync | Demod::Nfm => match demod {
            Demod::Nfm => FilterRange {
                low_min: -40_000,
                low_max: -1_000,
                high_min: 1_000,
                high_max: 40_000,
                symmetric: true,
            },
            _ => FilterRange {
                low_min: -40_000,
                low_max: -200,
                high_min: 200,
                high_max: 40_000,
                symmetric: true,
            },
        },
        Demod::Lsb => FilterRange {
            low_min: -40_000,
            low_max: -100,
            high_min: -5_000,
            high_max: 0,
            symmetric: false,
        },
        Demod::Usb => FilterRange {
            low_min: 0,
            low_max: 5_000,
            high_min: 100,
            high_max: 40_000,
            symmetric: false,
        },
        Demod::Cwl | Demod::Cwu => FilterRange {
            low_min: -5_000,
            low_max: -100,
            high_min: 100,
            high_max: 5_000,
            symmetric: true,
        },
        Demod::WfmMono | Demod::WfmStereo | Demod::WfmStereoOirt => FilterRange {
            low_min: -120_000,
            low_max: -10_000,
            high_min: 10_000,
            high_max: 120_000,
            symmetric: true,
        },
    }
}

pub fn default_filter(demod: Demod) -> Filter {
    let (low, high) = match demod {
        Demod::Off => (0, 0),
        Demod::Raw | Demod::Am | Demod::AmSync | Demod::Nfm => (-5_000, 5_000),
        Demod::Lsb => (-2_800, -100),
        Demod::Usb => (100, 2_800),
        Demod::Cwl | Demod::Cwu => (-250, 250),
        Demod::WfmMono | Demod::WfmStereo | Demod::WfmStereoOirt => (-80_000, 80_000),
    };
    Filter {
        shape: FilterShape::Normal,
        low,
        high,
    }
}

/// Validates `(low, high)` against `demod`'s range table. Does not check
/// the DSP-imposed minimum width beyond [`MIN_FILTER_WIDTH`]; a real backend
/// may impose a stricter one.
pub fn is_valid(demod: Demod, low: i64, high: i64) -> bool {
    let range = range_for(demod);
    high > low
        && low >= range.low_min
        && low <= range.low_max
        && high >= range.high_min
        && high <= range.high_max
        && (high - low) >= MIN_FILTER_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfm_full_width_is_valid() {
        assert!(is_valid(Demod::Nfm, -40_000, 40_000));
    }

    #[test]
    fn off_rejects_any_nonzero_filter() {
        assert!(!is_valid(Demod::Off, -40_000, 40_000));
        assert!(!is_valid(Demod::Off, 0, 0)); // high > low fails for (0,0) too
    }

    #[test]
    fn usb_is_asymmetric() {
        let r = range_for(Demod::Usb);
        assert!(!r.symmetric);
        assert!(is_valid(Demod::Usb, 100, 2_800));
        assert!(!is_valid(Demod::Usb, -2_800, -100));
    }

    #[test]
    fn default_filters_match_table() {
        assert_eq!(default_filter(Demod::WfmMono), Filter {
            shape: FilterShape::Normal,
            low: -80_000,
            high: 80_000,
        });
        assert_eq!(default_filter(Demod::Usb), Filter {
            shape: FilterShape::Normal,
            low: 100,
            high: 2_800,
        });
    }
}
