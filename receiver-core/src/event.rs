//! The typed event model. Two disjoint families — receiver-scope and
//! VFO-scope — sharing a common header via composition rather than
//! inheritance.

use crate::types::{Demod, FilterShape, GainStage, NoiseBlankerId, Timestamp, WindowType};

/// Header shared by every event: a globally monotonic id and a wall-clock
/// timestamp. `id == -1` marks a synthetic replay event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCommon {
    pub id: i64,
    pub timestamp: Timestamp,
}

impl EventCommon {
    pub const SYNTHETIC_ID: i64 = -1;

    pub fn synthetic() -> Self {
        Self {
            id: Self::SYNTHETIC_ID,
            timestamp: Timestamp::now(),
        }
    }
}

/// `EventCommon` plus the owning VFO's stable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfoEventCommon {
    pub common: EventCommon,
    pub handle: u64,
}

/// Receiver-scope events.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiverEventKind {
    SyncStart,
    SyncEnd,
    Unsubscribed,
    Started,
    Stopped,
    InputDeviceChanged { device: String },
    AntennaChanged { antenna: String },
    AntennasChanged { antennas: Vec<String> },
    InputRateChanged { rate: f64 },
    InputDecimChanged { decim: i32 },
    IqSwapChanged { enabled: bool },
    DcCancelChanged { enabled: bool },
    IqBalanceChanged { enabled: bool },
    RfFreqChanged { freq: f64 },
    GainStagesChanged { stages: Vec<GainStage> },
    AutoGainChanged { enabled: bool },
    GainChanged { name: String, value: f64 },
    FreqCorrChanged { ppm: i32 },
    FftSizeChanged { size: u32 },
    FftWindowChanged { window: WindowType },
    IqRecordingStarted { path: String },
    IqRecordingStopped,
    VfoAdded { handle: u64 },
    VfoRemoved { handle: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverEvent {
    pub common: EventCommon,
    pub kind: ReceiverEventKind,
}

impl ReceiverEvent {
    pub fn new(kind: ReceiverEventKind) -> Self {
        Self {
            common: EventCommon {
                id: crate::event::next_event_id(),
                timestamp: Timestamp::now(),
            },
            kind,
        }
    }

    pub fn synthetic(kind: ReceiverEventKind) -> Self {
        Self {
            common: EventCommon::synthetic(),
            kind,
        }
    }
}

/// VFO-scope events.
#[derive(Debug, Clone, PartialEq)]
pub enum VfoEventKind {
    VfoSyncStart,
    VfoSyncEnd,
    DemodChanged { demod: Demod },
    OffsetChanged { offset: i64 },
    CwOffsetChanged { offset: i64 },
    FilterChanged { shape: FilterShape, low: i64, high: i64 },
    NoiseBlankerOnChanged { id: NoiseBlankerId, enabled: bool },
    NoiseBlankerThresholdChanged { id: NoiseBlankerId, threshold: f32 },
    SqlLevelChanged { level: f64 },
    SqlAlphaChanged { alpha: f64 },
    AgcOnChanged { enabled: bool },
    AgcHangChanged { enabled: bool },
    AgcThresholdChanged { threshold: i32 },
    AgcSlopeChanged { slope: i32 },
    AgcDecayChanged { decay: i32 },
    AgcManualGainChanged { gain: i32 },
    FmMaxDevChanged { max_dev: f32 },
    FmDeemphChanged { deemph: f64 },
    AmDcrChanged { enabled: bool },
    AmSyncDcrChanged { enabled: bool },
    AmSyncPllBwChanged { bw: f32 },
    RecordingStarted { path: String },
    RecordingStopped,
    SnifferStarted { rate: u32, size: u32 },
    SnifferStopped,
    UdpStreamingStarted { host: String, port: u16, stereo: bool },
    UdpStreamingStopped,
    RdsDecoderStarted,
    RdsDecoderStopped,
    RdsParserReset,
    AudioGainChanged { gain: f64 },
    VfoRemoved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VfoEvent {
    pub common: VfoEventCommon,
    pub kind: VfoEventKind,
}

impl VfoEvent {
    pub fn new(handle: u64, kind: VfoEventKind) -> Self {
        Self {
            common: VfoEventCommon {
                common: EventCommon {
                    id: next_event_id(),
                    timestamp: Timestamp::now(),
                },
                handle,
            },
            kind,
        }
    }

    pub fn synthetic(handle: u64, kind: VfoEventKind) -> Self {
        Self {
            common: VfoEventCommon {
                common: EventCommon::synthetic(),
                handle,
            },
            kind,
        }
    }
}

/// Process-wide monotonic event id counter.
static NEXT_EVENT_ID: std::sync::atomic::AtomicI64 = std::sync::atomic::AtomicI64::new(0);

pub fn next_event_id() -> i64 {
    NEXT_EVENT_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ids_are_strictly_increasing() {
        let a = ReceiverEvent::new(ReceiverEventKind::Started);
        let b = ReceiverEvent::new(ReceiverEventKind::Stopped);
        assert!(b.common.id > a.common.id);
    }

    #[test]
    fn synthetic_events_carry_id_negative_one() {
        let e = ReceiverEvent::synthetic(ReceiverEventKind::SyncStart);
        assert_eq!(e.common.id, EventCommon::SYNTHETIC_ID);
    }
}
