//! Event ↔ protobuf projection. One `oneof` arm per native event variant.

use receiver_core::event::{EventCommon, ReceiverEventKind, VfoEventCommon, VfoEventKind};
use receiver_core::types::{Demod, FilterShape, GainStage, NoiseBlankerId, Timestamp, WindowType};
use receiver_core::{ErrorKind, ReceiverEvent, VfoEvent};

use crate::proto;
use crate::proto::event::Kind;

/// A decoded wire event, still tagged by which hub it came from. The
/// `Subscribe` stream interleaves both scopes, so the client side needs
/// this before it can hand the event to the right reactor callback.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    Receiver(ReceiverEvent),
    Vfo(VfoEvent),
}

pub fn demod_to_proto(d: Demod) -> proto::Demod {
    match d {
        Demod::Off => proto::Demod::Off,
        Demod::Raw => proto::Demod::Raw,
        Demod::Am => proto::Demod::Am,
        Demod::AmSync => proto::Demod::AmSync,
        Demod::Lsb => proto::Demod::Lsb,
        Demod::Usb => proto::Demod::Usb,
        Demod::Cwl => proto::Demod::Cwl,
        Demod::Cwu => proto::Demod::Cwu,
        Demod::Nfm => proto::Demod::Nfm,
        Demod::WfmMono => proto::Demod::WfmMono,
        Demod::WfmStereo => proto::Demod::WfmStereo,
        Demod::WfmStereoOirt => proto::Demod::WfmStereoOirt,
    }
}

pub fn demod_from_proto(d: proto::Demod) -> Demod {
    match d {
        proto::Demod::Off => Demod::Off,
        proto::Demod::Raw => Demod::Raw,
        proto::Demod::Am => Demod::Am,
        proto::Demod::AmSync => Demod::AmSync,
        proto::Demod::Lsb => Demod::Lsb,
        proto::Demod::Usb => Demod::Usb,
        proto::Demod::Cwl => Demod::Cwl,
        proto::Demod::Cwu => Demod::Cwu,
        proto::Demod::Nfm => Demod::Nfm,
        proto::Demod::WfmMono => Demod::WfmMono,
        proto::Demod::WfmStereo => Demod::WfmStereo,
        proto::Demod::WfmStereoOirt => Demod::WfmStereoOirt,
    }
}

pub fn filter_shape_to_proto(s: FilterShape) -> proto::FilterShape {
    match s {
        FilterShape::Soft => proto::FilterShape::Soft,
        FilterShape::Normal => proto::FilterShape::Normal,
        FilterShape::Sharp => proto::FilterShape::Sharp,
    }
}

pub fn filter_shape_from_proto(s: proto::FilterShape) -> FilterShape {
    match s {
        proto::FilterShape::Soft => FilterShape::Soft,
        proto::FilterShape::Normal => FilterShape::Normal,
        proto::FilterShape::Sharp => FilterShape::Sharp,
    }
}

pub fn window_to_proto(w: WindowType) -> proto::WindowType {
    match w {
        WindowType::BartlettHann => proto::WindowType::BartlettHann,
        WindowType::Bartlett => proto::WindowType::Bartlett,
        WindowType::Blackman => proto::WindowType::Blackman,
        WindowType::BlackmanHarris => proto::WindowType::BlackmanHarris,
        WindowType::BlackmanNuttall => proto::WindowType::BlackmanNuttall,
        WindowType::Bohman => proto::WindowType::Bohman,
        WindowType::Boxcar => proto::WindowType::Boxcar,
        WindowType::FlatTop => proto::WindowType::FlatTop,
        WindowType::Hamming => proto::WindowType::Hamming,
        WindowType::Hann => proto::WindowType::Hann,
        WindowType::Kaiser => proto::WindowType::Kaiser,
        WindowType::Nuttall => proto::WindowType::Nuttall,
        WindowType::Parzen => proto::WindowType::Parzen,
        WindowType::Rectangular => proto::WindowType::Rectangular,
        WindowType::Tukey => proto::WindowType::Tukey,
        WindowType::Welch => proto::WindowType::Welch,
    }
}

pub fn window_from_proto(w: proto::WindowType) -> WindowType {
    match w {
        proto::WindowType::BartlettHann => WindowType::BartlettHann,
        proto::WindowType::Bartlett => WindowType::Bartlett,
        proto::WindowType::Blackman => WindowType::Blackman,
        proto::WindowType::BlackmanHarris => WindowType::BlackmanHarris,
        proto::WindowType::BlackmanNuttall => WindowType::BlackmanNuttall,
        proto::WindowType::Bohman => WindowType::Bohman,
        proto::WindowType::Boxcar => WindowType::Boxcar,
        proto::WindowType::FlatTop => WindowType::FlatTop,
        proto::WindowType::Hamming => WindowType::Hamming,
        proto::WindowType::Hann => WindowType::Hann,
        proto::WindowType::Kaiser => WindowType::Kaiser,
        proto::WindowType::Nuttall => WindowType::Nuttall,
        proto::WindowType::Parzen => WindowType::Parzen,
        proto::WindowType::Rectangular => WindowType::Rectangular,
        proto::WindowType::Tukey => WindowType::Tukey,
        proto::WindowType::Welch => WindowType::Welch,
    }
}

pub fn nb_id_to_proto(id: NoiseBlankerId) -> proto::NoiseBlankerId {
    match id {
        NoiseBlankerId::Nb1 => proto::NoiseBlankerId::Nb1,
        NoiseBlankerId::Nb2 => proto::NoiseBlankerId::Nb2,
    }
}

pub fn nb_id_from_proto(id: proto::NoiseBlankerId) -> NoiseBlankerId {
    match id {
        proto::NoiseBlankerId::Nb1 => NoiseBlankerId::Nb1,
        proto::NoiseBlankerId::Nb2 => NoiseBlankerId::Nb2,
    }
}

pub fn gain_stage_to_proto(g: &GainStage) -> proto::GainStage {
    proto::GainStage {
        name: g.name.clone(),
        start: g.start,
        stop: g.stop,
        step: g.step,
        value: g.value,
    }
}

pub fn error_kind_to_proto(k: ErrorKind) -> proto::ErrorCode {
    match k {
        ErrorKind::Ok => proto::ErrorCode::Ok,
        ErrorKind::WorkerBusy => proto::ErrorCode::WorkerBusy,
        ErrorKind::GainNotFound => proto::ErrorCode::GainNotFound,
        ErrorKind::AlreadyRecording => proto::ErrorCode::AlreadyRecording,
        ErrorKind::AlreadyNotRecording => proto::ErrorCode::AlreadyNotRecording,
        ErrorKind::InvalidInputDevice => proto::ErrorCode::InvalidInputDevice,
        ErrorKind::InvalidFilter => proto::ErrorCode::InvalidFilter,
        ErrorKind::InvalidFilterOffset => proto::ErrorCode::InvalidFilterOffset,
        ErrorKind::InvalidCwOffset => proto::ErrorCode::InvalidCwOffset,
        ErrorKind::InvalidDemod => proto::ErrorCode::InvalidDemod,
        ErrorKind::VfoNotFound => proto::ErrorCode::VfoNotFound,
        ErrorKind::DemodIsOff => proto::ErrorCode::DemodIsOff,
        ErrorKind::NotRunning => proto::ErrorCode::NotRunning,
        ErrorKind::CouldntCreateFile => proto::ErrorCode::CouldntCreateFile,
        ErrorKind::SnifferAlreadyActive => proto::ErrorCode::SnifferAlreadyActive,
        ErrorKind::SnifferAlreadyInactive => proto::ErrorCode::SnifferAlreadyInactive,
        ErrorKind::InsufficientBufferSize => proto::ErrorCode::InsufficientBufferSize,
        ErrorKind::RdsAlreadyActive => proto::ErrorCode::RdsAlreadyActive,
        ErrorKind::RdsAlreadyInactive => proto::ErrorCode::RdsAlreadyInactive,
        ErrorKind::CallError => proto::ErrorCode::CallError,
        ErrorKind::Unimplemented => proto::ErrorCode::Unimplemented,
        ErrorKind::UnknownError => proto::ErrorCode::UnknownError,
    }
}

pub fn error_kind_from_proto(c: proto::ErrorCode) -> ErrorKind {
    match c {
        proto::ErrorCode::Ok => ErrorKind::Ok,
        proto::ErrorCode::WorkerBusy => ErrorKind::WorkerBusy,
        proto::ErrorCode::GainNotFound => ErrorKind::GainNotFound,
        proto::ErrorCode::AlreadyRecording => ErrorKind::AlreadyRecording,
        proto::ErrorCode::AlreadyNotRecording => ErrorKind::AlreadyNotRecording,
        proto::ErrorCode::InvalidInputDevice => ErrorKind::InvalidInputDevice,
        proto::ErrorCode::InvalidFilter => ErrorKind::InvalidFilter,
        proto::ErrorCode::InvalidFilterOffset => ErrorKind::InvalidFilterOffset,
        proto::ErrorCode::InvalidCwOffset => ErrorKind::InvalidCwOffset,
        proto::ErrorCode::InvalidDemod => ErrorKind::InvalidDemod,
        proto::ErrorCode::VfoNotFound => ErrorKind::VfoNotFound,
        proto::ErrorCode::DemodIsOff => ErrorKind::DemodIsOff,
        proto::ErrorCode::NotRunning => ErrorKind::NotRunning,
        proto::ErrorCode::CouldntCreateFile => ErrorKind::CouldntCreateFile,
        proto::ErrorCode::SnifferAlreadyActive => ErrorKind::SnifferAlreadyActive,
        proto::ErrorCode::SnifferAlreadyInactive => ErrorKind::SnifferAlreadyInactive,
        proto::ErrorCode::InsufficientBufferSize => ErrorKind::InsufficientBufferSize,
        proto::ErrorCode::RdsAlreadyActive => ErrorKind::RdsAlreadyActive,
        proto::ErrorCode::RdsAlreadyInactive => ErrorKind::RdsAlreadyInactive,
        proto::ErrorCode::CallError => ErrorKind::CallError,
        proto::ErrorCode::Unimplemented => ErrorKind::Unimplemented,
        proto::ErrorCode::UnknownError => ErrorKind::UnknownError,
    }
}

fn empty() -> proto::Empty {
    proto::Empty {}
}

/// Projects a receiver-scope event onto the wire `Event` message.
pub fn receiver_event_to_proto(ev: &ReceiverEvent) -> proto::Event {
    let kind = match &ev.kind {
        ReceiverEventKind::SyncStart => Kind::SyncStart(empty()),
        ReceiverEventKind::SyncEnd => Kind::SyncEnd(empty()),
        ReceiverEventKind::Unsubscribed => Kind::Unsubscribed(empty()),
        ReceiverEventKind::Started => Kind::Started(empty()),
        ReceiverEventKind::Stopped => Kind::Stopped(empty()),
        ReceiverEventKind::InputDeviceChanged { device } => {
            Kind::InputDeviceChanged(device.clone())
        }
        ReceiverEventKind::AntennaChanged { antenna } => Kind::AntennaChanged(antenna.clone()),
        ReceiverEventKind::AntennasChanged { antennas } => {
            Kind::AntennasChanged(proto::StringList {
                values: antennas.clone(),
            })
        }
        ReceiverEventKind::InputRateChanged { rate } => Kind::InputRateChanged(*rate),
        ReceiverEventKind::InputDecimChanged { decim } => Kind::InputDecimChanged(*decim),
        ReceiverEventKind::IqSwapChanged { enabled } => Kind::IqSwapChanged(*enabled),
        ReceiverEventKind::DcCancelChanged { enabled } => Kind::DcCancelChanged(*enabled),
        ReceiverEventKind::IqBalanceChanged { enabled } => Kind::IqBalanceChanged(*enabled),
        ReceiverEventKind::RfFreqChanged { freq } => Kind::RfFreqChanged(*freq),
        ReceiverEventKind::GainStagesChanged { stages } => {
            Kind::GainStagesChanged(proto::GainStageList {
                stages: stages.iter().map(gain_stage_to_proto).collect(),
            })
        }
        ReceiverEventKind::AutoGainChanged { enabled } => Kind::AutoGainChanged(*enabled),
        ReceiverEventKind::GainChanged { name, value } => Kind::GainChanged(proto::GainChanged {
            name: name.clone(),
            value: *value,
        }),
        ReceiverEventKind::FreqCorrChanged { ppm } => Kind::FreqCorrChanged(*ppm),
        ReceiverEventKind::FftSizeChanged { size } => Kind::FftSizeChanged(*size),
        ReceiverEventKind::FftWindowChanged { window } => {
            Kind::FftWindowChanged(window_to_proto(*window) as i32)
        }
        ReceiverEventKind::IqRecordingStarted { path } => {
            Kind::IqRecordingStarted(path.clone())
        }
        ReceiverEventKind::IqRecordingStopped => Kind::IqRecordingStopped(empty()),
        ReceiverEventKind::VfoAdded { handle } => Kind::VfoAdded(*handle),
        ReceiverEventKind::VfoRemoved { handle } => Kind::VfoRemoved(*handle),
    };
    proto::Event {
        id: ev.common.id,
        timestamp_seconds: ev.common.timestamp.seconds as i64,
        timestamp_nanos: ev.common.timestamp.nanos,
        vfo_handle: 0,
        kind: Some(kind),
    }
}

/// Projects a VFO-scope event onto the wire `Event` message.
pub fn vfo_event_to_proto(ev: &VfoEvent) -> proto::Event {
    let kind = match &ev.kind {
        VfoEventKind::VfoSyncStart => Kind::VfoSyncStart(empty()),
        VfoEventKind::VfoSyncEnd => Kind::VfoSyncEnd(empty()),
        VfoEventKind::DemodChanged { demod } => {
            Kind::DemodChanged(demod_to_proto(*demod) as i32)
        }
        VfoEventKind::OffsetChanged { offset } => Kind::OffsetChanged(*offset),
        VfoEventKind::CwOffsetChanged { offset } => Kind::CwOffsetChanged(*offset),
        VfoEventKind::FilterChanged { shape, low, high } => {
            Kind::FilterChanged(proto::FilterChanged {
                shape: filter_shape_to_proto(*shape) as i32,
                low: *low,
                high: *high,
            })
        }
        VfoEventKind::NoiseBlankerOnChanged { id, enabled } => {
            Kind::NbOnChanged(proto::NbOnChanged {
                id: nb_id_to_proto(*id) as i32,
                enabled: *enabled,
            })
        }
        VfoEventKind::NoiseBlankerThresholdChanged { id, threshold } => {
            Kind::NbThresholdChanged(proto::NbThresholdChanged {
                id: nb_id_to_proto(*id) as i32,
                threshold: *threshold,
            })
        }
        VfoEventKind::SqlLevelChanged { level } => Kind::SqlLevelChanged(*level),
        VfoEventKind::SqlAlphaChanged { alpha } => Kind::SqlAlphaChanged(*alpha),
        VfoEventKind::AgcOnChanged { enabled } => Kind::AgcOnChanged(*enabled),
        VfoEventKind::AgcHangChanged { enabled } => Kind::AgcHangChanged(*enabled),
        VfoEventKind::AgcThresholdChanged { threshold } => {
            Kind::AgcThresholdChanged(*threshold)
        }
        VfoEventKind::AgcSlopeChanged { slope } => Kind::AgcSlopeChanged(*slope),
        VfoEventKind::AgcDecayChanged { decay } => Kind::AgcDecayChanged(*decay),
        VfoEventKind::AgcManualGainChanged { gain } => Kind::AgcManualGainChanged(*gain),
        VfoEventKind::FmMaxDevChanged { max_dev } => Kind::FmMaxDevChanged(*max_dev),
        VfoEventKind::FmDeemphChanged { deemph } => Kind::FmDeemphChanged(*deemph),
        VfoEventKind::AmDcrChanged { enabled } => Kind::AmDcrChanged(*enabled),
        VfoEventKind::AmSyncDcrChanged { enabled } => Kind::AmSyncDcrChanged(*enabled),
        VfoEventKind::AmSyncPllBwChanged { bw } => Kind::AmSyncPllBwChanged(*bw),
        VfoEventKind::RecordingStarted { path } => Kind::RecordingStarted(path.clone()),
        VfoEventKind::RecordingStopped => Kind::RecordingStopped(empty()),
        VfoEventKind::SnifferStarted { rate, size } => {
            Kind::SnifferStarted(proto::SnifferStarted {
                rate: *rate,
                size: *size,
            })
        }
        VfoEventKind::SnifferStopped => Kind::SnifferStopped(empty()),
        VfoEventKind::UdpStreamingStarted {
            host,
            port,
            stereo,
        } => Kind::UdpStreamingStarted(proto::UdpStreamingStarted {
            host: host.clone(),
            port: *port as u32,
            stereo: *stereo,
        }),
        VfoEventKind::UdpStreamingStopped => Kind::UdpStreamingStopped(empty()),
        VfoEventKind::RdsDecoderStarted => Kind::RdsDecoderStarted(empty()),
        VfoEventKind::RdsDecoderStopped => Kind::RdsDecoderStopped(empty()),
        VfoEventKind::RdsParserReset => Kind::RdsParserReset(empty()),
        VfoEventKind::AudioGainChanged { gain } => Kind::AudioGainChanged(*gain),
        VfoEventKind::VfoRemoved => Kind::VfoRemovedScoped(empty()),
    };
    proto::Event {
        id: ev.common.common.id,
        timestamp_seconds: ev.common.common.timestamp.seconds as i64,
        timestamp_nanos: ev.common.common.timestamp.nanos,
        vfo_handle: ev.common.handle,
        kind: Some(kind),
    }
}

/// Reconstructs a native event from the wire `Event` message (client side).
/// Returns `None` for a message with no `kind` set, which a conformant
/// server never sends.
pub fn proto_to_native(ev: proto::Event) -> Option<NativeEvent> {
    let common = EventCommon {
        id: ev.id,
        timestamp: Timestamp {
            seconds: ev.timestamp_seconds.max(0) as u64,
            nanos: ev.timestamp_nanos,
        },
    };
    let handle = ev.vfo_handle;

    let kind = match ev.kind? {
        Kind::SyncStart(_) => {
            return Some(NativeEvent::Receiver(ReceiverEvent {
                common,
                kind: ReceiverEventKind::SyncStart,
            }))
        }
        Kind::SyncEnd(_) => {
            return Some(NativeEvent::Receiver(ReceiverEvent {
                common,
                kind: ReceiverEventKind::SyncEnd,
            }))
        }
        Kind::Unsubscribed(_) => {
            return Some(NativeEvent::Receiver(ReceiverEvent {
                common,
                kind: ReceiverEventKind::Unsubscribed,
            }))
        }
        Kind::Started(_) => {
            return Some(NativeEvent::Receiver(ReceiverEvent {
                common,
                kind: ReceiverEventKind::Started,
            }))
        }
        Kind::Stopped(_) => {
            return Some(NativeEvent::Receiver(ReceiverEvent {
                common,
                kind: ReceiverEventKind::Stopped,
            }))
        }
        Kind::InputDeviceChanged(device) => ReceiverEventKind::InputDeviceChanged { device },
        Kind::AntennaChanged(antenna) => ReceiverEventKind::AntennaChanged { antenna },
        Kind::AntennasChanged(list) => ReceiverEventKind::AntennasChanged {
            antennas: list.values,
        },
        Kind::InputRateChanged(rate) => ReceiverEventKind::InputRateChanged { rate },
        Kind::InputDecimChanged(decim) => ReceiverEventKind::InputDecimChanged { decim },
        Kind::IqSwapChanged(enabled) => ReceiverEventKind::IqSwapChanged { enabled },
        Kind::DcCancelChanged(enabled) => ReceiverEventKind::DcCancelChanged { enabled },
        Kind::IqBalanceChanged(enabled) => ReceiverEventKind::IqBalanceChanged { enabled },
        Kind::RfFreqChanged(freq) => ReceiverEventKind::RfFreqChanged { freq },
        Kind::GainStagesChanged(list) => ReceiverEventKind::GainStagesChanged {
            stages: list
                .stages
                .into_iter()
                .map(|s| GainStage {
                    name: s.name,
                    start: s.start,
                    stop: s.stop,
                    step: s.step,
                    value: s.value,
                })
                .collect(),
        },
        Kind::AutoGainChanged(enabled) => ReceiverEventKind::AutoGainChanged { enabled },
        Kind::GainChanged(g) => ReceiverEventKind::GainChanged {
            name: g.name,
            value: g.value,
        },
        Kind::FreqCorrChanged(ppm) => ReceiverEventKind::FreqCorrChanged { ppm },
        Kind::FftSizeChanged(size) => ReceiverEventKind::FftSizeChanged { size },
        Kind::FftWindowChanged(w) => ReceiverEventKind::FftWindowChanged {
            window: window_from_proto(proto::WindowType::try_from(w).ok()?),
        },
        Kind::IqRecordingStarted(path) => ReceiverEventKind::IqRecordingStarted { path },
        Kind::IqRecordingStopped(_) => ReceiverEventKind::IqRecordingStopped,
        Kind::VfoAdded(handle) => ReceiverEventKind::VfoAdded { handle },
        Kind::VfoRemoved(handle) => ReceiverEventKind::VfoRemoved { handle },

        Kind::VfoSyncStart(_) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::VfoSyncStart,
            }))
        }
        Kind::VfoSyncEnd(_) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::VfoSyncEnd,
            }))
        }
        Kind::DemodChanged(d) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::DemodChanged {
                    demod: demod_from_proto(proto::Demod::try_from(d).ok()?),
                },
            }))
        }
        Kind::OffsetChanged(offset) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::OffsetChanged { offset },
            }))
        }
        Kind::CwOffsetChanged(offset) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::CwOffsetChanged { offset },
            }))
        }
        Kind::FilterChanged(f) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::FilterChanged {
                    shape: filter_shape_from_proto(proto::FilterShape::try_from(f.shape).ok()?),
                    low: f.low,
                    high: f.high,
                },
            }))
        }
        Kind::NbOnChanged(n) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::NoiseBlankerOnChanged {
                    id: nb_id_from_proto(proto::NoiseBlankerId::try_from(n.id).ok()?),
                    enabled: n.enabled,
                },
            }))
        }
        Kind::NbThresholdChanged(n) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::NoiseBlankerThresholdChanged {
                    id: nb_id_from_proto(proto::NoiseBlankerId::try_from(n.id).ok()?),
                    threshold: n.threshold,
                },
            }))
        }
        Kind::SqlLevelChanged(level) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::SqlLevelChanged { level },
            }))
        }
        Kind::SqlAlphaChanged(alpha) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::SqlAlphaChanged { alpha },
            }))
        }
        Kind::AgcOnChanged(enabled) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::AgcOnChanged { enabled },
            }))
        }
        Kind::AgcHangChanged(enabled) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::AgcHangChanged { enabled },
            }))
        }
        Kind::AgcThresholdChanged(threshold) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::AgcThresholdChanged { threshold },
            }))
        }
        Kind::AgcSlopeChanged(slope) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::AgcSlopeChanged { slope },
            }))
        }
        Kind::AgcDecayChanged(decay) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::AgcDecayChanged { decay },
            }))
        }
        Kind::AgcManualGainChanged(gain) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::AgcManualGainChanged { gain },
            }))
        }
        Kind::FmMaxDevChanged(max_dev) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::FmMaxDevChanged { max_dev },
            }))
        }
        Kind::FmDeemphChanged(deemph) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::FmDeemphChanged { deemph },
            }))
        }
        Kind::AmDcrChanged(enabled) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::AmDcrChanged { enabled },
            }))
        }
        Kind::AmSyncDcrChanged(enabled) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::AmSyncDcrChanged { enabled },
            }))
        }
        Kind::AmSyncPllBwChanged(bw) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::AmSyncPllBwChanged { bw },
            }))
        }
        Kind::RecordingStarted(path) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::RecordingStarted { path },
            }))
        }
        Kind::RecordingStopped(_) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::RecordingStopped,
            }))
        }
        Kind::SnifferStarted(s) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::SnifferStarted {
                    rate: s.rate,
                    size: s.size,
                },
            }))
        }
        Kind::SnifferStopped(_) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::SnifferStopped,
            }))
        }
        Kind::UdpStreamingStarted(u) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::UdpStreamingStarted {
                    host: u.host,
                    port: u.port as u16,
                    stereo: u.stereo,
                },
            }))
        }
        Kind::UdpStreamingStopped(_) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::UdpStreamingStopped,
            }))
        }
        Kind::RdsDecoderStarted(_) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::RdsDecoderStarted,
            }))
        }
        Kind::RdsDecoderStopped(_) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::RdsDecoderStopped,
            }))
        }
        Kind::RdsParserReset(_) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::RdsParserReset,
            }))
        }
        Kind::AudioGainChanged(gain) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::AudioGainChanged { gain },
            }))
        }
        Kind::VfoRemovedScoped(_) => {
            return Some(NativeEvent::Vfo(VfoEvent {
                common: VfoEventCommon { common, handle },
                kind: VfoEventKind::VfoRemoved,
            }))
        }
    };

    Some(NativeEvent::Receiver(ReceiverEvent { common, kind }))
}
