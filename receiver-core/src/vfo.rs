//! The VFO façade: per-channel commands, queries, subscription, and the
//! demod-switch state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::dsp::DspVfoChannel;
use crate::error::FacadeError;
use crate::event::{VfoEvent, VfoEventKind};
use crate::filter;
use crate::hub::{EventHub, SubscriberHandle};
use crate::types::{Demod, Filter, FilterShape, NoiseBlankerId};
use crate::worker::Worker;

/// Last-known-good value of every parameter a VFO sets, reapplied across
/// demod switches. Defaults mirror `addVfoChannel`'s construction values.
#[derive(Debug, Clone)]
pub struct ShadowState {
    pub demod: Demod,
    pub filter: Filter,
    pub filter_offset: i64,
    pub cw_offset: i64,
    pub sql_level: f64,
    pub sql_alpha: f64,
    pub agc_on: bool,
    pub agc_hang: bool,
    pub agc_threshold: i32,
    pub agc_slope: i32,
    pub agc_decay: i32,
    pub agc_manual_gain: i32,
    pub nb1_on: bool,
    pub nb1_threshold: f32,
    pub nb2_on: bool,
    pub nb2_threshold: f32,
    pub fm_max_dev: f32,
    pub fm_deemph: f64,
    pub am_dcr: bool,
    pub am_sync_dcr: bool,
    pub am_sync_pll_bw: f32,
    pub audio_gain: f64,
    pub audio_recording: Option<String>,
    pub sniffer: Option<(u32, u32)>,
    pub udp_streaming: Option<(String, u16, bool)>,
    pub rds_active: bool,
}

impl Default for ShadowState {
    fn default() -> Self {
        Self {
            demod: Demod::Off,
            filter: filter::default_filter(Demod::Off),
            filter_offset: 0,
            cw_offset: 0,
            sql_level: -150.0,
            sql_alpha: 0.001,
            agc_on: true,
            agc_hang: false,
            agc_threshold: -100,
            agc_slope: 0,
            agc_decay: 500,
            agc_manual_gain: 0,
            nb1_on: false,
            nb1_threshold: 3.3,
            nb2_on: false,
            nb2_threshold: 2.5,
            fm_max_dev: 5_000.0,
            fm_deemph: 75e-6,
            am_dcr: true,
            am_sync_dcr: true,
            am_sync_pll_bw: 0.001,
            audio_gain: 1.0,
            audio_recording: None,
            sniffer: None,
            udp_streaming: None,
            rds_active: false,
        }
    }
}

struct VfoInner {
    dsp: Box<dyn DspVfoChannel>,
    shadow: ShadowState,
    removed: bool,
}

/// Public, cheaply-cloneable handle to a VFO channel — a thin handle for
/// external callers. Every method enqueues onto the shared [`Worker`]; none
/// block the caller beyond that.
#[derive(Clone)]
pub struct Vfo {
    handle: u64,
    worker: Worker,
    hub: Arc<EventHub<VfoEvent>>,
    inner: Arc<Mutex<VfoInner>>,
    receiver_running: Arc<AtomicBool>,
}

impl Vfo {
    pub(crate) fn new(
        handle: u64,
        worker: Worker,
        dsp: Box<dyn DspVfoChannel>,
        receiver_running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            handle,
            worker,
            hub: Arc::new(EventHub::new()),
            inner: Arc::new(Mutex::new(VfoInner {
                dsp,
                shadow: ShadowState::default(),
                removed: false,
            })),
            receiver_running,
        }
    }

    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// Marks the VFO sealed: every subsequent command fails `VFO_NOT_FOUND`
    /// without touching the DSP object. Called by the receiver façade after
    /// emitting `VfoRemoved`.
    pub(crate) fn mark_removed(&self) {
        self.inner.lock().unwrap().removed = true;
    }

    pub(crate) fn hub(&self) -> &Arc<EventHub<VfoEvent>> {
        &self.hub
    }

    /// Runs `f` against the underlying DSP channel. Used by the receiver
    /// façade to detach the channel during `removeVfoChannel`.
    pub(crate) fn with_dsp_mut<R>(&self, f: impl FnOnce(&mut dyn DspVfoChannel) -> R) -> R {
        let mut guard = self.inner.lock().unwrap();
        f(guard.dsp.as_mut())
    }

    /// Runs `f` on the worker thread with the alive check and reply
    /// plumbing common to every command. `f` returns the command's result
    /// value plus an optional event to emit.
    async fn command<T, F>(&self, name: &'static str, f: F) -> Result<T, FacadeError>
    where
        T: Send + 'static,
        F: FnOnce(&mut VfoInner) -> Result<(T, Option<VfoEventKind>), FacadeError>
            + Send
            + 'static,
    {
        if self.worker.is_paused() {
            return Err(FacadeError::WorkerBusy);
        }
        let (tx, rx) = oneshot::channel();
        let inner = self.inner.clone();
        let hub = self.hub.clone();
        let handle = self.handle;
        self.worker.submit(name, move || {
            tracing::debug!(name, handle, "vfo command received");
            let mut guard = inner.lock().unwrap();
            if guard.removed {
                tracing::debug!(name, handle, "vfo command on removed vfo");
                let _ = tx.send(Err(FacadeError::VfoNotFound { handle }));
                return;
            }
            let result = f(&mut guard);
            let reply = match result {
                Ok((value, event)) => {
                    if let Some(kind) = event {
                        hub.emit(VfoEvent::new(handle, kind));
                    }
                    Ok(value)
                }
                Err(e) => {
                    tracing::warn!(name, handle, error = %e, "vfo command failed");
                    Err(e)
                }
            };
            let _ = tx.send(reply);
        })?;
        rx.await.map_err(|_| FacadeError::WorkerBusy)?
    }

    /// Runs `f` read-only on the worker thread (a query).
    async fn query<T, F>(&self, name: &'static str, f: F) -> Result<T, FacadeError>
    where
        T: Send + 'static,
        F: FnOnce(&VfoInner) -> T + Send + 'static,
    {
        if self.worker.is_paused() {
            return Err(FacadeError::WorkerBusy);
        }
        let (tx, rx) = oneshot::channel();
        let inner = self.inner.clone();
        let handle = self.handle;
        self.worker.submit(name, move || {
            let guard = inner.lock().unwrap();
            if guard.removed {
                let _ = tx.send(Err(FacadeError::VfoNotFound { handle }));
                return;
            }
            let _ = tx.send(Ok(f(&guard)));
        })?;
        rx.await.map_err(|_| FacadeError::WorkerBusy)?
    }

    pub async fn get_demod(&self) -> Result<Demod, FacadeError> {
        self.query("get_demod", |v| v.shadow.demod).await
    }

    pub async fn get_filter(&self) -> Result<Filter, FacadeError> {
        self.query("get_filter", |v| v.shadow.filter).await
    }

    pub async fn get_shadow(&self) -> Result<ShadowState, FacadeError> {
        self.query("get_shadow", |v| v.shadow.clone()).await
    }

    /// `setFilter(low, high, shape)`. Validated against the current demod's
    /// range table; `high - low` must clear the DSP-imposed minimum.
    pub async fn set_filter(
        &self,
        low: i64,
        high: i64,
        shape: FilterShape,
    ) -> Result<(), FacadeError> {
        self.command("set_filter", move |v| {
            if !filter::is_valid(v.shadow.demod, low, high) {
                return Err(FacadeError::InvalidFilter { low, high });
            }
            let new_filter = Filter { shape, low, high };
            if v.shadow.filter == new_filter {
                return Ok(((), None));
            }
            v.dsp.set_filter(new_filter);
            v.shadow.filter = new_filter;
            Ok((
                (),
                Some(VfoEventKind::FilterChanged { shape, low, high }),
            ))
        })
        .await
    }

    pub async fn set_filter_offset(&self, offset: i64) -> Result<(), FacadeError> {
        self.command("set_filter_offset", move |v| {
            if v.shadow.filter_offset == offset {
                return Ok(((), None));
            }
            v.dsp.set_filter_offset(offset);
            v.shadow.filter_offset = offset;
            Ok(((), Some(VfoEventKind::OffsetChanged { offset })))
        })
        .await
    }

    pub async fn set_cw_offset(&self, offset: i64) -> Result<(), FacadeError> {
        self.command("set_cw_offset", move |v| {
            if v.shadow.cw_offset == offset {
                return Ok(((), None));
            }
            v.dsp.set_cw_offset(offset);
            v.shadow.cw_offset = offset;
            Ok(((), Some(VfoEventKind::CwOffsetChanged { offset })))
        })
        .await
    }

    /// `setDemod(new)`: the multi-step demod-switch state machine.
    pub async fn set_demod(&self, demod: Demod) -> Result<(), FacadeError> {
        if self.worker.is_paused() {
            return Err(FacadeError::WorkerBusy);
        }
        let (tx, rx) = oneshot::channel();
        let inner = self.inner.clone();
        let hub = self.hub.clone();
        let handle = self.handle;
        self.worker.submit("set_demod", move || {
            let mut v = inner.lock().unwrap();
            if v.removed {
                let _ = tx.send(Err(FacadeError::VfoNotFound { handle }));
                return;
            }
            if demod == v.shadow.demod {
                let _ = tx.send(Ok(()));
                return;
            }

            if v.shadow.rds_active {
                v.dsp.stop_rds_decoder();
                v.shadow.rds_active = false;
                hub.emit(VfoEvent::new(handle, VfoEventKind::RdsDecoderStopped));
            }
            if v.shadow.audio_recording.is_some() {
                v.dsp.stop_audio_recording();
                v.shadow.audio_recording = None;
                hub.emit(VfoEvent::new(handle, VfoEventKind::RecordingStopped));
            }

            v.dsp.set_demod(demod);
            v.shadow.demod = demod;

            // Reapply shadow parameters that survive demod switches.
            v.dsp.set_agc_on(v.shadow.agc_on);
            v.dsp.set_agc_hang(v.shadow.agc_hang);
            v.dsp.set_agc_threshold(v.shadow.agc_threshold);
            v.dsp.set_agc_slope(v.shadow.agc_slope);
            v.dsp.set_agc_decay(v.shadow.agc_decay);
            v.dsp.set_agc_manual_gain(v.shadow.agc_manual_gain);
            v.dsp.set_sql_level(v.shadow.sql_level);
            v.dsp.set_sql_alpha(v.shadow.sql_alpha);
            v.dsp.set_nb_on(NoiseBlankerId::Nb1, v.shadow.nb1_on);
            v.dsp.set_nb_threshold(NoiseBlankerId::Nb1, v.shadow.nb1_threshold);
            v.dsp.set_nb_on(NoiseBlankerId::Nb2, v.shadow.nb2_on);
            v.dsp.set_nb_threshold(NoiseBlankerId::Nb2, v.shadow.nb2_threshold);
            match demod {
                Demod::Am => v.dsp.set_am_dcr(v.shadow.am_dcr),
                Demod::AmSync => {
                    v.dsp.set_am_sync_dcr(v.shadow.am_sync_dcr);
                    v.dsp.set_am_sync_pll_bw(v.shadow.am_sync_pll_bw);
                }
                Demod::WfmMono | Demod::WfmStereo | Demod::WfmStereoOirt => {
                    v.dsp.set_fm_max_dev(v.shadow.fm_max_dev);
                    v.dsp.set_fm_deemph(v.shadow.fm_deemph);
                }
                Demod::Nfm => v.dsp.set_fm_max_dev(v.shadow.fm_max_dev),
                Demod::Cwl | Demod::Cwu => v.dsp.set_cw_offset(v.shadow.cw_offset),
                _ => {}
            }
            v.dsp.reset_rds_parser();

            hub.emit(VfoEvent::new(handle, VfoEventKind::DemodChanged { demod }));

            if !filter::is_valid(demod, v.shadow.filter.low, v.shadow.filter.high) {
                let def = filter::default_filter(demod);
                v.dsp.set_filter(def);
                v.shadow.filter = def;
                hub.emit(VfoEvent::new(
                    handle,
                    VfoEventKind::FilterChanged {
                        shape: def.shape,
                        low: def.low,
                        high: def.high,
                    },
                ));
            }

            let _ = tx.send(Ok(()));
        })?;
        rx.await.map_err(|_| FacadeError::WorkerBusy)?
    }

    pub async fn set_sql_level(&self, level: f64) -> Result<(), FacadeError> {
        self.command("set_sql_level", move |v| {
            if v.shadow.sql_level == level {
                return Ok(((), None));
            }
            v.dsp.set_sql_level(level);
            v.shadow.sql_level = level;
            Ok(((), Some(VfoEventKind::SqlLevelChanged { level })))
        })
        .await
    }

    pub async fn set_sql_alpha(&self, alpha: f64) -> Result<(), FacadeError> {
        self.command("set_sql_alpha", move |v| {
            if v.shadow.sql_alpha == alpha {
                return Ok(((), None));
            }
            v.dsp.set_sql_alpha(alpha);
            v.shadow.sql_alpha = alpha;
            Ok(((), Some(VfoEventKind::SqlAlphaChanged { alpha })))
        })
        .await
    }

    pub async fn set_agc_on(&self, enabled: bool) -> Result<(), FacadeError> {
        self.command("set_agc_on", move |v| {
            if v.shadow.agc_on == enabled {
                return Ok(((), None));
            }
            v.dsp.set_agc_on(enabled);
            v.shadow.agc_on = enabled;
            Ok(((), Some(VfoEventKind::AgcOnChanged { enabled })))
        })
        .await
    }

    pub async fn set_agc_hang(&self, enabled: bool) -> Result<(), FacadeError> {
        self.command("set_agc_hang", move |v| {
            if v.shadow.agc_hang == enabled {
                return Ok(((), None));
            }
            v.dsp.set_agc_hang(enabled);
            v.shadow.agc_hang = enabled;
            Ok(((), Some(VfoEventKind::AgcHangChanged { enabled })))
        })
        .await
    }

    pub async fn set_agc_threshold(&self, threshold: i32) -> Result<(), FacadeError> {
        self.command("set_agc_threshold", move |v| {
            if v.shadow.agc_threshold == threshold {
                return Ok(((), None));
            }
            v.dsp.set_agc_threshold(threshold);
            v.shadow.agc_threshold = threshold;
            Ok(((), Some(VfoEventKind::AgcThresholdChanged { threshold })))
        })
        .await
    }

    pub async fn set_agc_slope(&self, slope: i32) -> Result<(), FacadeError> {
        self.command("set_agc_slope", move |v| {
            if v.shadow.agc_slope == slope {
                return Ok(((), None));
            }
            v.dsp.set_agc_slope(slope);
            v.shadow.agc_slope = slope;
            Ok(((), Some(VfoEventKind::AgcSlopeChanged { slope })))
        })
        .await
    }

    pub async fn set_agc_decay(&self, decay: i32) -> Result<(), FacadeError> {
        self.command("set_agc_decay", move |v| {
            if v.shadow.agc_decay == decay {
                return Ok(((), None));
            }
            v.dsp.set_agc_decay(decay);
            v.shadow.agc_decay = decay;
            Ok(((), Some(VfoEventKind::AgcDecayChanged { decay })))
        })
        .await
    }

    pub async fn set_agc_manual_gain(&self, gain: i32) -> Result<(), FacadeError> {
        self.command("set_agc_manual_gain", move |v| {
            if v.shadow.agc_manual_gain == gain {
                return Ok(((), None));
            }
            v.dsp.set_agc_manual_gain(gain);
            v.shadow.agc_manual_gain = gain;
            Ok(((), Some(VfoEventKind::AgcManualGainChanged { gain })))
        })
        .await
    }

    pub async fn set_nb_on(&self, id: NoiseBlankerId, enabled: bool) -> Result<(), FacadeError> {
        self.command("set_nb_on", move |v| {
            let current = match id {
                NoiseBlankerId::Nb1 => &mut v.shadow.nb1_on,
                NoiseBlankerId::Nb2 => &mut v.shadow.nb2_on,
            };
            if *current == enabled {
                return Ok(((), None));
            }
            v.dsp.set_nb_on(id, enabled);
            match id {
                NoiseBlankerId::Nb1 => v.shadow.nb1_on = enabled,
                NoiseBlankerId::Nb2 => v.shadow.nb2_on = enabled,
            }
            Ok(((), Some(VfoEventKind::NoiseBlankerOnChanged { id, enabled })))
        })
        .await
    }

    pub async fn set_nb_threshold(
        &self,
        id: NoiseBlankerId,
        threshold: f32,
    ) -> Result<(), FacadeError> {
        self.command("set_nb_threshold", move |v| {
            let current = match id {
                NoiseBlankerId::Nb1 => v.shadow.nb1_threshold,
                NoiseBlankerId::Nb2 => v.shadow.nb2_threshold,
            };
            if current == threshold {
                return Ok(((), None));
            }
            v.dsp.set_nb_threshold(id, threshold);
            match id {
                NoiseBlankerId::Nb1 => v.shadow.nb1_threshold = threshold,
                NoiseBlankerId::Nb2 => v.shadow.nb2_threshold = threshold,
            }
            Ok((
                (),
                Some(VfoEventKind::NoiseBlankerThresholdChanged { id, threshold }),
            ))
        })
        .await
    }

    pub async fn set_fm_max_dev(&self, max_dev: f32) -> Result<(), FacadeError> {
        self.command("set_fm_max_dev", move |v| {
            if v.shadow.fm_max_dev == max_dev {
                return Ok(((), None));
            }
            v.dsp.set_fm_max_dev(max_dev);
            v.shadow.fm_max_dev = max_dev;
            Ok(((), Some(VfoEventKind::FmMaxDevChanged { max_dev })))
        })
        .await
    }

    pub async fn set_fm_deemph(&self, deemph: f64) -> Result<(), FacadeError> {
        self.command("set_fm_deemph", move |v| {
            if v.shadow.fm_deemph == deemph {
                return Ok(((), None));
            }
            v.dsp.set_fm_deemph(deemph);
            v.shadow.fm_deemph = deemph;
            Ok(((), Some(VfoEventKind::FmDeemphChanged { deemph })))
        })
        .await
    }

    pub async fn set_am_dcr(&self, enabled: bool) -> Result<(), FacadeError> {
        self.command("set_am_dcr", move |v| {
            if v.shadow.am_dcr == enabled {
                return Ok(((), None));
            }
            v.dsp.set_am_dcr(enabled);
            v.shadow.am_dcr = enabled;
            Ok(((), Some(VfoEventKind::AmDcrChanged { enabled })))
        })
        .await
    }

    pub async fn set_am_sync_dcr(&self, enabled: bool) -> Result<(), FacadeError> {
        self.command("set_am_sync_dcr", move |v| {
            if v.shadow.am_sync_dcr == enabled {
                return Ok(((), None));
            }
            v.dsp.set_am_sync_dcr(enabled);
            v.shadow.am_sync_dcr = enabled;
            Ok(((), Some(VfoEventKind::AmSyncDcrChanged { enabled })))
        })
        .await
    }

    pub async fn set_am_sync_pll_bw(&self, bw: f32) -> Result<(), FacadeError> {
        self.command("set_am_sync_pll_bw", move |v| {
            if v.shadow.am_sync_pll_bw == bw {
                return Ok(((), None));
            }
            v.dsp.set_am_sync_pll_bw(bw);
            v.shadow.am_sync_pll_bw = bw;
            Ok(((), Some(VfoEventKind::AmSyncPllBwChanged { bw })))
        })
        .await
    }

    pub async fn set_audio_gain(&self, gain: f64) -> Result<(), FacadeError> {
        self.command("set_audio_gain", move |v| {
            if v.shadow.audio_gain == gain {
                return Ok(((), None));
            }
            v.dsp.set_audio_gain(gain);
            v.shadow.audio_gain = gain;
            Ok(((), Some(VfoEventKind::AudioGainChanged { gain })))
        })
        .await
    }

    /// `startAudioRecording(path)`: demod-off, not-running, and double-start
    /// are all terminal errors before the DSP is touched.
    pub async fn start_audio_recording(&self, path: String) -> Result<(), FacadeError> {
        let running = self.receiver_running.clone();
        self.command("start_audio_recording", move |v| {
            if v.shadow.audio_recording.is_some() {
                return Err(FacadeError::AlreadyRecording);
            }
            if v.shadow.demod == Demod::Off {
                return Err(FacadeError::DemodIsOff);
            }
            if !running.load(Ordering::Acquire) {
                return Err(FacadeError::NotRunning);
            }
            v.dsp.start_audio_recording(&path).map_err(|source| {
                FacadeError::CouldntCreateFile {
                    path: path.clone().into(),
                    source,
                }
            })?;
            v.shadow.audio_recording = Some(path.clone());
            Ok(((), Some(VfoEventKind::RecordingStarted { path })))
        })
        .await
    }

    pub async fn stop_audio_recording(&self) -> Result<(), FacadeError> {
        self.command("stop_audio_recording", move |v| {
            if v.shadow.audio_recording.is_none() {
                return Err(FacadeError::AlreadyNotRecording);
            }
            v.dsp.stop_audio_recording();
            v.shadow.audio_recording = None;
            Ok(((), Some(VfoEventKind::RecordingStopped)))
        })
        .await
    }

    pub async fn start_sniffer(&self, rate: u32, size: u32) -> Result<(), FacadeError> {
        self.command("start_sniffer", move |v| {
            if v.shadow.sniffer.is_some() {
                return Err(FacadeError::SnifferAlreadyActive);
            }
            v.dsp.start_sniffer(rate, size);
            v.shadow.sniffer = Some((rate, size));
            Ok(((), Some(VfoEventKind::SnifferStarted { rate, size })))
        })
        .await
    }

    pub async fn stop_sniffer(&self) -> Result<(), FacadeError> {
        self.command("stop_sniffer", move |v| {
            if v.shadow.sniffer.is_none() {
                return Err(FacadeError::SnifferAlreadyInactive);
            }
            v.dsp.stop_sniffer();
            v.shadow.sniffer = None;
            Ok(((), Some(VfoEventKind::SnifferStopped)))
        })
        .await
    }

    /// `getSnifferData(buf, cap)`: `cap` must cover the active buffer size
    /// or the call fails before touching the DSP object.
    pub async fn get_sniffer_data(&self, capacity: usize) -> Result<Vec<f32>, FacadeError> {
        self.query("get_sniffer_data", move |v| {
            let needed = v.dsp.sniffer_buffer_size();
            if capacity < needed {
                return Err(FacadeError::InsufficientBufferSize {
                    given: capacity,
                    needed,
                });
            }
            let mut buf = vec![0f32; needed];
            let filled = v.dsp.get_sniffer_data(&mut buf);
            buf.truncate(filled);
            Ok(buf)
        })
        .await?
    }

    /// Applies unconditionally, no liveness guard: repeated starts just
    /// reopen the stream at the given host/port, repeated stops are a no-op
    /// tear-down. Matches the original's `startUdpStreaming`/`stopUdpStreaming`,
    /// which carry no such guard (unlike the sniffer and RDS decoder).
    pub async fn start_udp_streaming(
        &self,
        host: String,
        port: u16,
        stereo: bool,
    ) -> Result<(), FacadeError> {
        self.command("start_udp_streaming", move |v| {
            v.dsp.start_udp_streaming(&host, port, stereo);
            v.shadow.udp_streaming = Some((host.clone(), port, stereo));
            Ok((
                (),
                Some(VfoEventKind::UdpStreamingStarted { host, port, stereo }),
            ))
        })
        .await
    }

    pub async fn stop_udp_streaming(&self) -> Result<(), FacadeError> {
        self.command("stop_udp_streaming", move |v| {
            v.dsp.stop_udp_streaming();
            v.shadow.udp_streaming = None;
            Ok(((), Some(VfoEventKind::UdpStreamingStopped)))
        })
        .await
    }

    pub async fn start_rds_decoder(&self) -> Result<(), FacadeError> {
        self.command("start_rds_decoder", move |v| {
            if v.shadow.rds_active {
                return Err(FacadeError::RdsAlreadyActive);
            }
            v.dsp.start_rds_decoder();
            v.shadow.rds_active = true;
            Ok(((), Some(VfoEventKind::RdsDecoderStarted)))
        })
        .await
    }

    pub async fn stop_rds_decoder(&self) -> Result<(), FacadeError> {
        self.command("stop_rds_decoder", move |v| {
            if !v.shadow.rds_active {
                return Err(FacadeError::RdsAlreadyInactive);
            }
            v.dsp.stop_rds_decoder();
            v.shadow.rds_active = false;
            Ok(((), Some(VfoEventKind::RdsDecoderStopped)))
        })
        .await
    }

    /// Subscribe: connect, then replay `VfoSyncStart` …
    /// every live parameter … `VfoSyncEnd` to the new handler only, all
    /// carrying `id = -1`.
    pub async fn subscribe(&self) -> Result<SubscriberHandle<VfoEvent>, FacadeError> {
        if self.worker.is_paused() {
            return Err(FacadeError::WorkerBusy);
        }
        let (tx, rx) = oneshot::channel();
        let inner = self.inner.clone();
        let hub = self.hub.clone();
        let handle = self.handle;
        // Connecting to the hub and snapshotting the shadow state happen in
        // the same worker task, so no command running between "connect" and
        // "snapshot" can slip in and desynchronise the replay from what the
        // new subscriber's live feed will show next.
        self.worker.submit("subscribe", move || {
            let guard = inner.lock().unwrap();
            if guard.removed {
                let _ = tx.send(Err(FacadeError::VfoNotFound { handle }));
                return;
            }
            let mut sub = hub.subscribe();
            sub.prime(build_replay(handle, &guard.shadow));
            let _ = tx.send(Ok(sub));
        })?;
        rx.await.map_err(|_| FacadeError::WorkerBusy)?
    }
}

/// Expands a shadow snapshot into the synthetic `VfoSyncStart` … `VfoSyncEnd`
/// replay, one event per live parameter plus any active
/// recording/sniffer/streaming/RDS session.
fn build_replay(handle: u64, shadow: &ShadowState) -> Vec<VfoEvent> {
    let synth = |kind: VfoEventKind| VfoEvent::synthetic(handle, kind);
    let mut replay = vec![
        synth(VfoEventKind::VfoSyncStart),
        synth(VfoEventKind::DemodChanged { demod: shadow.demod }),
        synth(VfoEventKind::OffsetChanged {
            offset: shadow.filter_offset,
        }),
        synth(VfoEventKind::CwOffsetChanged {
            offset: shadow.cw_offset,
        }),
        synth(VfoEventKind::FilterChanged {
            shape: shadow.filter.shape,
            low: shadow.filter.low,
            high: shadow.filter.high,
        }),
        synth(VfoEventKind::SqlLevelChanged {
            level: shadow.sql_level,
        }),
        synth(VfoEventKind::SqlAlphaChanged {
            alpha: shadow.sql_alpha,
        }),
        synth(VfoEventKind::AgcOnChanged {
            enabled: shadow.agc_on,
        }),
        synth(VfoEventKind::AgcHangChanged {
            enabled: shadow.agc_hang,
        }),
        synth(VfoEventKind::AgcThresholdChanged {
            threshold: shadow.agc_threshold,
        }),
        synth(VfoEventKind::AgcSlopeChanged {
            slope: shadow.agc_slope,
        }),
        synth(VfoEventKind::AgcDecayChanged {
            decay: shadow.agc_decay,
        }),
        synth(VfoEventKind::AgcManualGainChanged {
            gain: shadow.agc_manual_gain,
        }),
        synth(VfoEventKind::NoiseBlankerOnChanged {
            id: NoiseBlankerId::Nb1,
            enabled: shadow.nb1_on,
        }),
        synth(VfoEventKind::NoiseBlankerThresholdChanged {
            id: NoiseBlankerId::Nb1,
            threshold: shadow.nb1_threshold,
        }),
        synth(VfoEventKind::NoiseBlankerOnChanged {
            id: NoiseBlankerId::Nb2,
            enabled: shadow.nb2_on,
        }),
        synth(VfoEventKind::NoiseBlankerThresholdChanged {
            id: NoiseBlankerId::Nb2,
            threshold: shadow.nb2_threshold,
        }),
        synth(VfoEventKind::FmMaxDevChanged {
            max_dev: shadow.fm_max_dev,
        }),
        synth(VfoEventKind::FmDeemphChanged {
            deemph: shadow.fm_deemph,
        }),
        synth(VfoEventKind::AmDcrChanged {
            enabled: shadow.am_dcr,
        }),
        synth(VfoEventKind::AmSyncDcrChanged {
            enabled: shadow.am_sync_dcr,
        }),
        synth(VfoEventKind::AmSyncPllBwChanged {
            bw: shadow.am_sync_pll_bw,
        }),
        synth(VfoEventKind::AudioGainChanged {
            gain: shadow.audio_gain,
        }),
    ];
    if let Some(path) = &shadow.audio_recording {
        replay.push(synth(VfoEventKind::RecordingStarted { path: path.clone() }));
    }
    if let Some((rate, size)) = shadow.sniffer {
        replay.push(synth(VfoEventKind::SnifferStarted { rate, size }));
    }
    if let Some((host, port, stereo)) = &shadow.udp_streaming {
        replay.push(synth(VfoEventKind::UdpStreamingStarted {
            host: host.clone(),
            port: *port,
            stereo: *stereo,
        }));
    }
    if shadow.rds_active {
        replay.push(synth(VfoEventKind::RdsDecoderStarted));
    }
    replay.push(synth(VfoEventKind::VfoSyncEnd));
    replay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::DspVfoChannel;
    use crate::types::{Filter, FilterRange, FilterShape};

    struct FakeChannel;

    impl DspVfoChannel for FakeChannel {
        fn set_filter_offset(&mut self, _offset: i64) {}
        fn get_filter_offset(&self) -> i64 {
            0
        }
        fn set_cw_offset(&mut self, _offset: i64) {}
        fn get_cw_offset(&self) -> i64 {
            0
        }
        fn set_filter(&mut self, _filter: Filter) {}
        fn get_filter(&self) -> Filter {
            filter::default_filter(Demod::Off)
        }
        fn filter_range(&self, demod: Demod) -> FilterRange {
            filter::range_for(demod)
        }
        fn default_filter(&self, demod: Demod) -> Filter {
            filter::default_filter(demod)
        }
        fn set_demod(&mut self, _demod: Demod) {}
        fn get_demod(&self) -> Demod {
            Demod::Off
        }
        fn set_sql_level(&mut self, _level: f64) {}
        fn set_sql_alpha(&mut self, _alpha: f64) {}
        fn set_agc_on(&mut self, _enabled: bool) {}
        fn set_agc_hang(&mut self, _enabled: bool) {}
        fn set_agc_threshold(&mut self, _threshold: i32) {}
        fn set_agc_slope(&mut self, _slope: i32) {}
        fn set_agc_decay(&mut self, _decay: i32) {}
        fn set_agc_manual_gain(&mut self, _gain: i32) {}
        fn set_nb_on(&mut self, _id: NoiseBlankerId, _enabled: bool) {}
        fn set_nb_threshold(&mut self, _id: NoiseBlankerId, _threshold: f32) {}
        fn set_fm_max_dev(&mut self, _max_dev: f32) {}
        fn set_fm_deemph(&mut self, _deemph: f64) {}
        fn set_am_dcr(&mut self, _enabled: bool) {}
        fn set_am_sync_dcr(&mut self, _enabled: bool) {}
        fn set_am_sync_pll_bw(&mut self, _bw: f32) {}
        fn set_audio_gain(&mut self, _gain: f64) {}
        fn start_audio_recording(&mut self, _path: &str) -> Result<(), std::io::Error> {
            Ok(())
        }
        fn stop_audio_recording(&mut self) {}
        fn is_audio_recording(&self) -> bool {
            false
        }
        fn start_sniffer(&mut self, _rate: u32, _size: u32) {}
        fn stop_sniffer(&mut self) {}
        fn is_sniffer_active(&self) -> bool {
            false
        }
        fn get_sniffer_data(&self, _buf: &mut [f32]) -> usize {
            0
        }
        fn sniffer_buffer_size(&self) -> usize {
            4_096
        }
        fn start_udp_streaming(&mut self, _host: &str, _port: u16, _stereo: bool) {}
        fn stop_udp_streaming(&mut self) {}
        fn is_udp_streaming(&self) -> bool {
            false
        }
        fn start_rds_decoder(&mut self) {}
        fn stop_rds_decoder(&mut self) {}
        fn is_rds_decoder_active(&self) -> bool {
            false
        }
        fn reset_rds_parser(&mut self) {}
    }

    fn make_vfo() -> Vfo {
        let worker = Worker::start();
        Vfo::new(1, worker, Box::new(FakeChannel), Arc::new(AtomicBool::new(true)))
    }

    #[tokio::test]
    async fn subscribe_replay_starts_and_ends_with_sync_markers() {
        let vfo = make_vfo();
        let mut sub = vfo.subscribe().await.unwrap();
        assert_eq!(sub.recv().await.unwrap().kind, VfoEventKind::VfoSyncStart);

        let mut last = VfoEventKind::VfoSyncStart;
        loop {
            let ev = sub.recv().await.unwrap();
            if ev.kind == VfoEventKind::VfoSyncEnd {
                break;
            }
            last = ev.kind;
        }
        assert_ne!(last, VfoEventKind::VfoSyncStart);
    }

    #[tokio::test]
    async fn subscribe_does_not_see_other_subscribers_replay() {
        let vfo = make_vfo();
        let mut a = vfo.subscribe().await.unwrap();
        for _ in 0..26 {
            a.recv().await.unwrap();
        }

        let mut b = vfo.subscribe().await.unwrap();
        assert_eq!(b.recv().await.unwrap().kind, VfoEventKind::VfoSyncStart);
    }

    #[tokio::test]
    async fn removed_vfo_rejects_subscribe() {
        let vfo = make_vfo();
        vfo.mark_removed();
        assert!(vfo.subscribe().await.is_err());
    }
}
