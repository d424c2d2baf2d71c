//! The receiver façade: global commands, VFO lifecycle, FFT retrieval, and
//! the receiver-scope subscription protocol.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::dsp::DspReceiver;
use crate::error::FacadeError;
use crate::event::{ReceiverEvent, ReceiverEventKind, VfoEvent, VfoEventKind};
use crate::hub::{EventHub, SubscriberHandle};
use crate::types::{GainStage, Timestamp, WindowType};
use crate::vfo::Vfo;
use crate::worker::Worker;

/// Lower/upper clamp applied to `setFreqCorr` before it reaches the DSP
/// object.
const FREQ_CORR_MIN: i32 = -200;
const FREQ_CORR_MAX: i32 = 200;

struct ReceiverInner {
    dsp: Box<dyn DspReceiver>,
    vfos: HashMap<u64, Vfo>,
    next_handle: u64,
}

/// Public, cheaply-cloneable handle to the receiver. Every method enqueues
/// onto the shared [`Worker`]; none block the caller beyond that.
#[derive(Clone)]
pub struct Receiver {
    worker: Worker,
    hub: Arc<EventHub<ReceiverEvent>>,
    inner: Arc<Mutex<ReceiverInner>>,
    /// Shared with every owned [`Vfo`] as its `receiver_running` flag — the
    /// stand-in for the source's `weak_ptr<Receiver>` back-reference.
    running: Arc<AtomicBool>,
}

impl Receiver {
    pub fn new(dsp: Box<dyn DspReceiver>) -> Self {
        Self {
            worker: Worker::start(),
            hub: Arc::new(EventHub::new()),
            inner: Arc::new(Mutex::new(ReceiverInner {
                dsp,
                vfos: HashMap::new(),
                next_handle: 1,
            })),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Shuts the worker thread down. Idempotent; see [`Worker::stop`].
    pub fn shutdown(&self) {
        self.worker.stop();
    }

    async fn command<T, F>(&self, name: &'static str, f: F) -> Result<T, FacadeError>
    where
        T: Send + 'static,
        F: FnOnce(&mut ReceiverInner, &EventHub<ReceiverEvent>) -> Result<T, FacadeError>
            + Send
            + 'static,
    {
        if self.worker.is_paused() {
            return Err(FacadeError::WorkerBusy);
        }
        let (tx, rx) = oneshot::channel();
        let inner = self.inner.clone();
        let hub = self.hub.clone();
        self.worker.submit(name, move || {
            tracing::debug!(name, "receiver command received");
            let mut guard = inner.lock().unwrap();
            let reply = f(&mut guard, &hub);
            if let Err(ref e) = reply {
                tracing::warn!(name, error = %e, "receiver command failed");
            }
            let _ = tx.send(reply);
        })?;
        rx.await.map_err(|_| FacadeError::WorkerBusy)?
    }

    async fn query<T, F>(&self, name: &'static str, f: F) -> Result<T, FacadeError>
    where
        T: Send + 'static,
        F: FnOnce(&ReceiverInner) -> T + Send + 'static,
    {
        if self.worker.is_paused() {
            return Err(FacadeError::WorkerBusy);
        }
        let (tx, rx) = oneshot::channel();
        let inner = self.inner.clone();
        self.worker.submit(name, move || {
            let guard = inner.lock().unwrap();
            let _ = tx.send(f(&guard));
        })?;
        rx.await.map_err(|_| FacadeError::WorkerBusy)
    }

    pub async fn start(&self) -> Result<(), FacadeError> {
        let running = self.running.clone();
        self.command("start", move |r, hub| {
            if running.load(Ordering::Acquire) {
                return Ok(());
            }
            r.dsp.start();
            running.store(true, Ordering::Release);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::Started));
            Ok(())
        })
        .await
    }

    pub async fn stop(&self) -> Result<(), FacadeError> {
        let running = self.running.clone();
        self.command("stop", move |r, hub| {
            if !running.load(Ordering::Acquire) {
                return Ok(());
            }
            r.dsp.stop();
            running.store(false, Ordering::Release);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::Stopped));
            Ok(())
        })
        .await
    }

    /// `setInputDevice(dev)`. On DSP failure, falls back to the
    /// zero-input device so the graph stays connected, emits the full
    /// device-swap cascade so subscribers learn the new reality, and still
    /// replies `INVALID_INPUT_DEVICE` to the caller.
    pub async fn set_input_device(&self, device: String) -> Result<(), FacadeError> {
        self.command("set_input_device", move |r, hub| {
            let failed_device = device.clone();
            match r.dsp.set_input_device(&device) {
                Ok(()) => {
                    hub.emit(ReceiverEvent::new(ReceiverEventKind::InputDeviceChanged {
                        device,
                    }));
                    Ok(())
                }
                Err(()) => {
                    let _ = r.dsp.set_input_device("null");
                    hub.emit(ReceiverEvent::new(ReceiverEventKind::InputDeviceChanged {
                        device: r.dsp.current_input_device(),
                    }));
                    hub.emit(ReceiverEvent::new(ReceiverEventKind::GainStagesChanged {
                        stages: r.dsp.get_gain_stages(),
                    }));
                    hub.emit(ReceiverEvent::new(ReceiverEventKind::AntennasChanged {
                        antennas: r.dsp.get_antennas(),
                    }));
                    hub.emit(ReceiverEvent::new(ReceiverEventKind::AntennaChanged {
                        antenna: r.dsp.get_antenna(),
                    }));
                    hub.emit(ReceiverEvent::new(ReceiverEventKind::RfFreqChanged {
                        freq: r.dsp.get_rf_freq(),
                    }));
                    hub.emit(ReceiverEvent::new(ReceiverEventKind::InputRateChanged {
                        rate: r.dsp.get_input_rate(),
                    }));
                    Err(FacadeError::InvalidInputDevice {
                        device: failed_device,
                    })
                }
            }
        })
        .await
    }

    pub async fn current_input_device(&self) -> Result<String, FacadeError> {
        self.query("current_input_device", |r| r.dsp.current_input_device())
            .await
    }

    /// `setInputRate`: replies the actually achieved rate, which the driver
    /// may round.
    pub async fn set_input_rate(&self, rate: f64) -> Result<f64, FacadeError> {
        self.command("set_input_rate", move |r, hub| {
            let actual = r.dsp.set_input_rate(rate);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::InputRateChanged {
                rate: actual,
            }));
            Ok(actual)
        })
        .await
    }

    pub async fn get_input_rate(&self) -> Result<f64, FacadeError> {
        self.query("get_input_rate", |r| r.dsp.get_input_rate()).await
    }

    pub async fn set_input_decim(&self, decim: i32) -> Result<i32, FacadeError> {
        self.command("set_input_decim", move |r, hub| {
            let actual = r.dsp.set_input_decim(decim);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::InputDecimChanged {
                decim: actual,
            }));
            Ok(actual)
        })
        .await
    }

    pub async fn get_input_decim(&self) -> Result<i32, FacadeError> {
        self.query("get_input_decim", |r| r.dsp.get_input_decim())
            .await
    }

    pub async fn get_antennas(&self) -> Result<Vec<String>, FacadeError> {
        self.query("get_antennas", |r| r.dsp.get_antennas()).await
    }

    pub async fn get_antenna(&self) -> Result<String, FacadeError> {
        self.query("get_antenna", |r| r.dsp.get_antenna()).await
    }

    pub async fn set_antenna(&self, antenna: String) -> Result<(), FacadeError> {
        self.command("set_antenna", move |r, hub| {
            if r.dsp.get_antenna() == antenna {
                return Ok(());
            }
            r.dsp.set_antenna(&antenna);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::AntennaChanged {
                antenna,
            }));
            Ok(())
        })
        .await
    }

    pub async fn set_rf_freq(&self, freq: f64) -> Result<f64, FacadeError> {
        self.command("set_rf_freq", move |r, hub| {
            let actual = r.dsp.set_rf_freq(freq);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::RfFreqChanged {
                freq: actual,
            }));
            Ok(actual)
        })
        .await
    }

    pub async fn get_rf_freq(&self) -> Result<f64, FacadeError> {
        self.query("get_rf_freq", |r| r.dsp.get_rf_freq()).await
    }

    pub async fn set_iq_swap(&self, enabled: bool) -> Result<(), FacadeError> {
        self.command("set_iq_swap", move |r, hub| {
            if r.dsp.get_iq_swap() == enabled {
                return Ok(());
            }
            r.dsp.set_iq_swap(enabled);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::IqSwapChanged {
                enabled,
            }));
            Ok(())
        })
        .await
    }

    pub async fn get_iq_swap(&self) -> Result<bool, FacadeError> {
        self.query("get_iq_swap", |r| r.dsp.get_iq_swap()).await
    }

    pub async fn set_dc_cancel(&self, enabled: bool) -> Result<(), FacadeError> {
        self.command("set_dc_cancel", move |r, hub| {
            if r.dsp.get_dc_cancel() == enabled {
                return Ok(());
            }
            r.dsp.set_dc_cancel(enabled);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::DcCancelChanged {
                enabled,
            }));
            Ok(())
        })
        .await
    }

    pub async fn get_dc_cancel(&self) -> Result<bool, FacadeError> {
        self.query("get_dc_cancel", |r| r.dsp.get_dc_cancel()).await
    }

    pub async fn set_iq_balance(&self, enabled: bool) -> Result<(), FacadeError> {
        self.command("set_iq_balance", move |r, hub| {
            if r.dsp.get_iq_balance() == enabled {
                return Ok(());
            }
            r.dsp.set_iq_balance(enabled);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::IqBalanceChanged {
                enabled,
            }));
            Ok(())
        })
        .await
    }

    pub async fn get_iq_balance(&self) -> Result<bool, FacadeError> {
        self.query("get_iq_balance", |r| r.dsp.get_iq_balance())
            .await
    }

    pub async fn set_auto_gain(&self, enabled: bool) -> Result<(), FacadeError> {
        self.command("set_auto_gain", move |r, hub| {
            if r.dsp.get_auto_gain() == enabled {
                return Ok(());
            }
            r.dsp.set_auto_gain(enabled);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::AutoGainChanged {
                enabled,
            }));
            Ok(())
        })
        .await
    }

    pub async fn get_auto_gain(&self) -> Result<bool, FacadeError> {
        self.query("get_auto_gain", |r| r.dsp.get_auto_gain()).await
    }

    pub async fn get_gain_stages(&self) -> Result<Vec<GainStage>, FacadeError> {
        self.query("get_gain_stages", |r| r.dsp.get_gain_stages())
            .await
    }

    /// `setGain(name, val)`: `GAIN_NOT_FOUND` if `name` is not among the
    /// device's advertised stages.
    pub async fn set_gain(&self, name: String, value: f64) -> Result<f64, FacadeError> {
        self.command("set_gain", move |r, hub| {
            if !r.dsp.get_gain_stages().iter().any(|s| s.name == name) {
                return Err(FacadeError::GainNotFound { name });
            }
            let actual = r
                .dsp
                .set_gain(&name, value)
                .map_err(|()| FacadeError::GainNotFound { name: name.clone() })?;
            hub.emit(ReceiverEvent::new(ReceiverEventKind::GainChanged {
                name,
                value: actual,
            }));
            Ok(actual)
        })
        .await
    }

    /// `setFreqCorr(ppm)`: clamped to `[-200, 200]` before reaching the DSP
    /// object.
    pub async fn set_freq_corr(&self, ppm: i32) -> Result<i32, FacadeError> {
        self.command("set_freq_corr", move |r, hub| {
            let clamped = ppm.clamp(FREQ_CORR_MIN, FREQ_CORR_MAX);
            let actual = r.dsp.set_freq_corr(clamped);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::FreqCorrChanged {
                ppm: actual,
            }));
            Ok(actual)
        })
        .await
    }

    pub async fn get_freq_corr(&self) -> Result<i32, FacadeError> {
        self.query("get_freq_corr", |r| r.dsp.get_freq_corr()).await
    }

    pub async fn set_iq_fft_size(&self, size: u32) -> Result<u32, FacadeError> {
        self.command("set_iq_fft_size", move |r, hub| {
            let actual = r.dsp.set_iq_fft_size(size);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::FftSizeChanged {
                size: actual,
            }));
            Ok(actual)
        })
        .await
    }

    pub async fn get_iq_fft_size(&self) -> Result<u32, FacadeError> {
        self.query("get_iq_fft_size", |r| r.dsp.get_iq_fft_size())
            .await
    }

    pub async fn set_iq_fft_window(&self, window: WindowType) -> Result<(), FacadeError> {
        self.command("set_iq_fft_window", move |r, hub| {
            if r.dsp.get_iq_fft_window() == window {
                return Ok(());
            }
            r.dsp.set_iq_fft_window(window);
            hub.emit(ReceiverEvent::new(ReceiverEventKind::FftWindowChanged {
                window,
            }));
            Ok(())
        })
        .await
    }

    pub async fn get_iq_fft_window(&self) -> Result<WindowType, FacadeError> {
        self.query("get_iq_fft_window", |r| r.dsp.get_iq_fft_window())
            .await
    }

    /// `getIqFftData(buf, cap)`: `cap` must cover the configured FFT size or
    /// the call fails before touching the DSP object.
    pub async fn get_iq_fft_data(
        &self,
        capacity: usize,
    ) -> Result<(Timestamp, f64, f64, Vec<f32>), FacadeError> {
        self.query("get_iq_fft_data", move |r| {
            let needed = r.dsp.get_iq_fft_size() as usize;
            if capacity < needed {
                return Err(FacadeError::InsufficientBufferSize {
                    given: capacity,
                    needed,
                });
            }
            let mut buf = vec![0f32; needed];
            let (center_freq, sample_rate, filled) = r.dsp.get_iq_fft_data(&mut buf);
            buf.truncate(filled);
            Ok((Timestamp::now(), center_freq, sample_rate, buf))
        })
        .await?
    }

    pub async fn start_iq_recording(&self, path: String) -> Result<(), FacadeError> {
        self.command("start_iq_recording", move |r, hub| {
            if r.dsp.is_iq_recording() {
                return Err(FacadeError::AlreadyRecording);
            }
            r.dsp
                .start_iq_recording(&path)
                .map_err(|source| FacadeError::CouldntCreateFile {
                    path: path.clone().into(),
                    source,
                })?;
            hub.emit(ReceiverEvent::new(ReceiverEventKind::IqRecordingStarted {
                path,
            }));
            Ok(())
        })
        .await
    }

    pub async fn stop_iq_recording(&self) -> Result<(), FacadeError> {
        self.command("stop_iq_recording", move |r, hub| {
            if !r.dsp.is_iq_recording() {
                return Err(FacadeError::AlreadyNotRecording);
            }
            r.dsp.stop_iq_recording();
            hub.emit(ReceiverEvent::new(ReceiverEventKind::IqRecordingStopped));
            Ok(())
        })
        .await
    }

    pub async fn is_iq_recording(&self) -> Result<bool, FacadeError> {
        self.query("is_iq_recording", |r| r.dsp.is_iq_recording())
            .await
    }

    /// `addVfoChannel`: default shadow state per its construction values
    /// (applied by [`crate::vfo::ShadowState::default`]).
    pub async fn add_vfo_channel(&self) -> Result<Vfo, FacadeError> {
        let worker = self.worker.clone();
        let running = self.running.clone();
        self.command("add_vfo_channel", move |r, hub| {
            let dsp_channel = r.dsp.add_vfo_channel();
            let handle = r.next_handle;
            r.next_handle += 1;
            let vfo = Vfo::new(handle, worker.clone(), dsp_channel, running.clone());
            r.vfos.insert(handle, vfo.clone());
            hub.emit(ReceiverEvent::new(ReceiverEventKind::VfoAdded { handle }));
            Ok(vfo)
        })
        .await
    }

    /// `removeVfoChannel(ref)`. Disconnecting the VFO's own
    /// subscribers is left to the transport layer that owns their
    /// connections (ADDED simplification: the in-process broadcast hub has
    /// no way to force-drop a remote subscriber's handle); this façade's
    /// contract is to emit `VfoRemoved` and seal the handle.
    pub async fn remove_vfo_channel(&self, handle: u64) -> Result<(), FacadeError> {
        self.command("remove_vfo_channel", move |r, hub| {
            let vfo = r
                .vfos
                .remove(&handle)
                .ok_or(FacadeError::VfoNotFound { handle })?;
            vfo.with_dsp_mut(|channel| r.dsp.remove_vfo_channel(channel));
            vfo.mark_removed();
            vfo.hub()
                .emit(VfoEvent::new(handle, VfoEventKind::VfoRemoved));
            hub.emit(ReceiverEvent::new(ReceiverEventKind::VfoRemoved { handle }));
            Ok(())
        })
        .await
    }

    pub async fn get_vfo(&self, handle: u64) -> Result<Vfo, FacadeError> {
        self.query("get_vfo", move |r| r.vfos.get(&handle).cloned())
            .await?
            .ok_or(FacadeError::VfoNotFound { handle })
    }

    pub async fn vfo_handles(&self) -> Result<Vec<u64>, FacadeError> {
        self.query("vfo_handles", |r| {
            let mut handles: Vec<u64> = r.vfos.keys().copied().collect();
            handles.sort_unstable();
            handles
        })
        .await
    }

    /// Subscribe protocol, receiver scope: identical shape to the VFO one
    /// but larger — covers every scalar parameter, the running
    /// state, IQ recording, and one `VfoAdded` per currently attached VFO.
    pub async fn subscribe(&self) -> Result<SubscriberHandle<ReceiverEvent>, FacadeError> {
        if self.worker.is_paused() {
            return Err(FacadeError::WorkerBusy);
        }
        let (tx, rx) = oneshot::channel();
        let inner = self.inner.clone();
        let hub = self.hub.clone();
        let running = self.running.clone();
        self.worker.submit("subscribe", move || {
            let guard = inner.lock().unwrap();
            let mut sub = hub.subscribe();
            sub.prime(build_replay(&guard, running.load(Ordering::Acquire)));
            let _ = tx.send(sub);
        })?;
        Ok(rx.await.map_err(|_| FacadeError::WorkerBusy)?)
    }
}

fn build_replay(inner: &ReceiverInner, running: bool) -> Vec<ReceiverEvent> {
    let synth = |kind: ReceiverEventKind| ReceiverEvent::synthetic(kind);
    let mut replay = vec![
        synth(ReceiverEventKind::SyncStart),
        synth(ReceiverEventKind::InputDeviceChanged {
            device: inner.dsp.current_input_device(),
        }),
        synth(ReceiverEventKind::AntennasChanged {
            antennas: inner.dsp.get_antennas(),
        }),
        synth(ReceiverEventKind::AntennaChanged {
            antenna: inner.dsp.get_antenna(),
        }),
        synth(ReceiverEventKind::InputRateChanged {
            rate: inner.dsp.get_input_rate(),
        }),
        synth(ReceiverEventKind::InputDecimChanged {
            decim: inner.dsp.get_input_decim(),
        }),
        synth(ReceiverEventKind::DcCancelChanged {
            enabled: inner.dsp.get_dc_cancel(),
        }),
        synth(ReceiverEventKind::IqBalanceChanged {
            enabled: inner.dsp.get_iq_balance(),
        }),
        synth(ReceiverEventKind::IqSwapChanged {
            enabled: inner.dsp.get_iq_swap(),
        }),
        synth(ReceiverEventKind::RfFreqChanged {
            freq: inner.dsp.get_rf_freq(),
        }),
        synth(ReceiverEventKind::GainStagesChanged {
            stages: inner.dsp.get_gain_stages(),
        }),
        synth(ReceiverEventKind::AutoGainChanged {
            enabled: inner.dsp.get_auto_gain(),
        }),
        synth(ReceiverEventKind::FreqCorrChanged {
            ppm: inner.dsp.get_freq_corr(),
        }),
        synth(ReceiverEventKind::FftSizeChanged {
            size: inner.dsp.get_iq_fft_size(),
        }),
        synth(ReceiverEventKind::FftWindowChanged {
            window: inner.dsp.get_iq_fft_window(),
        }),
        synth(if running {
            ReceiverEventKind::Started
        } else {
            ReceiverEventKind::Stopped
        }),
    ];
    if let Some(path) = inner.dsp.get_iq_filename() {
        replay.push(synth(ReceiverEventKind::IqRecordingStarted { path }));
    }
    let mut handles: Vec<u64> = inner.vfos.keys().copied().collect();
    handles.sort_unstable();
    for handle in handles {
        replay.push(synth(ReceiverEventKind::VfoAdded { handle }));
    }
    replay.push(synth(ReceiverEventKind::SyncEnd));
    replay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeDspReceiver;
    use crate::types::Demod;
    use pretty_assertions::assert_eq;

    fn make_receiver() -> Receiver {
        Receiver::new(Box::new(FakeDspReceiver::new()))
    }

    #[tokio::test]
    async fn fresh_start_add_vfo_set_demod_start() {
        let r = make_receiver();
        let mut sub = r.subscribe().await.unwrap();
        while sub.recv().await.unwrap().kind != ReceiverEventKind::SyncEnd {}

        let vfo = r.add_vfo_channel().await.unwrap();
        assert_eq!(sub.recv().await.unwrap().kind, ReceiverEventKind::VfoAdded {
            handle: vfo.handle()
        });

        vfo.set_demod(Demod::WfmMono).await.unwrap();
        r.start().await.unwrap();

        assert!(r.is_running());
        r.shutdown();
    }

    #[tokio::test]
    async fn set_gain_rejects_unknown_stage() {
        let r = make_receiver();
        let err = r.set_gain("XYZ".into(), 10.0).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::GainNotFound);
        r.shutdown();
    }

    #[tokio::test]
    async fn set_freq_corr_clamps_to_range() {
        let r = make_receiver();
        let actual = r.set_freq_corr(300).await.unwrap();
        assert_eq!(actual, 200);
        assert_eq!(r.get_freq_corr().await.unwrap(), 200);
        r.shutdown();
    }

    #[tokio::test]
    async fn invalid_input_device_falls_back_and_still_errors() {
        let r = Receiver::new(Box::new(FakeDspReceiver::new().fail_on_device("bogus")));
        let err = r.set_input_device("bogus".into()).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInputDevice);
        assert_eq!(r.current_input_device().await.unwrap(), "null");
        r.shutdown();
    }

    #[tokio::test]
    async fn remove_vfo_then_command_reports_not_found() {
        let r = make_receiver();
        let vfo = r.add_vfo_channel().await.unwrap();
        r.remove_vfo_channel(vfo.handle()).await.unwrap();

        let err = vfo.get_demod().await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::VfoNotFound);
        assert!(r.remove_vfo_channel(vfo.handle()).await.is_err());
        r.shutdown();
    }

    #[tokio::test]
    async fn insufficient_fft_buffer_is_rejected() {
        let r = make_receiver();
        let err = r.get_iq_fft_data(0).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InsufficientBufferSize);
        r.shutdown();
    }
}
