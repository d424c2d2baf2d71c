//! gRPC client mirroring the `Receiver`/`Vfo` façade API. Every method
//! dispatches one unary call through [`ClientCallPool`] bookkeeping and
//! folds the reply's embedded `ErrorCode` into [`RpcError`].

use std::future::Future;

use tonic::transport::Channel;
use tonic::{Response, Status, Streaming};

use crate::client_call::ClientCallPool;
use crate::convert;
use crate::error::RpcError;
use crate::proto;
use crate::proto::receiver_client::ReceiverClient as RawClient;

fn check(error: i32) -> Result<(), RpcError> {
    let code = proto::ErrorCode::try_from(error).unwrap_or(proto::ErrorCode::UnknownError);
    if code == proto::ErrorCode::Ok {
        Ok(())
    } else {
        Err(RpcError::App(convert::error_kind_from_proto(code)))
    }
}

#[derive(Clone)]
pub struct ReceiverClient {
    inner: RawClient<Channel>,
    calls: ClientCallPool,
}

impl ReceiverClient {
    pub async fn connect(addr: impl Into<String>) -> Result<Self, RpcError> {
        let endpoint = tonic::transport::Endpoint::from_shared(addr.into())?;
        let channel = endpoint.connect().await?;
        Ok(Self {
            inner: RawClient::new(channel),
            calls: ClientCallPool::new(),
        })
    }

    pub fn inflight_calls(&self) -> usize {
        self.calls.inflight_count()
    }

    async fn call<T>(
        &self,
        name: &'static str,
        fut: impl Future<Output = Result<Response<T>, Status>>,
    ) -> Result<T, RpcError> {
        let _guard = self.calls.begin(name);
        tracing::debug!(name, "rpc call dispatched");
        match fut.await {
            Ok(resp) => {
                tracing::debug!(name, "rpc call completed");
                Ok(resp.into_inner())
            }
            Err(status) => {
                let err = RpcError::from(status);
                tracing::warn!(name, error = %err, "rpc call failed");
                Err(err)
            }
        }
    }

    pub async fn start(&self) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self.call("start", c.start(proto::Empty {})).await?;
        check(reply.error)
    }

    pub async fn stop(&self) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self.call("stop", c.stop(proto::Empty {})).await?;
        check(reply.error)
    }

    pub async fn is_running(&self) -> Result<bool, RpcError> {
        let mut c = self.inner.clone();
        let reply = self.call("is_running", c.is_running(proto::Empty {})).await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_input_device(&self, device: String) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "set_input_device",
                c.set_input_device(proto::SetInputDeviceRequest { device }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn get_input_device(&self) -> Result<String, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_input_device", c.get_input_device(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_input_rate(&self, rate: f64) -> Result<f64, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "set_input_rate",
                c.set_input_rate(proto::SetInputRateRequest { rate }),
            )
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn get_input_rate(&self) -> Result<f64, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_input_rate", c.get_input_rate(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_input_decim(&self, decim: i32) -> Result<i32, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "set_input_decim",
                c.set_input_decim(proto::SetInputDecimRequest { decim }),
            )
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn get_input_decim(&self) -> Result<i32, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_input_decim", c.get_input_decim(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn get_antennas(&self) -> Result<Vec<String>, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_antennas", c.get_antennas(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.values)
    }

    pub async fn get_antenna(&self) -> Result<String, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_antenna", c.get_antenna(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_antenna(&self, antenna: String) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "set_antenna",
                c.set_antenna(proto::SetAntennaRequest { antenna }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn set_rf_freq(&self, freq: f64) -> Result<f64, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("set_rf_freq", c.set_rf_freq(proto::SetRfFreqRequest { freq }))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn get_rf_freq(&self) -> Result<f64, RpcError> {
        let mut c = self.inner.clone();
        let reply = self.call("get_rf_freq", c.get_rf_freq(proto::Empty {})).await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_iq_swap(&self, enabled: bool) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("set_iq_swap", c.set_iq_swap(proto::SetBoolRequest { enabled }))
            .await?;
        check(reply.error)
    }

    pub async fn get_iq_swap(&self) -> Result<bool, RpcError> {
        let mut c = self.inner.clone();
        let reply = self.call("get_iq_swap", c.get_iq_swap(proto::Empty {})).await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_dc_cancel(&self, enabled: bool) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "set_dc_cancel",
                c.set_dc_cancel(proto::SetBoolRequest { enabled }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn get_dc_cancel(&self) -> Result<bool, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_dc_cancel", c.get_dc_cancel(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_iq_balance(&self, enabled: bool) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "set_iq_balance",
                c.set_iq_balance(proto::SetBoolRequest { enabled }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn get_iq_balance(&self) -> Result<bool, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_iq_balance", c.get_iq_balance(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_auto_gain(&self, enabled: bool) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "set_auto_gain",
                c.set_auto_gain(proto::SetBoolRequest { enabled }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn get_auto_gain(&self) -> Result<bool, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_auto_gain", c.get_auto_gain(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn get_gain_stages(&self) -> Result<Vec<proto::GainStage>, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_gain_stages", c.get_gain_stages(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.stages)
    }

    pub async fn set_gain(&self, name: String, value: f64) -> Result<f64, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("set_gain", c.set_gain(proto::SetGainRequest { name, value }))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_freq_corr(&self, ppm: i32) -> Result<i32, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "set_freq_corr",
                c.set_freq_corr(proto::SetFreqCorrRequest { ppm }),
            )
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn get_freq_corr(&self) -> Result<i32, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_freq_corr", c.get_freq_corr(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_iq_fft_size(&self, size: u32) -> Result<u32, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "set_iq_fft_size",
                c.set_iq_fft_size(proto::SetFftSizeRequest { size }),
            )
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn get_iq_fft_size(&self) -> Result<u32, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_iq_fft_size", c.get_iq_fft_size(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn set_iq_fft_window(
        &self,
        window: receiver_core::types::WindowType,
    ) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "set_iq_fft_window",
                c.set_iq_fft_window(proto::SetFftWindowRequest {
                    window: convert::window_to_proto(window) as i32,
                }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn get_iq_fft_window(&self) -> Result<receiver_core::types::WindowType, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("get_iq_fft_window", c.get_iq_fft_window(proto::Empty {}))
            .await?;
        check(reply.error)?;
        let window = proto::WindowType::try_from(reply.window)
            .map(convert::window_from_proto)
            .unwrap_or(receiver_core::types::WindowType::Hann);
        Ok(window)
    }

    pub async fn get_iq_fft_data(
        &self,
        capacity: u64,
    ) -> Result<(receiver_core::types::Timestamp, f64, f64, Vec<f32>), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "get_iq_fft_data",
                c.get_iq_fft_data(proto::GetIqFftDataRequest { capacity }),
            )
            .await?;
        check(reply.error)?;
        let timestamp = receiver_core::types::Timestamp {
            seconds: reply.timestamp_seconds.max(0) as u64,
            nanos: reply.timestamp_nanos,
        };
        Ok((timestamp, reply.center_freq, reply.sample_rate, reply.samples))
    }

    pub async fn start_iq_recording(&self, path: String) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "start_iq_recording",
                c.start_iq_recording(proto::StartIqRecordingRequest { path }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn stop_iq_recording(&self) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("stop_iq_recording", c.stop_iq_recording(proto::Empty {}))
            .await?;
        check(reply.error)
    }

    pub async fn is_iq_recording(&self) -> Result<bool, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("is_iq_recording", c.is_iq_recording(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.value)
    }

    pub async fn add_vfo_channel(&self) -> Result<u64, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call("add_vfo_channel", c.add_vfo_channel(proto::Empty {}))
            .await?;
        check(reply.error)?;
        Ok(reply.handle)
    }

    pub async fn remove_vfo_channel(&self, handle: u64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "remove_vfo_channel",
                c.remove_vfo_channel(proto::VfoHandle { handle }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_filter_offset(&self, handle: u64, offset: i64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_filter_offset",
                c.vfo_set_filter_offset(proto::VfoOffsetRequest { handle, offset }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_cw_offset(&self, handle: u64, offset: i64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_cw_offset",
                c.vfo_set_cw_offset(proto::VfoOffsetRequest { handle, offset }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_filter(
        &self,
        handle: u64,
        low: i64,
        high: i64,
        shape: receiver_core::types::FilterShape,
    ) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_filter",
                c.vfo_set_filter(proto::VfoFilterRequest {
                    handle,
                    low,
                    high,
                    shape: convert::filter_shape_to_proto(shape) as i32,
                }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_demod(
        &self,
        handle: u64,
        demod: receiver_core::types::Demod,
    ) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_demod",
                c.vfo_set_demod(proto::VfoDemodRequest {
                    handle,
                    demod: convert::demod_to_proto(demod) as i32,
                }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_sql_level(&self, handle: u64, value: f64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_sql_level",
                c.vfo_set_sql_level(proto::VfoDoubleRequest { handle, value }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_sql_alpha(&self, handle: u64, value: f64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_sql_alpha",
                c.vfo_set_sql_alpha(proto::VfoDoubleRequest { handle, value }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_agc_on(&self, handle: u64, enabled: bool) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_agc_on",
                c.vfo_set_agc_on(proto::VfoBoolRequest { handle, enabled }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_agc_hang(&self, handle: u64, enabled: bool) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_agc_hang",
                c.vfo_set_agc_hang(proto::VfoBoolRequest { handle, enabled }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_agc_threshold(&self, handle: u64, value: i32) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_agc_threshold",
                c.vfo_set_agc_threshold(proto::VfoInt32Request { handle, value }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_agc_slope(&self, handle: u64, value: i32) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_agc_slope",
                c.vfo_set_agc_slope(proto::VfoInt32Request { handle, value }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_agc_decay(&self, handle: u64, value: i32) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_agc_decay",
                c.vfo_set_agc_decay(proto::VfoInt32Request { handle, value }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_agc_manual_gain(&self, handle: u64, value: i32) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_agc_manual_gain",
                c.vfo_set_agc_manual_gain(proto::VfoInt32Request { handle, value }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_nb_on(
        &self,
        handle: u64,
        id: receiver_core::types::NoiseBlankerId,
        enabled: bool,
    ) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_nb_on",
                c.vfo_set_nb_on(proto::VfoNbRequest {
                    handle,
                    id: convert::nb_id_to_proto(id) as i32,
                    enabled,
                }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_nb_threshold(
        &self,
        handle: u64,
        id: receiver_core::types::NoiseBlankerId,
        threshold: f32,
    ) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_nb_threshold",
                c.vfo_set_nb_threshold(proto::VfoNbThresholdRequest {
                    handle,
                    id: convert::nb_id_to_proto(id) as i32,
                    threshold,
                }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_fm_max_dev(&self, handle: u64, value: f32) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_fm_max_dev",
                c.vfo_set_fm_max_dev(proto::VfoFloatRequest { handle, value }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_fm_deemph(&self, handle: u64, value: f64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_fm_deemph",
                c.vfo_set_fm_deemph(proto::VfoDoubleRequest { handle, value }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_am_dcr(&self, handle: u64, enabled: bool) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_am_dcr",
                c.vfo_set_am_dcr(proto::VfoBoolRequest { handle, enabled }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_am_sync_dcr(&self, handle: u64, enabled: bool) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_am_sync_dcr",
                c.vfo_set_am_sync_dcr(proto::VfoBoolRequest { handle, enabled }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_am_sync_pll_bw(&self, handle: u64, value: f32) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_am_sync_pll_bw",
                c.vfo_set_am_sync_pll_bw(proto::VfoFloatRequest { handle, value }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_set_audio_gain(&self, handle: u64, value: f64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_set_audio_gain",
                c.vfo_set_audio_gain(proto::VfoDoubleRequest { handle, value }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_start_audio_recording(
        &self,
        handle: u64,
        path: String,
    ) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_start_audio_recording",
                c.vfo_start_audio_recording(proto::VfoPathRequest { handle, path }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_stop_audio_recording(&self, handle: u64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_stop_audio_recording",
                c.vfo_stop_audio_recording(proto::VfoHandle { handle }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_start_sniffer(&self, handle: u64, rate: u32, size: u32) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_start_sniffer",
                c.vfo_start_sniffer(proto::VfoSnifferRequest { handle, rate, size }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_stop_sniffer(&self, handle: u64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_stop_sniffer",
                c.vfo_stop_sniffer(proto::VfoHandle { handle }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_get_sniffer_data(
        &self,
        handle: u64,
        capacity: u64,
    ) -> Result<Vec<f32>, RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_get_sniffer_data",
                c.vfo_get_sniffer_data(proto::VfoSnifferDataRequest { handle, capacity }),
            )
            .await?;
        check(reply.error)?;
        Ok(reply.samples)
    }

    pub async fn vfo_start_udp_streaming(
        &self,
        handle: u64,
        host: String,
        port: u16,
        stereo: bool,
    ) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_start_udp_streaming",
                c.vfo_start_udp_streaming(proto::VfoUdpRequest {
                    handle,
                    host,
                    port: port as u32,
                    stereo,
                }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_stop_udp_streaming(&self, handle: u64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_stop_udp_streaming",
                c.vfo_stop_udp_streaming(proto::VfoHandle { handle }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_start_rds_decoder(&self, handle: u64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_start_rds_decoder",
                c.vfo_start_rds_decoder(proto::VfoHandle { handle }),
            )
            .await?;
        check(reply.error)
    }

    pub async fn vfo_stop_rds_decoder(&self, handle: u64) -> Result<(), RpcError> {
        let mut c = self.inner.clone();
        let reply = self
            .call(
                "vfo_stop_rds_decoder",
                c.vfo_stop_rds_decoder(proto::VfoHandle { handle }),
            )
            .await?;
        check(reply.error)
    }

    /// Opens the `Subscribe` stream. Kept raw (undecoded) here; [`crate::reactor::EventReactor`]
    /// is the decoded, callback-driven consumer most callers want.
    pub async fn subscribe_raw(&self, sync_only: bool) -> Result<Streaming<proto::Event>, RpcError> {
        let mut c = self.inner.clone();
        let resp = c
            .subscribe(proto::SubscribeRequest { sync_only })
            .await
            .map_err(RpcError::from)?;
        Ok(resp.into_inner())
    }
}
