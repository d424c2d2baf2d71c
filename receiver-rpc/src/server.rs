//! gRPC server: projects every `Receiver`/`Vfo` façade method onto one
//! `proto::receiver_server::Receiver` unary handler, plus the `Subscribe`
//! stream multiplexer.
//!
//! Business-level failures (`GAIN_NOT_FOUND`, `VFO_NOT_FOUND`, …) are carried
//! in each reply's `error` field rather than as a non-OK gRPC status — a
//! caller that mishandles an app error still gets a well-typed reply instead
//! of a generic transport fault.

use std::collections::HashMap;
use std::pin::Pin;

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

use receiver_core::error::FacadeError;
use receiver_core::event::{ReceiverEventKind, VfoEvent};
use receiver_core::hub::SubscriberHandle;
use receiver_core::Receiver as CoreReceiver;

use crate::convert;
use crate::proto;
use crate::proto::receiver_server::Receiver as ReceiverRpc;

/// Bounded capacity of the outbound event channel backing every `Subscribe`
/// call. A subscriber this far behind the multiplexer starts blocking
/// `hub.emit` on the worker thread, so keep it generous.
const SUBSCRIBE_CHANNEL_CAPACITY: usize = 1_024;

pub struct ReceiverService {
    receiver: CoreReceiver,
}

impl ReceiverService {
    pub fn new(receiver: CoreReceiver) -> Self {
        Self { receiver }
    }
}

fn reply(result: Result<(), FacadeError>) -> proto::Reply {
    proto::Reply {
        error: match result {
            Ok(()) => proto::ErrorCode::Ok as i32,
            Err(e) => convert::error_kind_to_proto(e.kind()) as i32,
        },
    }
}

fn double_reply(result: Result<f64, FacadeError>) -> proto::DoubleReply {
    match result {
        Ok(value) => proto::DoubleReply {
            error: proto::ErrorCode::Ok as i32,
            value,
        },
        Err(e) => proto::DoubleReply {
            error: convert::error_kind_to_proto(e.kind()) as i32,
            value: 0.0,
        },
    }
}

fn int32_reply(result: Result<i32, FacadeError>) -> proto::Int32Reply {
    match result {
        Ok(value) => proto::Int32Reply {
            error: proto::ErrorCode::Ok as i32,
            value,
        },
        Err(e) => proto::Int32Reply {
            error: convert::error_kind_to_proto(e.kind()) as i32,
            value: 0,
        },
    }
}

fn uint32_reply(result: Result<u32, FacadeError>) -> proto::Uint32Reply {
    match result {
        Ok(value) => proto::Uint32Reply {
            error: proto::ErrorCode::Ok as i32,
            value,
        },
        Err(e) => proto::Uint32Reply {
            error: convert::error_kind_to_proto(e.kind()) as i32,
            value: 0,
        },
    }
}

fn bool_reply(result: Result<bool, FacadeError>) -> proto::BoolReply {
    match result {
        Ok(value) => proto::BoolReply {
            error: proto::ErrorCode::Ok as i32,
            value,
        },
        Err(e) => proto::BoolReply {
            error: convert::error_kind_to_proto(e.kind()) as i32,
            value: false,
        },
    }
}

fn string_reply(result: Result<String, FacadeError>) -> proto::StringReply {
    match result {
        Ok(value) => proto::StringReply {
            error: proto::ErrorCode::Ok as i32,
            value,
        },
        Err(e) => proto::StringReply {
            error: convert::error_kind_to_proto(e.kind()) as i32,
            value: String::new(),
        },
    }
}

fn string_list_reply(result: Result<Vec<String>, FacadeError>) -> proto::StringListReply {
    match result {
        Ok(values) => proto::StringListReply {
            error: proto::ErrorCode::Ok as i32,
            values,
        },
        Err(e) => proto::StringListReply {
            error: convert::error_kind_to_proto(e.kind()) as i32,
            values: Vec::new(),
        },
    }
}

fn gain_stages_reply(
    result: Result<Vec<receiver_core::types::GainStage>, FacadeError>,
) -> proto::GainStagesReply {
    match result {
        Ok(stages) => proto::GainStagesReply {
            error: proto::ErrorCode::Ok as i32,
            stages: stages.iter().map(convert::gain_stage_to_proto).collect(),
        },
        Err(e) => proto::GainStagesReply {
            error: convert::error_kind_to_proto(e.kind()) as i32,
            stages: Vec::new(),
        },
    }
}

fn vfo_handle_reply(result: Result<u64, FacadeError>) -> proto::VfoHandleReply {
    match result {
        Ok(handle) => proto::VfoHandleReply {
            error: proto::ErrorCode::Ok as i32,
            handle,
        },
        Err(e) => proto::VfoHandleReply {
            error: convert::error_kind_to_proto(e.kind()) as i32,
            handle: 0,
        },
    }
}

async fn forward_vfo_events(
    mut sub: SubscriberHandle<VfoEvent>,
    tx: mpsc::Sender<Result<proto::Event, Status>>,
) {
    while let Ok(ev) = sub.recv().await {
        if tx.send(Ok(convert::vfo_event_to_proto(&ev))).await.is_err() {
            break;
        }
    }
}

#[tonic::async_trait]
impl ReceiverRpc for ReceiverService {
    async fn start(&self, _: Request<proto::Empty>) -> Result<Response<proto::Reply>, Status> {
        Ok(Response::new(reply(self.receiver.start().await)))
    }

    async fn stop(&self, _: Request<proto::Empty>) -> Result<Response<proto::Reply>, Status> {
        Ok(Response::new(reply(self.receiver.stop().await)))
    }

    async fn is_running(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::BoolReply>, Status> {
        Ok(Response::new(proto::BoolReply {
            error: proto::ErrorCode::Ok as i32,
            value: self.receiver.is_running(),
        }))
    }

    async fn set_input_device(
        &self,
        request: Request<proto::SetInputDeviceRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let device = request.into_inner().device;
        Ok(Response::new(reply(
            self.receiver.set_input_device(device).await,
        )))
    }

    async fn get_input_device(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::StringReply>, Status> {
        Ok(Response::new(string_reply(
            self.receiver.current_input_device().await,
        )))
    }

    async fn set_input_rate(
        &self,
        request: Request<proto::SetInputRateRequest>,
    ) -> Result<Response<proto::DoubleReply>, Status> {
        let rate = request.into_inner().rate;
        Ok(Response::new(double_reply(
            self.receiver.set_input_rate(rate).await,
        )))
    }

    async fn get_input_rate(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::DoubleReply>, Status> {
        Ok(Response::new(double_reply(
            self.receiver.get_input_rate().await,
        )))
    }

    async fn set_input_decim(
        &self,
        request: Request<proto::SetInputDecimRequest>,
    ) -> Result<Response<proto::Int32Reply>, Status> {
        let decim = request.into_inner().decim;
        Ok(Response::new(int32_reply(
            self.receiver.set_input_decim(decim).await,
        )))
    }

    async fn get_input_decim(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::Int32Reply>, Status> {
        Ok(Response::new(int32_reply(
            self.receiver.get_input_decim().await,
        )))
    }

    async fn get_antennas(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::StringListReply>, Status> {
        Ok(Response::new(string_list_reply(
            self.receiver.get_antennas().await,
        )))
    }

    async fn get_antenna(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::StringReply>, Status> {
        Ok(Response::new(string_reply(self.receiver.get_antenna().await)))
    }

    async fn set_antenna(
        &self,
        request: Request<proto::SetAntennaRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let antenna = request.into_inner().antenna;
        Ok(Response::new(reply(
            self.receiver.set_antenna(antenna).await,
        )))
    }

    async fn set_rf_freq(
        &self,
        request: Request<proto::SetRfFreqRequest>,
    ) -> Result<Response<proto::DoubleReply>, Status> {
        let freq = request.into_inner().freq;
        Ok(Response::new(double_reply(
            self.receiver.set_rf_freq(freq).await,
        )))
    }

    async fn get_rf_freq(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::DoubleReply>, Status> {
        Ok(Response::new(double_reply(self.receiver.get_rf_freq().await)))
    }

    async fn set_iq_swap(
        &self,
        request: Request<proto::SetBoolRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let enabled = request.into_inner().enabled;
        Ok(Response::new(reply(self.receiver.set_iq_swap(enabled).await)))
    }

    async fn get_iq_swap(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::BoolReply>, Status> {
        Ok(Response::new(bool_reply(self.receiver.get_iq_swap().await)))
    }

    async fn set_dc_cancel(
        &self,
        request: Request<proto::SetBoolRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let enabled = request.into_inner().enabled;
        Ok(Response::new(reply(
            self.receiver.set_dc_cancel(enabled).await,
        )))
    }

    async fn get_dc_cancel(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::BoolReply>, Status> {
        Ok(Response::new(bool_reply(self.receiver.get_dc_cancel().await)))
    }

    async fn set_iq_balance(
        &self,
        request: Request<proto::SetBoolRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let enabled = request.into_inner().enabled;
        Ok(Response::new(reply(
            self.receiver.set_iq_balance(enabled).await,
        )))
    }

    async fn get_iq_balance(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::BoolReply>, Status> {
        Ok(Response::new(bool_reply(
            self.receiver.get_iq_balance().await,
        )))
    }

    async fn set_auto_gain(
        &self,
        request: Request<proto::SetBoolRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let enabled = request.into_inner().enabled;
        Ok(Response::new(reply(
            self.receiver.set_auto_gain(enabled).await,
        )))
    }

    async fn get_auto_gain(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::BoolReply>, Status> {
        Ok(Response::new(bool_reply(
            self.receiver.get_auto_gain().await,
        )))
    }

    async fn get_gain_stages(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::GainStagesReply>, Status> {
        Ok(Response::new(gain_stages_reply(
            self.receiver.get_gain_stages().await,
        )))
    }

    async fn set_gain(
        &self,
        request: Request<proto::SetGainRequest>,
    ) -> Result<Response<proto::DoubleReply>, Status> {
        let req = request.into_inner();
        Ok(Response::new(double_reply(
            self.receiver.set_gain(req.name, req.value).await,
        )))
    }

    async fn set_freq_corr(
        &self,
        request: Request<proto::SetFreqCorrRequest>,
    ) -> Result<Response<proto::Int32Reply>, Status> {
        let ppm = request.into_inner().ppm;
        Ok(Response::new(int32_reply(
            self.receiver.set_freq_corr(ppm).await,
        )))
    }

    async fn get_freq_corr(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::Int32Reply>, Status> {
        Ok(Response::new(int32_reply(
            self.receiver.get_freq_corr().await,
        )))
    }

    async fn set_iq_fft_size(
        &self,
        request: Request<proto::SetFftSizeRequest>,
    ) -> Result<Response<proto::Uint32Reply>, Status> {
        let size = request.into_inner().size;
        Ok(Response::new(uint32_reply(
            self.receiver.set_iq_fft_size(size).await,
        )))
    }

    async fn get_iq_fft_size(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::Uint32Reply>, Status> {
        Ok(Response::new(uint32_reply(
            self.receiver.get_iq_fft_size().await,
        )))
    }

    async fn set_iq_fft_window(
        &self,
        request: Request<proto::SetFftWindowRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let window = proto::WindowType::try_from(request.into_inner().window)
            .map(convert::window_from_proto)
            .unwrap_or(receiver_core::types::WindowType::Hann);
        Ok(Response::new(reply(
            self.receiver.set_iq_fft_window(window).await,
        )))
    }

    async fn get_iq_fft_window(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::FftWindowReply>, Status> {
        let reply = match self.receiver.get_iq_fft_window().await {
            Ok(window) => proto::FftWindowReply {
                error: proto::ErrorCode::Ok as i32,
                window: convert::window_to_proto(window) as i32,
            },
            Err(e) => proto::FftWindowReply {
                error: convert::error_kind_to_proto(e.kind()) as i32,
                window: proto::WindowType::Hann as i32,
            },
        };
        Ok(Response::new(reply))
    }

    async fn get_iq_fft_data(
        &self,
        request: Request<proto::GetIqFftDataRequest>,
    ) -> Result<Response<proto::GetIqFftDataReply>, Status> {
        let capacity = request.into_inner().capacity as usize;
        let reply = match self.receiver.get_iq_fft_data(capacity).await {
            Ok((ts, center_freq, sample_rate, samples)) => proto::GetIqFftDataReply {
                error: proto::ErrorCode::Ok as i32,
                timestamp_seconds: ts.seconds as i64,
                timestamp_nanos: ts.nanos,
                center_freq,
                sample_rate,
                samples,
            },
            Err(e) => proto::GetIqFftDataReply {
                error: convert::error_kind_to_proto(e.kind()) as i32,
                timestamp_seconds: 0,
                timestamp_nanos: 0,
                center_freq: 0.0,
                sample_rate: 0.0,
                samples: Vec::new(),
            },
        };
        Ok(Response::new(reply))
    }

    async fn start_iq_recording(
        &self,
        request: Request<proto::StartIqRecordingRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let path = request.into_inner().path;
        Ok(Response::new(reply(
            self.receiver.start_iq_recording(path).await,
        )))
    }

    async fn stop_iq_recording(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::Reply>, Status> {
        Ok(Response::new(reply(self.receiver.stop_iq_recording().await)))
    }

    async fn is_iq_recording(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::BoolReply>, Status> {
        Ok(Response::new(bool_reply(
            self.receiver.is_iq_recording().await,
        )))
    }

    async fn add_vfo_channel(
        &self,
        _: Request<proto::Empty>,
    ) -> Result<Response<proto::VfoHandleReply>, Status> {
        let result = self.receiver.add_vfo_channel().await.map(|v| v.handle());
        Ok(Response::new(vfo_handle_reply(result)))
    }

    async fn remove_vfo_channel(
        &self,
        request: Request<proto::VfoHandle>,
    ) -> Result<Response<proto::Reply>, Status> {
        let handle = request.into_inner().handle;
        Ok(Response::new(reply(
            self.receiver.remove_vfo_channel(handle).await,
        )))
    }

    async fn vfo_set_filter_offset(
        &self,
        request: Request<proto::VfoOffsetRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_filter_offset(req.offset).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_cw_offset(
        &self,
        request: Request<proto::VfoOffsetRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_cw_offset(req.offset).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_filter(
        &self,
        request: Request<proto::VfoFilterRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let shape = proto::FilterShape::try_from(req.shape)
            .map(convert::filter_shape_from_proto)
            .unwrap_or(receiver_core::types::FilterShape::Normal);
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_filter(req.low, req.high, shape).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_demod(
        &self,
        request: Request<proto::VfoDemodRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let demod = proto::Demod::try_from(req.demod)
            .map(convert::demod_from_proto)
            .unwrap_or(receiver_core::types::Demod::Off);
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_demod(demod).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_sql_level(
        &self,
        request: Request<proto::VfoDoubleRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_sql_level(req.value).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_sql_alpha(
        &self,
        request: Request<proto::VfoDoubleRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_sql_alpha(req.value).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_agc_on(
        &self,
        request: Request<proto::VfoBoolRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_agc_on(req.enabled).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_agc_hang(
        &self,
        request: Request<proto::VfoBoolRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_agc_hang(req.enabled).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_agc_threshold(
        &self,
        request: Request<proto::VfoInt32Request>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_agc_threshold(req.value).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_agc_slope(
        &self,
        request: Request<proto::VfoInt32Request>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_agc_slope(req.value).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_agc_decay(
        &self,
        request: Request<proto::VfoInt32Request>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_agc_decay(req.value).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_agc_manual_gain(
        &self,
        request: Request<proto::VfoInt32Request>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_agc_manual_gain(req.value).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_nb_on(
        &self,
        request: Request<proto::VfoNbRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let id = proto::NoiseBlankerId::try_from(req.id)
            .map(convert::nb_id_from_proto)
            .unwrap_or(receiver_core::types::NoiseBlankerId::Nb1);
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_nb_on(id, req.enabled).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_nb_threshold(
        &self,
        request: Request<proto::VfoNbThresholdRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let id = proto::NoiseBlankerId::try_from(req.id)
            .map(convert::nb_id_from_proto)
            .unwrap_or(receiver_core::types::NoiseBlankerId::Nb1);
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_nb_threshold(id, req.threshold).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_fm_max_dev(
        &self,
        request: Request<proto::VfoFloatRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_fm_max_dev(req.value).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_fm_deemph(
        &self,
        request: Request<proto::VfoDoubleRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_fm_deemph(req.value).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_am_dcr(
        &self,
        request: Request<proto::VfoBoolRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_am_dcr(req.enabled).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_am_sync_dcr(
        &self,
        request: Request<proto::VfoBoolRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_am_sync_dcr(req.enabled).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_am_sync_pll_bw(
        &self,
        request: Request<proto::VfoFloatRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_am_sync_pll_bw(req.value).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_set_audio_gain(
        &self,
        request: Request<proto::VfoDoubleRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.set_audio_gain(req.value).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_start_audio_recording(
        &self,
        request: Request<proto::VfoPathRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.start_audio_recording(req.path).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_stop_audio_recording(
        &self,
        request: Request<proto::VfoHandle>,
    ) -> Result<Response<proto::Reply>, Status> {
        let handle = request.into_inner().handle;
        let result = match self.receiver.get_vfo(handle).await {
            Ok(vfo) => vfo.stop_audio_recording().await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_start_sniffer(
        &self,
        request: Request<proto::VfoSnifferRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.start_sniffer(req.rate, req.size).await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_stop_sniffer(
        &self,
        request: Request<proto::VfoHandle>,
    ) -> Result<Response<proto::Reply>, Status> {
        let handle = request.into_inner().handle;
        let result = match self.receiver.get_vfo(handle).await {
            Ok(vfo) => vfo.stop_sniffer().await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_get_sniffer_data(
        &self,
        request: Request<proto::VfoSnifferDataRequest>,
    ) -> Result<Response<proto::VfoSnifferDataReply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => vfo.get_sniffer_data(req.capacity as usize).await,
            Err(e) => Err(e),
        };
        let reply = match result {
            Ok(samples) => proto::VfoSnifferDataReply {
                error: proto::ErrorCode::Ok as i32,
                samples,
            },
            Err(e) => proto::VfoSnifferDataReply {
                error: convert::error_kind_to_proto(e.kind()) as i32,
                samples: Vec::new(),
            },
        };
        Ok(Response::new(reply))
    }

    async fn vfo_start_udp_streaming(
        &self,
        request: Request<proto::VfoUdpRequest>,
    ) -> Result<Response<proto::Reply>, Status> {
        let req = request.into_inner();
        let result = match self.receiver.get_vfo(req.handle).await {
            Ok(vfo) => {
                vfo.start_udp_streaming(req.host, req.port as u16, req.stereo)
                    .await
            }
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_stop_udp_streaming(
        &self,
        request: Request<proto::VfoHandle>,
    ) -> Result<Response<proto::Reply>, Status> {
        let handle = request.into_inner().handle;
        let result = match self.receiver.get_vfo(handle).await {
            Ok(vfo) => vfo.stop_udp_streaming().await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_start_rds_decoder(
        &self,
        request: Request<proto::VfoHandle>,
    ) -> Result<Response<proto::Reply>, Status> {
        let handle = request.into_inner().handle;
        let result = match self.receiver.get_vfo(handle).await {
            Ok(vfo) => vfo.start_rds_decoder().await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    async fn vfo_stop_rds_decoder(
        &self,
        request: Request<proto::VfoHandle>,
    ) -> Result<Response<proto::Reply>, Status> {
        let handle = request.into_inner().handle;
        let result = match self.receiver.get_vfo(handle).await {
            Ok(vfo) => vfo.stop_rds_decoder().await,
            Err(e) => Err(e),
        };
        Ok(Response::new(reply(result)))
    }

    type SubscribeStream = Pin<Box<dyn Stream<Item = Result<proto::Event, Status>> + Send>>;

    async fn subscribe(
        &self,
        request: Request<proto::SubscribeRequest>,
    ) -> Result<Response<Self::SubscribeStream>, Status> {
        let sync_only = request.into_inner().sync_only;
        let receiver = self.receiver.clone();
        let (tx, rx) = mpsc::channel(SUBSCRIBE_CHANNEL_CAPACITY);

        let mut recv_sub = receiver
            .subscribe()
            .await
            .map_err(|e| Status::unavailable(e.to_string()))?;

        tokio::spawn(async move {
            let mut vfo_tasks: HashMap<u64, tokio::task::JoinHandle<()>> = HashMap::new();
            loop {
                let ev = match recv_sub.recv().await {
                    Ok(ev) => ev,
                    Err(_) => break,
                };
                let is_sync_end = matches!(ev.kind, ReceiverEventKind::SyncEnd);

                if let ReceiverEventKind::VfoAdded { handle } = ev.kind {
                    if !sync_only {
                        if let Ok(vfo) = receiver.get_vfo(handle).await {
                            if let Ok(vfo_sub) = vfo.subscribe().await {
                                let task = tokio::spawn(forward_vfo_events(vfo_sub, tx.clone()));
                                vfo_tasks.insert(handle, task);
                            }
                        }
                    }
                }
                if let ReceiverEventKind::VfoRemoved { handle } = ev.kind {
                    if let Some(task) = vfo_tasks.remove(&handle) {
                        task.abort();
                    }
                }

                if tx
                    .send(Ok(convert::receiver_event_to_proto(&ev)))
                    .await
                    .is_err()
                {
                    break;
                }
                if sync_only && is_sync_end {
                    break;
                }
            }
            for task in vfo_tasks.into_values() {
                task.abort();
            }
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }
}
