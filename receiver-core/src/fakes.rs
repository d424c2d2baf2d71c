//! In-memory `DspReceiver`/`DspVfoChannel` stand-ins. No real device or
//! file I/O; `start_*_recording` just remembers the path it was given.
//! Doubles as `receiver-cli`'s demo backend, since this crate ships no real
//! hardware DSP implementation.

use crate::dsp::{DspReceiver, DspVfoChannel};
use crate::filter;
use crate::types::{Demod, Filter, FilterRange, GainStage, NoiseBlankerId, WindowType};

/// A receiver DSP stand-in with one advertised gain stage ("LNA") and a
/// fixed antenna list.
pub struct FakeDspReceiver {
    running: bool,
    input_device: String,
    input_rate: f64,
    input_decim: i32,
    antenna: String,
    rf_freq: f64,
    iq_swap: bool,
    dc_cancel: bool,
    iq_balance: bool,
    auto_gain: bool,
    lna_gain: f64,
    freq_corr: i32,
    fft_size: u32,
    fft_window: WindowType,
    iq_recording: Option<String>,
    fail_devices: Vec<String>,
}

impl FakeDspReceiver {
    pub fn new() -> Self {
        Self {
            running: false,
            input_device: "default".into(),
            input_rate: 2_400_000.0,
            input_decim: 1,
            antenna: "RX".into(),
            rf_freq: 100_000_000.0,
            iq_swap: false,
            dc_cancel: true,
            iq_balance: false,
            auto_gain: true,
            lna_gain: 20.0,
            freq_corr: 0,
            fft_size: 4_096,
            fft_window: WindowType::Hann,
            iq_recording: None,
            fail_devices: Vec::new(),
        }
    }

    /// Makes a later `set_input_device(name)` fail, as if device
    /// construction threw.
    pub fn fail_on_device(mut self, name: &str) -> Self {
        self.fail_devices.push(name.to_string());
        self
    }
}

impl Default for FakeDspReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl DspReceiver for FakeDspReceiver {
    fn start(&mut self) -> bool {
        self.running = true;
        true
    }

    fn stop(&mut self) -> bool {
        self.running = false;
        true
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn set_input_device(&mut self, device: &str) -> Result<(), ()> {
        if self.fail_devices.iter().any(|d| d == device) {
            return Err(());
        }
        self.input_device = device.to_string();
        Ok(())
    }

    fn current_input_device(&self) -> String {
        self.input_device.clone()
    }

    fn set_input_rate(&mut self, rate: f64) -> f64 {
        self.input_rate = rate;
        rate
    }

    fn get_input_rate(&self) -> f64 {
        self.input_rate
    }

    fn set_input_decim(&mut self, decim: i32) -> i32 {
        self.input_decim = decim;
        decim
    }

    fn get_input_decim(&self) -> i32 {
        self.input_decim
    }

    fn get_antennas(&self) -> Vec<String> {
        vec!["RX".into(), "TX/RX".into()]
    }

    fn get_antenna(&self) -> String {
        self.antenna.clone()
    }

    fn set_antenna(&mut self, antenna: &str) {
        self.antenna = antenna.to_string();
    }

    fn set_rf_freq(&mut self, freq: f64) -> f64 {
        self.rf_freq = freq;
        freq
    }

    fn get_rf_freq(&self) -> f64 {
        self.rf_freq
    }

    fn set_iq_swap(&mut self, enabled: bool) {
        self.iq_swap = enabled;
    }

    fn get_iq_swap(&self) -> bool {
        self.iq_swap
    }

    fn set_dc_cancel(&mut self, enabled: bool) {
        self.dc_cancel = enabled;
    }

    fn get_dc_cancel(&self) -> bool {
        self.dc_cancel
    }

    fn set_iq_balance(&mut self, enabled: bool) {
        self.iq_balance = enabled;
    }

    fn get_iq_balance(&self) -> bool {
        self.iq_balance
    }

    fn set_auto_gain(&mut self, enabled: bool) {
        self.auto_gain = enabled;
    }

    fn get_auto_gain(&self) -> bool {
        self.auto_gain
    }

    fn get_gain_stages(&self) -> Vec<GainStage> {
        vec![GainStage {
            name: "LNA".into(),
            start: 0.0,
            stop: 40.0,
            step: 1.0,
            value: self.lna_gain,
        }]
    }

    fn set_gain(&mut self, name: &str, value: f64) -> Result<f64, ()> {
        if name != "LNA" {
            return Err(());
        }
        self.lna_gain = value.clamp(0.0, 40.0);
        Ok(self.lna_gain)
    }

    fn set_freq_corr(&mut self, ppm: i32) -> i32 {
        self.freq_corr = ppm;
        ppm
    }

    fn get_freq_corr(&self) -> i32 {
        self.freq_corr
    }

    fn set_iq_fft_size(&mut self, size: u32) -> u32 {
        self.fft_size = size;
        size
    }

    fn get_iq_fft_size(&self) -> u32 {
        self.fft_size
    }

    fn set_iq_fft_window(&mut self, window: WindowType) {
        self.fft_window = window;
    }

    fn get_iq_fft_window(&self) -> WindowType {
        self.fft_window
    }

    fn get_iq_fft_data(&self, buf: &mut [f32]) -> (f64, f64, usize) {
        let filled = buf.len();
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = i as f32;
        }
        (self.rf_freq, self.input_rate, filled)
    }

    fn start_iq_recording(&mut self, path: &str) -> Result<(), std::io::Error> {
        self.iq_recording = Some(path.to_string());
        Ok(())
    }

    fn stop_iq_recording(&mut self) {
        self.iq_recording = None;
    }

    fn is_iq_recording(&self) -> bool {
        self.iq_recording.is_some()
    }

    fn get_iq_filename(&self) -> Option<String> {
        self.iq_recording.clone()
    }

    fn add_vfo_channel(&mut self) -> Box<dyn DspVfoChannel> {
        Box::new(FakeDspVfoChannel::new())
    }

    fn remove_vfo_channel(&mut self, _channel: &mut dyn DspVfoChannel) {}
}

/// A VFO DSP stand-in that just records whatever it is told to do.
pub struct FakeDspVfoChannel {
    filter_offset: i64,
    cw_offset: i64,
    filter: Filter,
    demod: Demod,
    agc_on: bool,
    agc_hang: bool,
    agc_threshold: i32,
    agc_slope: i32,
    agc_decay: i32,
    agc_manual_gain: i32,
    nb1_on: bool,
    nb1_threshold: f32,
    nb2_on: bool,
    nb2_threshold: f32,
    fm_max_dev: f32,
    fm_deemph: f64,
    am_dcr: bool,
    am_sync_dcr: bool,
    am_sync_pll_bw: f32,
    audio_gain: f64,
    audio_recording: Option<String>,
    sniffer: Option<(u32, u32)>,
    udp_streaming: bool,
    rds_active: bool,
}

impl FakeDspVfoChannel {
    pub fn new() -> Self {
        Self {
            filter_offset: 0,
            cw_offset: 0,
            filter: filter::default_filter(Demod::Off),
            demod: Demod::Off,
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
            udp_streaming: false,
            rds_active: false,
        }
    }
}

impl Default for FakeDspVfoChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DspVfoChannel for FakeDspVfoChannel {
    fn set_filter_offset(&mut self, offset: i64) {
        self.filter_offset = offset;
    }

    fn get_filter_offset(&self) -> i64 {
        self.filter_offset
    }

    fn set_cw_offset(&mut self, offset: i64) {
        self.cw_offset = offset;
    }

    fn get_cw_offset(&self) -> i64 {
        self.cw_offset
    }

    fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    fn get_filter(&self) -> Filter {
        self.filter
    }

    fn filter_range(&self, demod: Demod) -> FilterRange {
        filter::range_for(demod)
    }

    fn default_filter(&self, demod: Demod) -> Filter {
        filter::default_filter(demod)
    }

    fn set_demod(&mut self, demod: Demod) {
        self.demod = demod;
    }

    fn get_demod(&self) -> Demod {
        self.demod
    }

    fn set_sql_level(&mut self, _level: f64) {}
    fn set_sql_alpha(&mut self, _alpha: f64) {}

    fn set_agc_on(&mut self, enabled: bool) {
        self.agc_on = enabled;
    }

    fn set_agc_hang(&mut self, enabled: bool) {
        self.agc_hang = enabled;
    }

    fn set_agc_threshold(&mut self, threshold: i32) {
        self.agc_threshold = threshold;
    }

    fn set_agc_slope(&mut self, slope: i32) {
        self.agc_slope = slope;
    }

    fn set_agc_decay(&mut self, decay: i32) {
        self.agc_decay = decay;
    }

    fn set_agc_manual_gain(&mut self, gain: i32) {
        self.agc_manual_gain = gain;
    }

    fn set_nb_on(&mut self, id: NoiseBlankerId, enabled: bool) {
        match id {
            NoiseBlankerId::Nb1 => self.nb1_on = enabled,
            NoiseBlankerId::Nb2 => self.nb2_on = enabled,
        }
    }

    fn set_nb_threshold(&mut self, id: NoiseBlankerId, threshold: f32) {
        match id {
            NoiseBlankerId::Nb1 => self.nb1_threshold = threshold,
            NoiseBlankerId::Nb2 => self.nb2_threshold = threshold,
        }
    }

    fn set_fm_max_dev(&mut self, max_dev: f32) {
        self.fm_max_dev = max_dev;
    }

    fn set_fm_deemph(&mut self, deemph: f64) {
        self.fm_deemph = deemph;
    }

    fn set_am_dcr(&mut self, enabled: bool) {
        self.am_dcr = enabled;
    }

    fn set_am_sync_dcr(&mut self, enabled: bool) {
        self.am_sync_dcr = enabled;
    }

    fn set_am_sync_pll_bw(&mut self, bw: f32) {
        self.am_sync_pll_bw = bw;
    }

    fn set_audio_gain(&mut self, gain: f64) {
        self.audio_gain = gain;
    }

    fn start_audio_recording(&mut self, path: &str) -> Result<(), std::io::Error> {
        self.audio_recording = Some(path.to_string());
        Ok(())
    }

    fn stop_audio_recording(&mut self) {
        self.audio_recording = None;
    }

    fn is_audio_recording(&self) -> bool {
        self.audio_recording.is_some()
    }

    fn start_sniffer(&mut self, rate: u32, size: u32) {
        self.sniffer = Some((rate, size));
    }

    fn stop_sniffer(&mut self) {
        self.sniffer = None;
    }

    fn is_sniffer_active(&self) -> bool {
        self.sniffer.is_some()
    }

    fn get_sniffer_data(&self, buf: &mut [f32]) -> usize {
        buf.len()
    }

    fn sniffer_buffer_size(&self) -> usize {
        1_024
    }

    fn start_udp_streaming(&mut self, _host: &str, _port: u16, _stereo: bool) {
        self.udp_streaming = true;
    }

    fn stop_udp_streaming(&mut self) {
        self.udp_streaming = false;
    }

    fn is_udp_streaming(&self) -> bool {
        self.udp_streaming
    }

    fn start_rds_decoder(&mut self) {
        self.rds_active = true;
    }

    fn stop_rds_decoder(&mut self) {
        self.rds_active = false;
    }

    fn is_rds_decoder_active(&self) -> bool {
        self.rds_active
    }

    fn reset_rds_parser(&mut self) {}
}
