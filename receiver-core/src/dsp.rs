//! The DSP contract consumed by the façades. Out of scope for this core,
//! but named here as the trait boundary a real implementation (FFT,
//! filters, demodulators, sinks) plugs into, and that the test double in
//! [`crate::fakes`] stands in for.

use crate::types::{Demod, Filter, FilterRange, GainStage, NoiseBlankerId, WindowType};

/// Operations on the global receiver-level DSP object.
pub trait DspReceiver: Send + 'static {
    fn start(&mut self) -> bool;
    fn stop(&mut self) -> bool;
    fn is_running(&self) -> bool;

    /// Attempts to open `device`. `Err` triggers the zero-source fallback
    /// at the façade layer.
    fn set_input_device(&mut self, device: &str) -> Result<(), ()>;
    fn current_input_device(&self) -> String;

    fn set_input_rate(&mut self, rate: f64) -> f64;
    fn get_input_rate(&self) -> f64;

    fn set_input_decim(&mut self, decim: i32) -> i32;
    fn get_input_decim(&self) -> i32;

    fn get_antennas(&self) -> Vec<String>;
    fn get_antenna(&self) -> String;
    fn set_antenna(&mut self, antenna: &str);

    fn set_rf_freq(&mut self, freq: f64) -> f64;
    fn get_rf_freq(&self) -> f64;

    fn set_iq_swap(&mut self, enabled: bool);
    fn get_iq_swap(&self) -> bool;

    fn set_dc_cancel(&mut self, enabled: bool);
    fn get_dc_cancel(&self) -> bool;

    fn set_iq_balance(&mut self, enabled: bool);
    fn get_iq_balance(&self) -> bool;

    fn set_auto_gain(&mut self, enabled: bool);
    fn get_auto_gain(&self) -> bool;

    fn get_gain_stages(&self) -> Vec<GainStage>;
    fn set_gain(&mut self, name: &str, value: f64) -> Result<f64, ()>;

    fn set_freq_corr(&mut self, ppm: i32) -> i32;
    fn get_freq_corr(&self) -> i32;

    fn set_iq_fft_size(&mut self, size: u32) -> u32;
    fn get_iq_fft_size(&self) -> u32;

    fn set_iq_fft_window(&mut self, window: WindowType);
    fn get_iq_fft_window(&self) -> WindowType;

    /// Fills `buf` with the latest spectrum frame, returning `(center_freq,
    /// sample_rate, filled_len)`.
    fn get_iq_fft_data(&self, buf: &mut [f32]) -> (f64, f64, usize);

    fn start_iq_recording(&mut self, path: &str) -> Result<(), std::io::Error>;
    fn stop_iq_recording(&mut self);
    fn is_iq_recording(&self) -> bool;
    fn get_iq_filename(&self) -> Option<String>;

    fn add_vfo_channel(&mut self) -> Box<dyn DspVfoChannel>;
    fn remove_vfo_channel(&mut self, channel: &mut dyn DspVfoChannel);
}

/// Operations on a single VFO's DSP channel.
pub trait DspVfoChannel: Send + 'static {
    fn set_filter_offset(&mut self, offset: i64);
    fn get_filter_offset(&self) -> i64;

    fn set_cw_offset(&mut self, offset: i64);
    fn get_cw_offset(&self) -> i64;

    fn set_filter(&mut self, filter: Filter);
    fn get_filter(&self) -> Filter;
    fn filter_range(&self, demod: Demod) -> FilterRange;
    fn default_filter(&self, demod: Demod) -> Filter;

    fn set_demod(&mut self, demod: Demod);
    fn get_demod(&self) -> Demod;

    fn set_sql_level(&mut self, level: f64);
    fn set_sql_alpha(&mut self, alpha: f64);

    fn set_agc_on(&mut self, enabled: bool);
    fn set_agc_hang(&mut self, enabled: bool);
    fn set_agc_threshold(&mut self, threshold: i32);
    fn set_agc_slope(&mut self, slope: i32);
    fn set_agc_decay(&mut self, decay: i32);
    fn set_agc_manual_gain(&mut self, gain: i32);

    fn set_nb_on(&mut self, id: NoiseBlankerId, enabled: bool);
    fn set_nb_threshold(&mut self, id: NoiseBlankerId, threshold: f32);

    fn set_fm_max_dev(&mut self, max_dev: f32);
    fn set_fm_deemph(&mut self, deemph: f64);
    fn set_am_dcr(&mut self, enabled: bool);
    fn set_am_sync_dcr(&mut self, enabled: bool);
    fn set_am_sync_pll_bw(&mut self, bw: f32);

    fn set_audio_gain(&mut self, gain: f64);

    fn start_audio_recording(&mut self, path: &str) -> Result<(), std::io::Error>;
    fn stop_audio_recording(&mut self);
    fn is_audio_recording(&self) -> bool;

    fn start_sniffer(&mut self, rate: u32, size: u32);
    fn stop_sniffer(&mut self);
    fn is_sniffer_active(&self) -> bool;
    fn get_sniffer_data(&self, buf: &mut [f32]) -> usize;
    fn sniffer_buffer_size(&self) -> usize;

    fn start_udp_streaming(&mut self, host: &str, port: u16, stereo: bool);
    fn stop_udp_streaming(&mut self);
    fn is_udp_streaming(&self) -> bool;

    fn start_rds_decoder(&mut self);
    fn stop_rds_decoder(&mut self);
    fn is_rds_decoder_active(&self) -> bool;
    fn reset_rds_parser(&mut self);
}
