//! Spectrum analyzer widget
//!
//! Hann-windowed FFT of the scope buffer, read at log-spaced frequencies
//! with a falling peak hold so short notes stay visible.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

const SPECTRUM_BINS: usize = 40;
const FLOOR_DB: f64 = -100.0;
/// How far a held peak falls per update.
const FALL_DB: f64 = 1.5;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    bins: Vec<usize>,
    /// (log10 of frequency in Hz, level in dB)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let buffer_len = buffer_len.max(4);
        let fft = FftPlanner::new().plan_fft_forward(buffer_len);

        let denom = (buffer_len - 1) as f32;
        let window = (0..buffer_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).clamp(40.0, 20_000.0);
        let half = buffer_len / 2;
        let (bins, spectrum) = (0..SPECTRUM_BINS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
                let freq = 20.0 * (nyquist / 20.0).powf(t);
                let index = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
                (index.clamp(1, half - 1), (freq.log10(), FLOOR_DB))
            })
            .unzip();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            bins,
            spectrum,
        }
    }

    /// Analyze `buffer`; ignored unless it is exactly the FFT size.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (&index, (_, level)) in self.bins.iter().zip(self.spectrum.iter_mut()) {
            let power = self.scratch[index].norm_sqr().max(1e-12) as f64;
            let db = (10.0 * power.log10()).max(FLOOR_DB);
            *level = db.max(*level - FALL_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([20f64.log10(), 20_000f64.log10()])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 40.0])
                .labels(vec!["-100", "-30", "40"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
