//! Armor8 - audio setup and the shared synth

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use log::{error, info};
use rtrb::RingBuffer;
use std::sync::{Arc, Mutex};

use armor8::{
    assets::{FONT_3X5, LOGO},
    event::EventSystem,
    preset::{FsPresetFile, PresetStore},
    synth::{SynthMessage, VoiceManager},
    ui::{DisplaySimulator, Font, Sprite},
    Armor8Config, MAX_BLOCK_SIZE,
};

use super::ui::PanelApp;

/// Note messages queued between two audio callbacks.
const NOTE_QUEUE: usize = 256;
/// Output samples kept for the scope; a few callbacks' worth.
const SCOPE_QUEUE: usize = 16_384;

pub struct Armor8 {
    config: Armor8Config,
}

impl Armor8 {
    pub fn new(config: Armor8Config) -> Self {
        Self { config }
    }

    /// Open the audio device, build the synth and panel, and run the TUI
    /// until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = stream_config.sample_rate().0 as f32;
        let channels = stream_config.channels() as usize;
        let config = self.config.sample_rate(sample_rate);
        info!(
            "audio: {} Hz, {} channels, {} voices, presets in {}",
            sample_rate,
            channels,
            config.num_voices,
            config.preset_path.display()
        );

        let events = EventSystem::new();
        let font = Font::from_bytes(&FONT_3X5).wrap_err("built-in font is unreadable")?;
        let logo = Sprite::from_bytes(&LOGO).wrap_err("built-in logo is unreadable")?;
        // The panel mirrors preset changes, so it subscribes before the
        // manager announces its first state.
        let panel = DisplaySimulator::new(events.clone(), font, logo, &config);

        let presets = PresetStore::open(FsPresetFile::new(&config.preset_path), config.preset_capacity);
        let manager = Arc::new(Mutex::new(VoiceManager::new(&config, presets, events.clone())));
        VoiceManager::bind(&manager, &events);

        let (note_tx, mut note_rx) = RingBuffer::<SynthMessage>::new(NOTE_QUEUE);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE);

        let synth = Arc::clone(&manager);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &stream_config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                // The panel holds the lock while it applies an edit; play
                // silence for that block rather than wait.
                let mut manager = synth.try_lock().ok();

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];

                    match manager.as_mut() {
                        Some(manager) => manager.render_block(block, &mut note_rx),
                        None => block.fill(0.0),
                    }

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        let _ = scope_tx.push(s);
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| error!("audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result = PanelApp::new(panel, &events, note_tx, scope_rx, &config).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}
