//! TUI module for armor8
//!
//! The terminal stands in for the front panel: keys play notes, nudge the
//! eight pots and press the buttons. The LCD, output scope and spectrum are
//! drawn each frame.

mod screen;
mod spectrum;
mod waveform;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use armor8::{
    event::{DisplayRefreshEvent, EventSystem, KeyEvent, Subscription},
    synth::SynthMessage,
    ui::DisplaySimulator,
    Armor8Config,
};
use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::warn;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use screen::{LcdImage, SCREEN_COLS, SCREEN_ROWS};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;
/// Keyboard row mapped to one octave, starting at C.
const NOTE_KEYS: [char; 13] = ['a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k'];
const POT_NAMES: [&str; 8] = [
    "FREQ / DETUNE",
    "ATK / AEX / M1",
    "DEC / DEX / M2",
    "SUS / M3",
    "REL / REX / M4",
    "AMP / AVS",
    "FLT / RES / FVS",
    "GLIDE / BEND",
];
const POT_STEP: f32 = 0.05;
const POT_FINE_STEP: f32 = 0.01;

pub struct PanelApp {
    panel: DisplaySimulator,
    notes: Producer<SynthMessage>,
    audio_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    lcd: LcdImage,
    refreshes: Arc<Mutex<Vec<DisplayRefreshEvent>>>,
    _refresh_subscription: Subscription,
    held: BTreeSet<u8>,
    octave: u8,
    pots: [f32; 8],
    selected_pot: usize,
    alt1: bool,
    alt2: bool,
    tick_interval: Duration,
    should_quit: bool,
}

impl PanelApp {
    pub fn new(
        panel: DisplaySimulator,
        events: &EventSystem,
        notes: Producer<SynthMessage>,
        audio_rx: Consumer<f32>,
        config: &Armor8Config,
    ) -> Self {
        let refreshes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&refreshes);
        let subscription = events.display.subscribe(move |event: &DisplayRefreshEvent| {
            if let Ok(mut pending) = sink.lock() {
                pending.push(*event);
            }
        });

        Self {
            panel,
            notes,
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, config.sample_rate),
            lcd: LcdImage::new(),
            refreshes,
            _refresh_subscription: subscription,
            held: BTreeSet::new(),
            octave: 4,
            pots: [0.5; 8],
            selected_pot: 0,
            alt1: false,
            alt2: false,
            tick_interval: config.tick_interval,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let mut next_tick = Instant::now();

        while !self.should_quit {
            let now = Instant::now();
            if now >= next_tick {
                self.panel.tick();
                next_tick = now + self.tick_interval;
            }

            self.poll_audio();
            self.copy_refreshed_regions();
            terminal.draw(|frame| self.render(frame))?;

            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        let _ = self.notes.push(SynthMessage::AllNotesOff);
        Ok(())
    }

    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }

        if received {
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
            self.spectrum.update(&self.audio_buffer);
        }
    }

    fn copy_refreshed_regions(&mut self) {
        let pending = match self.refreshes.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };
        for region in &pending {
            self.lcd.copy_region(self.panel.frame_buffer(), region);
        }
    }

    fn send(&mut self, message: SynthMessage) {
        if self.notes.push(message).is_err() {
            warn!("note queue full, dropping {:?}", message);
        }
    }

    /// Terminals report presses only, so note keys latch: press once to
    /// start the note, again to release it.
    fn toggle_note(&mut self, offset: usize) {
        let note = (self.octave as usize * 12 + 12 + offset).min(127) as u8;
        if self.held.remove(&note) {
            self.send(SynthMessage::Key(KeyEvent::off(note)));
        } else {
            self.held.insert(note);
            self.send(SynthMessage::Key(KeyEvent::on(note, 100)));
        }
    }

    fn nudge_pot(&mut self, delta: f32) {
        let value = (self.pots[self.selected_pot] + delta).clamp(0.0, 1.0);
        self.pots[self.selected_pot] = value;

        let panel = &mut self.panel;
        match self.selected_pot {
            0 => panel.process_freq_or_detune_pot(value),
            1 => panel.process_atk_or_atk_expo_or_op1_mod_pot(value),
            2 => panel.process_dec_or_dec_expo_or_op2_mod_pot(value),
            3 => panel.process_sus_or_op3_mod_pot(value),
            4 => panel.process_rel_or_rel_expo_or_op4_mod_pot(value),
            5 => panel.process_amp_or_amp_vel_pot(value),
            6 => panel.process_filt_freq_or_filt_res_or_filt_vel_pot(value),
            _ => panel.process_pitch_bend_or_glide_pot(value),
        }
    }

    /// Latch an Alt key: two scans down (pressed, held) or two up
    /// (released, floating).
    fn toggle_alt(&mut self, which: u8) {
        let down = if which == 1 {
            self.alt1 = !self.alt1;
            self.alt1
        } else {
            self.alt2 = !self.alt2;
            self.alt2
        };
        for _ in 0..2 {
            if which == 1 {
                self.panel.process_alt1_btn(down);
            } else {
                self.panel.process_alt2_btn(down);
            }
        }
    }

    fn press(&mut self, button: fn(&mut DisplaySimulator, bool)) {
        for down in [true, true, false, false] {
            button(&mut self.panel, down);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(c) if NOTE_KEYS.contains(&c) => {
                if let Some(offset) = NOTE_KEYS.iter().position(|&k| k == c) {
                    self.toggle_note(offset);
                }
            }
            KeyCode::Char('z') => self.octave = self.octave.saturating_sub(1),
            KeyCode::Char('x') => self.octave = (self.octave + 1).min(8),
            KeyCode::Char(' ') => {
                self.held.clear();
                self.send(SynthMessage::AllNotesOff);
            }
            KeyCode::Char(c @ '1'..='8') => self.selected_pot = c as usize - '1' as usize,
            KeyCode::Up => self.nudge_pot(POT_STEP),
            KeyCode::Down => self.nudge_pot(-POT_STEP),
            KeyCode::Right => self.nudge_pot(POT_FINE_STEP),
            KeyCode::Left => self.nudge_pot(-POT_FINE_STEP),
            KeyCode::F(1) => self.toggle_alt(1),
            KeyCode::F(2) => self.toggle_alt(2),
            KeyCode::Char('o') => self.press(DisplaySimulator::process_next_op_btn),
            KeyCode::Char('v') => self.press(DisplaySimulator::process_next_wave_btn),
            KeyCode::Char('r') => self.press(DisplaySimulator::process_ratio_or_fixed_btn),
            KeyCode::Char('m') => self.press(DisplaySimulator::process_mono_btn),
            KeyCode::Char('l') => self.press(DisplaySimulator::process_glide_retrig_btn),
            KeyCode::Char(',') => self.press(DisplaySimulator::process_prev_preset_btn),
            KeyCode::Char('.') => self.press(DisplaySimulator::process_next_preset_btn),
            KeyCode::Char('p') => self.press(DisplaySimulator::process_write_preset_btn),
            KeyCode::F(5) | KeyCode::F(6) | KeyCode::F(7) => self.toggle_eg_destination(key),
            _ => {}
        }
    }

    fn toggle_eg_destination(&mut self, key: KeyCode) {
        let event = self.panel.current_state();
        let eg = event.state.operators[event.operator_to_edit].eg_destinations;
        match key {
            KeyCode::F(5) => self.panel.set_eg_dest_amplitude(!eg.amplitude),
            KeyCode::F(6) => self.panel.set_eg_dest_frequency(!eg.frequency),
            _ => self.panel.set_eg_dest_filter(!eg.filter),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(SCREEN_ROWS + 2), // LCD
                Constraint::Min(8),                  // Scope and spectrum
                Constraint::Length(2),               // Help
            ])
            .split(frame.area());

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SCREEN_COLS + 2), Constraint::Min(24)])
            .split(rows[0]);
        frame.render_widget(&self.lcd, top[0]);
        self.render_pots(frame, top[1]);

        let scopes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        render_waveform(frame, scopes[0], &self.audio_buffer);
        render_spectrum(frame, scopes[1], self.spectrum.data());

        let help = Paragraph::new(vec![
            Line::from(" [A-K] notes  [Z/X] octave  [Space] all off  [1-8] pot  [↑↓ ←→] turn  [F1/F2] Alt"),
            Line::from(" [O] op  [V] wave  [R] ratio  [M] mono  [L] retrig  [,/.] preset  [P] write  [F5-F7] EG  [Q] quit"),
        ])
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[2]);
    }

    fn render_pots(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let mut lines: Vec<Line> = POT_NAMES
            .iter()
            .zip(self.pots)
            .enumerate()
            .map(|(i, (name, value))| {
                let text = format!("{} {:<16}{:>5.2}", i + 1, name, value);
                if i == self.selected_pot {
                    Line::styled(text, Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    Line::from(text)
                }
            })
            .collect();

        let flag = |on: bool| if on { "ON " } else { "off" };
        lines.push(Line::from(""));
        lines.push(Line::from(format!("ALT1 {}  ALT2 {}", flag(self.alt1), flag(self.alt2))));
        lines.push(Line::from(format!("octave {}  held {:?}", self.octave, self.held)));

        let block = Block::default().title(" Pots ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
