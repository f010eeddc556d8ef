use std::sync::{Arc, Mutex, Weak};

use log::{debug, warn};

use crate::config::Armor8Config;
use crate::dsp::OscillatorMode;
use crate::event::bus::lock;
use crate::event::{
    ButtonControl, ButtonEvent, ButtonState, EventSystem, KeyEvent, PitchEvent, PotControl, PotEvent,
    PresetChangedEvent, Subscription,
};
use crate::params;
use crate::preset::{
    EgModDestination, OperatorState, PresetError, PresetHeader, PresetStore, PresetUpgrader, VoiceState,
};
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::synth::voice::Voice;
use crate::NUM_OPERATORS;

/*
Voice Manager
=============

Owns the voice pool, the preset table and the editing state of the panel.

  KeyEvent ─────▶ allocate voice ──▶ Voice::on_key_event
  PitchEvent ───▶ every voice
  PotEvent ─────▶ params range ──▶ set_operator_* on operator_to_edit
  ButtonEvent ──▶ (Released edge) operator/wave/mode toggles, preset nav
                      │
                      └──▶ PresetChangedEvent

Allocation: the lowest-numbered idle voice, otherwise the voice that was
triggered longest ago (ties go to the lower index). In monophonic mode every
key goes to voice 0, which glides between legato notes.

Subscribers of the preset bus run while the manager is locked and must not
lock it again.
*/

pub struct VoiceManager {
    voices: Vec<Voice>,
    state: VoiceState,
    operator_to_edit: usize,
    preset_num: usize,
    presets: PresetStore,
    events: EventSystem,
    subscriptions: Vec<Subscription>,
    trigger_count: u64, // bumps on every note-on, used as voice age
}

impl VoiceManager {
    /// Build the voice pool, migrate the preset table and load preset 0.
    pub fn new(config: &Armor8Config, presets: PresetStore, events: EventSystem) -> Self {
        let voices = (0..config.num_voices.max(1))
            .map(|_| Voice::new(config.sample_rate))
            .collect();

        let mut manager = Self {
            voices,
            state: VoiceState::default(),
            operator_to_edit: 0,
            preset_num: 0,
            presets,
            events,
            subscriptions: Vec::new(),
            trigger_count: 0,
        };

        let upgrader = PresetUpgrader::new(VoiceState::default(), manager.presets.header());
        if let Err(err) = manager.presets.upgrade_presets(&upgrader) {
            warn!("preset upgrade could not be saved: {}", err);
        }

        manager.set_state(&VoiceState::default());
        manager.load_preset(0);
        manager
    }

    /// Subscribe a shared manager to the input buses and announce its state.
    ///
    /// The subscriptions hold weak handles and are owned by the manager, so
    /// dropping the last `Arc` unsubscribes everything.
    pub fn bind(manager: &Arc<Mutex<Self>>, events: &EventSystem) {
        let weak = Arc::downgrade(manager);
        let subscriptions = [
            events.keys.subscribe(forward(&weak, Self::on_key_event)),
            events.pitch.subscribe(forward(&weak, Self::on_pitch_event)),
            events.pots.subscribe(forward(&weak, Self::on_pot_event)),
            events.buttons.subscribe(forward(&weak, Self::on_button_event)),
        ];

        let mut guard = lock(manager);
        guard.subscriptions.extend(subscriptions);
        guard.publish_state();
    }

    // ----------------------------------------------------------------------
    // Render path

    /// Sum of every sounding voice. No normalization.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let mut sum = 0.0;
        for voice in &mut self.voices {
            if !voice.is_idle() {
                sum += voice.next_sample();
            }
        }
        sum
    }

    /// Apply queued performance messages, then fill `out`.
    pub fn render_block<R: MessageReceiver + ?Sized>(&mut self, out: &mut [f32], rx: &mut R) {
        while let Some(message) = rx.pop() {
            match message {
                SynthMessage::Key(event) => self.on_key_event(&event),
                SynthMessage::Pitch(event) => self.on_pitch_event(&event),
                SynthMessage::AllNotesOff => self.all_notes_off(),
            }
        }

        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn on_key_event(&mut self, event: &KeyEvent) {
        if !event.pressed {
            for voice in &mut self.voices {
                voice.on_key_event(event, 0);
            }
            return;
        }

        self.trigger_count += 1;
        let index = if self.state.monophonic {
            0
        } else {
            self.allocate_voice()
        };
        if let Some(voice) = self.voices.get_mut(index) {
            voice.on_key_event(event, self.trigger_count);
        }
    }

    pub fn on_pitch_event(&mut self, event: &PitchEvent) {
        for voice in &mut self.voices {
            voice.on_pitch_event(event);
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            if voice.is_gated() {
                voice.release();
            }
        }
    }

    /// Oldest idle voice, else the oldest sounding one. Ties go to the
    /// lower index.
    fn allocate_voice(&self) -> usize {
        let oldest = |idle: bool| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, voice)| voice.is_idle() == idle)
                .min_by_key(|(_, voice)| voice.age())
                .map(|(index, _)| index)
        };
        oldest(true).or_else(|| oldest(false)).unwrap_or(0)
    }

    // ----------------------------------------------------------------------
    // Control path

    pub fn on_pot_event(&mut self, event: &PotEvent) {
        let op = self.operator_to_edit;
        let value = event.value;
        let current = self.state.operators[op];

        match event.control {
            PotControl::Frequency => {
                let range = if current.use_ratio {
                    params::RATIO
                } else {
                    params::FREQUENCY
                };
                self.set_operator_freq(op, range.map(value));
            }
            PotControl::Detune => self.set_operator_detune(op, params::DETUNE.map(value).round() as i32),
            PotControl::Attack => {
                self.set_operator_eg_attack(op, params::ATTACK.map(value), current.attack_expo)
            }
            PotControl::AttackExpo => {
                self.set_operator_eg_attack(op, current.attack, params::EXPO.map(value))
            }
            PotControl::Decay => self.set_operator_eg_decay(op, params::DECAY.map(value), current.decay_expo),
            PotControl::DecayExpo => self.set_operator_eg_decay(op, current.decay, params::EXPO.map(value)),
            PotControl::Sustain => self.set_operator_eg_sustain(op, params::SUSTAIN.map(value)),
            PotControl::Release => {
                self.set_operator_eg_release(op, params::RELEASE.map(value), current.release_expo)
            }
            PotControl::ReleaseExpo => {
                self.set_operator_eg_release(op, current.release, params::EXPO.map(value))
            }
            PotControl::OpModulation(source) => {
                self.set_operator_modulation(source, op, params::OP_MOD.map(value))
            }
            PotControl::Amplitude => self.set_operator_amplitude(op, params::AMPLITUDE.map(value)),
            PotControl::AmpVelSens => self.set_operator_amp_vel_sens(op, params::VELOCITY.map(value)),
            PotControl::FilterFreq => self.set_operator_filter_freq(op, params::FILTER_FREQ.map(value)),
            PotControl::FilterRes => self.set_operator_filter_res(op, params::FILTER_RES.map(value)),
            PotControl::FiltVelSens => self.set_operator_filt_vel_sens(op, params::VELOCITY.map(value)),
            PotControl::PitchBend => {
                self.set_pitch_bend_semitones(params::PITCH_BEND.map(value).round() as u32)
            }
            PotControl::GlideTime => self.set_glide_time(params::GLIDE_TIME.map(value)),
        }

        debug!("pot {:?} -> {:.3} on operator {}", event.control, value, op + 1);
        self.publish_state();
    }

    pub fn on_button_event(&mut self, event: &ButtonEvent) {
        if event.state != ButtonState::Released {
            return;
        }

        let op = self.operator_to_edit;
        let current = self.state.operators[op];

        match event.control {
            ButtonControl::NextOperator => {
                self.operator_to_edit = (op + 1) % NUM_OPERATORS;
            }
            ButtonControl::NextWave => self.set_operator_wave(op, current.wave.next()),
            ButtonControl::RatioToggle => {
                let use_ratio = !current.use_ratio;
                self.set_operator_ratio(op, use_ratio);
                // Keep the stored frequency meaningful in the new mode.
                self.set_operator_freq(op, current.frequency);
            }
            ButtonControl::EgAmplitude => self.toggle_eg_destination(op, EgModDestination::Amplitude),
            ButtonControl::EgFrequency => self.toggle_eg_destination(op, EgModDestination::Frequency),
            ButtonControl::EgFilter => self.toggle_eg_destination(op, EgModDestination::Filter),
            ButtonControl::MonoToggle => self.set_monophonic(!self.state.monophonic),
            ButtonControl::GlideRetriggerToggle => self.set_glide_retrigger(!self.state.glide_retrigger),
            ButtonControl::PrevPreset => {
                let capacity = self.presets.capacity().max(1);
                self.load_preset((self.preset_num + capacity - 1) % capacity);
            }
            ButtonControl::NextPreset => {
                let capacity = self.presets.capacity().max(1);
                self.load_preset((self.preset_num + 1) % capacity);
            }
            ButtonControl::WritePreset => {
                if let Err(err) = self.write_preset() {
                    warn!("could not write preset {}: {}", self.preset_num, err);
                }
            }
            ButtonControl::Alt1 | ButtonControl::Alt2 => return,
        }

        debug!("button {:?} on operator {}", event.control, self.operator_to_edit + 1);
        self.publish_state();
    }

    fn toggle_eg_destination(&mut self, op: usize, dest: EgModDestination) {
        let on = self.state.operators[op].eg_destinations.get(dest);
        self.set_operator_eg_mod_destination(op, dest, !on);
    }

    /// Announce the current state on the preset bus.
    pub fn publish_state(&self) {
        self.events.presets.publish(&PresetChangedEvent {
            state: self.state,
            operator_to_edit: self.operator_to_edit,
            preset_num: self.preset_num,
        });
    }

    // ----------------------------------------------------------------------
    // Presets

    /// Load a slot into every voice. Unreadable slots keep the current sound.
    pub fn load_preset(&mut self, slot: usize) {
        match self.presets.retrieve_preset::<VoiceState>(slot) {
            Ok(state) => {
                self.preset_num = slot;
                self.set_state(&state);
                debug!("loaded preset {}", slot);
            }
            Err(PresetError::OutOfRange { .. }) => {
                warn!("preset {} does not exist", slot);
            }
            Err(err) => {
                self.preset_num = slot;
                warn!("preset {} unreadable ({}); keeping current settings", slot, err);
            }
        }
    }

    /// Store the current state in the current slot.
    pub fn write_preset(&mut self) -> Result<(), PresetError> {
        self.presets.write_preset(self.preset_num, &self.state)
    }

    pub fn preset_header(&self) -> PresetHeader {
        self.presets.header()
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    // ----------------------------------------------------------------------
    // State

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Apply a full preset: every operator plus the voice-wide settings.
    pub fn set_state(&mut self, state: &VoiceState) {
        self.state = *state;
        for voice in &mut self.voices {
            voice.apply_state(state);
        }
        self.set_monophonic(state.monophonic);
    }

    pub fn operator_to_edit(&self) -> usize {
        self.operator_to_edit
    }

    pub fn set_operator_to_edit(&mut self, op: usize) {
        if op < NUM_OPERATORS {
            self.operator_to_edit = op;
        }
    }

    /// Waveform index (0-based) of the operator being edited.
    pub fn current_wave_num(&self) -> usize {
        self.state.operators[self.operator_to_edit].wave.index()
    }

    pub fn preset_num(&self) -> usize {
        self.preset_num
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn num_voices(&self) -> usize {
        self.voices.len()
    }

    /// Voices that are not idle.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|voice| !voice.is_idle()).count()
    }

    fn edit_operator(&mut self, op: usize, edit: impl FnOnce(&mut OperatorState)) {
        let Some(state) = self.state.operators.get_mut(op) else {
            warn!("operator {} does not exist", op);
            return;
        };
        edit(state);

        let state = *state;
        for voice in &mut self.voices {
            if let Some(operator) = voice.operator_mut(op) {
                operator.apply_state(&state);
            }
        }
    }

    /// Hz in fixed mode, ratio in ratio mode. Clamped to the mode's range.
    pub fn set_operator_freq(&mut self, op: usize, frequency: f32) {
        self.edit_operator(op, |s| {
            let range = if s.use_ratio {
                params::RATIO
            } else {
                params::FREQUENCY
            };
            s.frequency = range.clamp(frequency);
        });
    }

    pub fn set_operator_wave(&mut self, op: usize, wave: OscillatorMode) {
        self.edit_operator(op, |s| s.wave = wave);
    }

    pub fn set_operator_eg_attack(&mut self, op: usize, seconds: f32, expo: f32) {
        self.edit_operator(op, |s| {
            s.attack = params::ATTACK.clamp(seconds);
            s.attack_expo = params::EXPO.clamp(expo);
        });
    }

    pub fn set_operator_eg_decay(&mut self, op: usize, seconds: f32, expo: f32) {
        self.edit_operator(op, |s| {
            s.decay = params::DECAY.clamp(seconds);
            s.decay_expo = params::EXPO.clamp(expo);
        });
    }

    pub fn set_operator_eg_sustain(&mut self, op: usize, level: f32) {
        self.edit_operator(op, |s| s.sustain = params::SUSTAIN.clamp(level));
    }

    pub fn set_operator_eg_release(&mut self, op: usize, seconds: f32, expo: f32) {
        self.edit_operator(op, |s| {
            s.release = params::RELEASE.clamp(seconds);
            s.release_expo = params::EXPO.clamp(expo);
        });
    }

    pub fn set_operator_eg_mod_destination(&mut self, op: usize, dest: EgModDestination, on: bool) {
        self.edit_operator(op, |s| s.eg_destinations.set(dest, on));
    }

    /// How strongly operator `source` modulates operator `dest`.
    pub fn set_operator_modulation(&mut self, source: usize, dest: usize, amount: f32) {
        if source >= NUM_OPERATORS {
            warn!("modulation source {} does not exist", source);
            return;
        }
        self.edit_operator(dest, |s| s.mod_amounts[source] = params::OP_MOD.clamp(amount));
    }

    pub fn set_operator_amplitude(&mut self, op: usize, amplitude: f32) {
        self.edit_operator(op, |s| s.amplitude = params::AMPLITUDE.clamp(amplitude));
    }

    pub fn set_operator_filter_freq(&mut self, op: usize, frequency: f32) {
        self.edit_operator(op, |s| s.filter_freq = params::FILTER_FREQ.clamp(frequency));
    }

    pub fn set_operator_filter_res(&mut self, op: usize, resonance: f32) {
        self.edit_operator(op, |s| s.filter_res = params::FILTER_RES.clamp(resonance));
    }

    pub fn set_operator_ratio(&mut self, op: usize, use_ratio: bool) {
        self.edit_operator(op, |s| s.use_ratio = use_ratio);
    }

    pub fn set_operator_amp_vel_sens(&mut self, op: usize, sens: f32) {
        self.edit_operator(op, |s| s.amp_vel_sens = params::VELOCITY.clamp(sens));
    }

    pub fn set_operator_filt_vel_sens(&mut self, op: usize, sens: f32) {
        self.edit_operator(op, |s| s.filt_vel_sens = params::VELOCITY.clamp(sens));
    }

    pub fn set_operator_detune(&mut self, op: usize, cents: i32) {
        let (min, max) = (params::DETUNE.min as i32, params::DETUNE.max as i32);
        self.edit_operator(op, |s| s.detune = cents.clamp(min, max));
    }

    /// Switching to mono releases every voice but the first.
    pub fn set_monophonic(&mut self, monophonic: bool) {
        self.state.monophonic = monophonic;
        for (index, voice) in self.voices.iter_mut().enumerate() {
            let leading = index == 0;
            voice.set_use_glide(monophonic && leading);
            if monophonic && !leading && voice.is_gated() {
                voice.release();
            }
        }
    }

    pub fn set_pitch_bend_semitones(&mut self, semitones: u32) {
        let semitones = semitones.clamp(params::PITCH_BEND.min as u32, params::PITCH_BEND.max as u32);
        self.state.pitch_bend_semitones = semitones;
        for voice in &mut self.voices {
            voice.set_pitch_bend_semitones(semitones);
        }
    }

    pub fn set_glide_time(&mut self, seconds: f32) {
        let seconds = params::GLIDE_TIME.clamp(seconds);
        self.state.glide_time = seconds;
        for voice in &mut self.voices {
            voice.set_glide_time(seconds);
        }
    }

    pub fn set_glide_retrigger(&mut self, retrigger: bool) {
        self.state.glide_retrigger = retrigger;
        for voice in &mut self.voices {
            voice.set_glide_retrigger(retrigger);
        }
    }
}

/// Adapt a manager method into a bus handler holding only a weak reference.
fn forward<E: 'static>(
    manager: &Weak<Mutex<VoiceManager>>,
    handler: fn(&mut VoiceManager, &E),
) -> impl FnMut(&E) + Send + 'static {
    let manager = manager.clone();
    move |event: &E| {
        if let Some(manager) = manager.upgrade() {
            handler(&mut lock(&manager), event);
        }
    }
}
