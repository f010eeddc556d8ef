//! Fixed binary layout of the preset file (little-endian).
//!
//! ```text
//! header    i32 major | i32 minor | i32 patch | u8 initialized         13 bytes
//! operator  f32 frequency | u8 use_ratio | u8 wave
//!           f32 attack, attack_expo, decay, decay_expo, sustain,
//!               release, release_expo
//!           u8 eg_amplitude, eg_frequency, eg_filter
//!           f32 mod_amount × 4
//!           f32 amplitude, filter_freq, filter_res, amp_vel, filt_vel
//!           i32 detune                                                77 bytes
//! globals   u8 monophonic | u32 bend_semitones | f32 glide | u8 retrig 10 bytes
//! record    operator × 4 | globals                                   318 bytes
//! ```
//!
//! Version 0.x files predate detune: their operators are 73 bytes and their
//! records 302 bytes.

use crate::dsp::OscillatorMode;
use crate::preset::{EgDestinations, OperatorState, PresetError, PresetHeader, VoiceState};
use crate::NUM_OPERATORS;

const GLOBALS_SIZE: usize = 10;

/// A value with a fixed-size binary image in the preset file.
pub trait PresetRecord: Sized {
    const SIZE: usize;

    /// Write the image into `out[..SIZE]`.
    fn encode(&self, out: &mut [u8]);

    fn decode(bytes: &[u8]) -> Result<Self, PresetError>;
}

/// Operator layouts that have shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayout {
    /// 0.x, no detune
    Legacy,
    /// 1.x
    Current,
}

impl RecordLayout {
    /// Layout used by a file with this header, if it is one we know.
    pub fn for_header(header: &PresetHeader) -> Option<Self> {
        match header.version_major {
            0 => Some(RecordLayout::Legacy),
            1 => Some(RecordLayout::Current),
            _ => None,
        }
    }

    pub const fn operator_size(self) -> usize {
        match self {
            RecordLayout::Legacy => 73,
            RecordLayout::Current => 77,
        }
    }

    pub const fn record_size(self) -> usize {
        self.operator_size() * NUM_OPERATORS + GLOBALS_SIZE
    }
}

impl PresetRecord for PresetHeader {
    const SIZE: usize = 13;

    fn encode(&self, out: &mut [u8]) {
        let mut w = Writer::new(out);
        w.i32(self.version_major);
        w.i32(self.version_minor);
        w.i32(self.version_patch);
        w.bool(self.initialized);
    }

    fn decode(bytes: &[u8]) -> Result<Self, PresetError> {
        let mut r = Reader::new(bytes);
        Ok(PresetHeader {
            version_major: r.i32()?,
            version_minor: r.i32()?,
            version_patch: r.i32()?,
            initialized: r.bool()?,
        })
    }
}

impl PresetRecord for VoiceState {
    const SIZE: usize = RecordLayout::Current.record_size();

    fn encode(&self, out: &mut [u8]) {
        let mut w = Writer::new(out);
        for op in &self.operators {
            encode_operator(&mut w, op);
        }
        w.bool(self.monophonic);
        w.u32(self.pitch_bend_semitones);
        w.f32(self.glide_time);
        w.bool(self.glide_retrigger);
    }

    fn decode(bytes: &[u8]) -> Result<Self, PresetError> {
        decode_voice_state(bytes, RecordLayout::Current, &VoiceState::default())
    }
}

/// Decode a record in any known layout. Fields the layout lacks come from `defaults`.
pub fn decode_voice_state(
    bytes: &[u8],
    layout: RecordLayout,
    defaults: &VoiceState,
) -> Result<VoiceState, PresetError> {
    let mut r = Reader::new(bytes);
    let mut state = *defaults;
    for (op, fallback) in state.operators.iter_mut().zip(defaults.operators.iter()) {
        *op = decode_operator(&mut r, layout, fallback)?;
    }
    state.monophonic = r.bool()?;
    state.pitch_bend_semitones = r.u32()?;
    state.glide_time = r.f32()?;
    state.glide_retrigger = r.bool()?;
    Ok(state)
}

fn encode_operator(w: &mut Writer<'_>, op: &OperatorState) {
    w.f32(op.frequency);
    w.bool(op.use_ratio);
    w.u8(op.wave as u8);
    w.f32(op.attack);
    w.f32(op.attack_expo);
    w.f32(op.decay);
    w.f32(op.decay_expo);
    w.f32(op.sustain);
    w.f32(op.release);
    w.f32(op.release_expo);
    w.bool(op.eg_destinations.amplitude);
    w.bool(op.eg_destinations.frequency);
    w.bool(op.eg_destinations.filter);
    for amount in op.mod_amounts {
        w.f32(amount);
    }
    w.f32(op.amplitude);
    w.f32(op.filter_freq);
    w.f32(op.filter_res);
    w.f32(op.amp_vel_sens);
    w.f32(op.filt_vel_sens);
    w.i32(op.detune);
}

fn decode_operator(
    r: &mut Reader<'_>,
    layout: RecordLayout,
    fallback: &OperatorState,
) -> Result<OperatorState, PresetError> {
    let frequency = r.f32()?;
    let use_ratio = r.bool()?;
    let wave_byte = r.u8()?;
    let wave = OscillatorMode::try_from(wave_byte)
        .map_err(|value| PresetError::Corrupt(format!("unknown waveform {}", value)))?;

    let mut op = OperatorState {
        frequency,
        use_ratio,
        wave,
        attack: r.f32()?,
        attack_expo: r.f32()?,
        decay: r.f32()?,
        decay_expo: r.f32()?,
        sustain: r.f32()?,
        release: r.f32()?,
        release_expo: r.f32()?,
        eg_destinations: EgDestinations {
            amplitude: r.bool()?,
            frequency: r.bool()?,
            filter: r.bool()?,
        },
        mod_amounts: [0.0; NUM_OPERATORS],
        amplitude: 0.0,
        filter_freq: 0.0,
        filter_res: 0.0,
        amp_vel_sens: 0.0,
        filt_vel_sens: 0.0,
        detune: fallback.detune,
    };
    for amount in op.mod_amounts.iter_mut() {
        *amount = r.f32()?;
    }
    op.amplitude = r.f32()?;
    op.filter_freq = r.f32()?;
    op.filter_res = r.f32()?;
    op.amp_vel_sens = r.f32()?;
    op.filt_vel_sens = r.f32()?;
    if layout == RecordLayout::Current {
        op.detune = r.i32()?;
    }
    Ok(op)
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    // Writes past the end of the buffer are dropped.
    fn bytes(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        if let Some(dst) = self.buf.get_mut(self.pos..end) {
            dst.copy_from_slice(bytes);
        }
        self.pos = end;
    }

    fn u8(&mut self, value: u8) {
        self.bytes(&[value]);
    }

    fn bool(&mut self, value: bool) {
        self.u8(value as u8);
    }

    fn i32(&mut self, value: i32) {
        self.bytes(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    fn f32(&mut self, value: f32) {
        self.bytes(&value.to_le_bytes());
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], PresetError> {
        let chunk = self
            .bytes
            .get(self.pos..self.pos + N)
            .and_then(|chunk| <[u8; N]>::try_from(chunk).ok())
            .ok_or_else(|| PresetError::Corrupt(format!("record truncated at byte {}", self.pos)))?;
        self.pos += N;
        Ok(chunk)
    }

    fn u8(&mut self) -> Result<u8, PresetError> {
        Ok(self.take::<1>()?[0])
    }

    fn bool(&mut self) -> Result<bool, PresetError> {
        Ok(self.u8()? != 0)
    }

    fn i32(&mut self) -> Result<i32, PresetError> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn u32(&mut self) -> Result<u32, PresetError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn f32(&mut self) -> Result<f32, PresetError> {
        Ok(f32::from_le_bytes(self.take()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every field away from its default, and different per operator.
    fn busy_state() -> VoiceState {
        let mut state = VoiceState::default();
        for (i, op) in state.operators.iter_mut().enumerate() {
            let n = (i + 1) as f32;
            op.frequency = 110.0 * n;
            op.use_ratio = true;
            op.wave = OscillatorMode::ALL[1 + i % 3];
            op.attack = 0.1 * n;
            op.attack_expo = 10.0 + n;
            op.decay = 0.2 * n;
            op.decay_expo = 20.0 + n;
            op.sustain = 0.9 - 0.1 * n;
            op.release = 0.3 * n;
            op.release_expo = 30.0 + n;
            op.eg_destinations.amplitude = true;
            op.eg_destinations.frequency = i % 2 == 0;
            op.eg_destinations.filter = i % 2 == 1;
            op.mod_amounts = [0.01 * n, 0.02 * n, 0.03 * n, 0.04 * n];
            op.amplitude = 0.15 * n;
            op.filter_freq = 1_000.0 * n;
            op.filter_res = 0.05 * n;
            op.amp_vel_sens = 0.11 * n;
            op.filt_vel_sens = 0.13 * n;
            op.detune = -7 * (i as i32 + 1);
        }
        state.monophonic = true;
        state.pitch_bend_semitones = 12;
        state.glide_time = 0.3;
        state.glide_retrigger = true;
        state
    }

    #[test]
    fn busy_state_leaves_no_field_at_its_default() {
        let default = OperatorState::default();
        let ops = busy_state().operators;
        for op in &ops {
            assert_ne!(op.frequency, default.frequency);
            assert_ne!(op.use_ratio, default.use_ratio);
            assert_ne!(op.wave, default.wave);
            assert_ne!(op.attack, default.attack);
            assert_ne!(op.attack_expo, default.attack_expo);
            assert_ne!(op.decay, default.decay);
            assert_ne!(op.decay_expo, default.decay_expo);
            assert_ne!(op.sustain, default.sustain);
            assert_ne!(op.release, default.release);
            assert_ne!(op.release_expo, default.release_expo);
            assert_ne!(op.eg_destinations, default.eg_destinations);
            assert!(op.mod_amounts.iter().all(|&amount| amount != 0.0));
            assert_ne!(op.amplitude, default.amplitude);
            assert_ne!(op.filter_freq, default.filter_freq);
            assert_ne!(op.filter_res, default.filter_res);
            assert_ne!(op.amp_vel_sens, default.amp_vel_sens);
            assert_ne!(op.filt_vel_sens, default.filt_vel_sens);
            assert_ne!(op.detune, default.detune);
        }
        for pair in ops.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn sizes_match_the_file_format() {
        assert_eq!(PresetHeader::SIZE, 13);
        assert_eq!(VoiceState::SIZE, 318);
        assert_eq!(RecordLayout::Legacy.record_size(), 302);
    }

    #[test]
    fn state_round_trips_byte_exact() {
        let state = busy_state();
        let mut bytes = vec![0u8; VoiceState::SIZE];
        state.encode(&mut bytes);

        let decoded = VoiceState::decode(&bytes).unwrap();
        assert_eq!(decoded, state);

        let mut again = vec![0u8; VoiceState::SIZE];
        decoded.encode(&mut again);
        assert_eq!(again, bytes);
    }

    #[test]
    fn header_layout_is_little_endian() {
        let mut bytes = [0u8; 13];
        PresetHeader::CURRENT.encode(&mut bytes);
        assert_eq!(bytes, [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn unknown_wave_is_corrupt() {
        let mut bytes = vec![0u8; VoiceState::SIZE];
        VoiceState::default().encode(&mut bytes);
        bytes[5] = 9; // wave byte of operator 1
        assert!(matches!(VoiceState::decode(&bytes), Err(PresetError::Corrupt(_))));
    }

    #[test]
    fn truncated_record_is_corrupt() {
        let mut bytes = vec![0u8; VoiceState::SIZE];
        VoiceState::default().encode(&mut bytes);
        assert!(matches!(
            VoiceState::decode(&bytes[..VoiceState::SIZE - 1]),
            Err(PresetError::Corrupt(_))
        ));
    }

    #[test]
    fn any_nonzero_byte_is_true() {
        let mut bytes = vec![0u8; VoiceState::SIZE];
        VoiceState::default().encode(&mut bytes);
        bytes[4] = 0x7f; // use_ratio of operator 1
        assert!(VoiceState::decode(&bytes).unwrap().operators[0].use_ratio);
    }
}
