/*
Screen layout
=============

    y 0   PR01   OP1   SIN   FIX   POLY  RT-        header cells
    y 7   ─────────────────────────────────────     separator
    y 8   FRQ 1000      DET +0        AMP 1.000
    y 15  ATK 0.000     DEC 0.000     SUS 1.000
    y 22  AEX 0         DEX 0         REL 0.000
    y 29  REX 0         EG A--        AVS 0.000
    y 36  FLT 20000     RES 0.000     FVS 0.000
    y 43  M1 0.000      M2 0.000      M3 0.000
    y 50  M4 0.000      BND 1         GLD 0.000
    y 57  PRESET 01 OP 1                            status line

Every cell owns a fixed rectangle. Text is drawn inside it, one column of
padding on the left, and clipped to it, so redrawing one cell never touches
its neighbours.
*/

use crate::event::{PotControl, PresetChangedEvent};
use crate::preset::{EgModDestination, OperatorState};
use crate::ui::framebuffer::Rect;

pub const ROW_HEIGHT: u32 = 7;
pub const SEPARATOR_Y: u32 = 7;
pub const GRID_TOP: u32 = 8;
pub const STATUS_TOP: u32 = 57;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Preset,
    Operator,
    Wave,
    Ratio,
    Mono,
    GlideRetrigger,
    Frequency,
    Detune,
    Amplitude,
    Attack,
    Decay,
    Sustain,
    AttackExpo,
    DecayExpo,
    Release,
    ReleaseExpo,
    EgDestinations,
    AmpVelSens,
    FilterFreq,
    FilterRes,
    FiltVelSens,
    /// Modulation amount from source operator `n` (0-based).
    Modulation(usize),
    PitchBend,
    GlideTime,
    Status,
}

const HEADER: [(Cell, u32, u32); 6] = [
    (Cell::Preset, 0, 24),
    (Cell::Operator, 24, 20),
    (Cell::Wave, 44, 20),
    (Cell::Ratio, 64, 20),
    (Cell::Mono, 84, 24),
    (Cell::GlideRetrigger, 108, 20),
];

const COLUMNS: [(u32, u32); 3] = [(0, 43), (43, 43), (86, 42)];

const GRID: [[Cell; 3]; 7] = [
    [Cell::Frequency, Cell::Detune, Cell::Amplitude],
    [Cell::Attack, Cell::Decay, Cell::Sustain],
    [Cell::AttackExpo, Cell::DecayExpo, Cell::Release],
    [Cell::ReleaseExpo, Cell::EgDestinations, Cell::AmpVelSens],
    [Cell::FilterFreq, Cell::FilterRes, Cell::FiltVelSens],
    [Cell::Modulation(0), Cell::Modulation(1), Cell::Modulation(2)],
    [Cell::Modulation(3), Cell::PitchBend, Cell::GlideTime],
];

/// Every cell in drawing order.
pub fn cells() -> impl Iterator<Item = Cell> {
    HEADER
        .iter()
        .map(|&(cell, _, _)| cell)
        .chain(GRID.iter().flatten().copied())
        .chain(std::iter::once(Cell::Status))
}

pub fn rect(cell: Cell) -> Rect {
    if cell == Cell::Status {
        return Rect::new(0, STATUS_TOP, 128, ROW_HEIGHT);
    }
    if let Some(&(_, x, width)) = HEADER.iter().find(|(c, _, _)| *c == cell) {
        return Rect::new(x, 0, width, ROW_HEIGHT);
    }
    for (row, cells) in GRID.iter().enumerate() {
        if let Some(col) = cells.iter().position(|c| *c == cell) {
            let (x, width) = COLUMNS[col];
            return Rect::new(x, GRID_TOP + row as u32 * ROW_HEIGHT, width, ROW_HEIGHT);
        }
    }
    // Modulation(n) with n out of range has no place on screen.
    Rect::new(0, 0, 0, 0)
}

/// Cell that shows the parameter a pot event edits.
pub fn cell_for_control(control: PotControl) -> Cell {
    match control {
        PotControl::Frequency => Cell::Frequency,
        PotControl::Detune => Cell::Detune,
        PotControl::Attack => Cell::Attack,
        PotControl::AttackExpo => Cell::AttackExpo,
        PotControl::Decay => Cell::Decay,
        PotControl::DecayExpo => Cell::DecayExpo,
        PotControl::Sustain => Cell::Sustain,
        PotControl::Release => Cell::Release,
        PotControl::ReleaseExpo => Cell::ReleaseExpo,
        PotControl::OpModulation(source) => Cell::Modulation(source),
        PotControl::Amplitude => Cell::Amplitude,
        PotControl::AmpVelSens => Cell::AmpVelSens,
        PotControl::FilterFreq => Cell::FilterFreq,
        PotControl::FilterRes => Cell::FilterRes,
        PotControl::FiltVelSens => Cell::FiltVelSens,
        PotControl::PitchBend => Cell::PitchBend,
        PotControl::GlideTime => Cell::GlideTime,
    }
}

/// At most six characters for any value the synth accepts.
fn number(value: f32) -> String {
    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    if value >= 1000.0 {
        format!("{:.0}", value)
    } else if value >= 100.0 {
        format!("{:.1}", value)
    } else if value >= 10.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.3}", value)
    }
}

fn flag(on: bool, letter: char) -> char {
    if on {
        letter
    } else {
        '-'
    }
}

/// Short label and value for a parameter cell, e.g. `("ATK", "0.250")`.
/// Header and status cells have no label.
pub fn label_and_value(cell: Cell, event: &PresetChangedEvent) -> Option<(String, String)> {
    let state = &event.state;
    let op: &OperatorState = state.operators.get(event.operator_to_edit)?;

    let (label, value) = match cell {
        Cell::Frequency => ("FRQ".to_string(), number(op.frequency)),
        Cell::Detune => ("DET".to_string(), format!("{:+}", op.detune)),
        Cell::Amplitude => ("AMP".to_string(), number(op.amplitude)),
        Cell::Attack => ("ATK".to_string(), number(op.attack)),
        Cell::Decay => ("DEC".to_string(), number(op.decay)),
        Cell::Sustain => ("SUS".to_string(), number(op.sustain)),
        Cell::AttackExpo => ("AEX".to_string(), format!("{:.0}", op.attack_expo)),
        Cell::DecayExpo => ("DEX".to_string(), format!("{:.0}", op.decay_expo)),
        Cell::Release => ("REL".to_string(), number(op.release)),
        Cell::ReleaseExpo => ("REX".to_string(), format!("{:.0}", op.release_expo)),
        Cell::EgDestinations => {
            let eg = &op.eg_destinations;
            let flags = [
                flag(eg.get(EgModDestination::Amplitude), 'A'),
                flag(eg.get(EgModDestination::Frequency), 'F'),
                flag(eg.get(EgModDestination::Filter), 'C'),
            ];
            ("EG".to_string(), flags.iter().collect())
        }
        Cell::AmpVelSens => ("AVS".to_string(), number(op.amp_vel_sens)),
        Cell::FilterFreq => ("FLT".to_string(), number(op.filter_freq)),
        Cell::FilterRes => ("RES".to_string(), number(op.filter_res)),
        Cell::FiltVelSens => ("FVS".to_string(), number(op.filt_vel_sens)),
        Cell::Modulation(source) => (format!("M{}", source + 1), number(*op.mod_amounts.get(source)?)),
        Cell::PitchBend => ("BND".to_string(), state.pitch_bend_semitones.to_string()),
        Cell::GlideTime => ("GLD".to_string(), number(state.glide_time)),
        _ => return None,
    };
    Some((label, value))
}

/// Text shown in `cell` for the given synth state. The status line is owned
/// by the simulator and returns `None`.
pub fn cell_text(cell: Cell, event: &PresetChangedEvent) -> Option<String> {
    let state = &event.state;
    let op = state.operators.get(event.operator_to_edit)?;

    let text = match cell {
        Cell::Preset => format!("PR{:02}", event.preset_num + 1),
        Cell::Operator => format!("OP{}", event.operator_to_edit + 1),
        Cell::Wave => op.wave.label().to_string(),
        Cell::Ratio => String::from(if op.use_ratio { "RAT" } else { "FIX" }),
        Cell::Mono => String::from(if state.monophonic { "MONO" } else { "POLY" }),
        Cell::GlideRetrigger => String::from(if state.glide_retrigger { "RT+" } else { "RT-" }),
        Cell::Status => return None,
        _ => {
            let (label, value) = label_and_value(cell, event)?;
            format!("{} {}", label, value)
        }
    };
    Some(text)
}
