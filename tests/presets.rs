use std::path::PathBuf;

use armor8::dsp::OscillatorMode;
use armor8::event::EventSystem;
use armor8::preset::{
    FsPresetFile, MemoryPresetFile, PresetHeader, PresetRecord, PresetStore, RecordLayout, VoiceState,
};
use armor8::synth::VoiceManager;
use armor8::Armor8Config;

fn temp_preset_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("armor8-{}-{}.spf", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn config() -> Armor8Config {
    Armor8Config::new().voices(2).preset_capacity(5)
}

#[test]
fn written_preset_survives_restart() {
    let path = temp_preset_path("restart");
    {
        let mut manager = VoiceManager::new(&config(), PresetStore::open(FsPresetFile::new(&path), 5), EventSystem::new());
        manager.load_preset(3);
        manager.set_operator_wave(1, OscillatorMode::Square);
        manager.set_operator_detune(1, -40);
        manager.set_glide_retrigger(true);
        manager.write_preset().unwrap();
    }

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), PresetHeader::SIZE + 5 * VoiceState::SIZE);

    let mut manager = VoiceManager::new(&config(), PresetStore::open(FsPresetFile::new(&path), 5), EventSystem::new());
    assert_eq!(manager.preset_num(), 0);
    assert_eq!(manager.state(), VoiceState::default());

    manager.load_preset(3);
    let state = manager.state();
    assert_eq!(state.operators[1].wave, OscillatorMode::Square);
    assert_eq!(state.operators[1].detune, -40);
    assert!(state.glide_retrigger);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_file_is_created_on_first_start() {
    let path = temp_preset_path("fresh");
    let manager = VoiceManager::new(&config(), PresetStore::open(FsPresetFile::new(&path), 5), EventSystem::new());
    assert!(manager.presets().is_persistent());

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(PresetHeader::decode(&bytes[..PresetHeader::SIZE]).unwrap(), PresetHeader::CURRENT);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn legacy_file_is_upgraded_in_place() {
    let mut old = VoiceState::default();
    old.operators[0].wave = OscillatorMode::Triangle;
    old.operators[0].amplitude = 0.6;
    old.monophonic = true;

    // A 0.x record is a current record with the trailing detune of each
    // operator removed.
    let mut current = vec![0u8; VoiceState::SIZE];
    old.encode(&mut current);
    let operator_size = RecordLayout::Current.operator_size();
    let legacy_operator = RecordLayout::Legacy.operator_size();
    let mut record = Vec::new();
    for op in 0..4 {
        let start = op * operator_size;
        record.extend_from_slice(&current[start..start + legacy_operator]);
    }
    record.extend_from_slice(&current[4 * operator_size..]);

    let header = PresetHeader {
        version_major: 0,
        version_minor: 3,
        version_patch: 0,
        initialized: true,
    };
    let mut image = vec![0u8; PresetHeader::SIZE];
    header.encode(&mut image);
    image.extend_from_slice(&record);
    image.extend_from_slice(&record);

    let file = MemoryPresetFile::with_contents(image);
    let manager = VoiceManager::new(&config(), PresetStore::open(file.clone(), 5), EventSystem::new());

    assert_eq!(manager.preset_header(), PresetHeader::CURRENT);
    assert_eq!(manager.state(), old);
    assert_eq!(file.contents().len(), PresetHeader::SIZE + 5 * VoiceState::SIZE);

    let reopened = PresetStore::open(file, 5);
    assert_eq!(reopened.retrieve_preset::<VoiceState>(1).unwrap(), old);
    assert_eq!(reopened.retrieve_preset::<VoiceState>(4).unwrap(), VoiceState::default());
}
