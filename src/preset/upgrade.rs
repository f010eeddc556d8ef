use log::{info, warn};

use crate::preset::codec::{decode_voice_state, PresetRecord, RecordLayout};
use crate::preset::{PresetHeader, VoiceState};

/// Result of migrating a preset table to the current layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub header: PresetHeader,
    /// `capacity` records of `VoiceState::SIZE` bytes each.
    pub records: Vec<u8>,
}

/// Bring a preset table of any known version up to the current layout.
///
/// - not initialized: every slot becomes `default`
/// - current version: records are kept; missing slots are filled with `default`
/// - legacy 0.x: each record is re-read with the old layout, new fields from `default`
/// - unknown version: every slot becomes `default`
///
/// Running the result back through `migrate` returns it unchanged.
pub fn migrate(
    old_header: PresetHeader,
    old_records: &[u8],
    default: &VoiceState,
    capacity: usize,
) -> Migration {
    let size = VoiceState::SIZE;
    let mut default_image = vec![0u8; size];
    default.encode(&mut default_image);

    let layout = if old_header.initialized {
        RecordLayout::for_header(&old_header)
    } else {
        None
    };

    let mut records = Vec::with_capacity(capacity * size);
    for slot in 0..capacity {
        let migrated = layout.and_then(|layout| {
            let old_size = layout.record_size();
            let chunk = old_records.get(slot * old_size..(slot + 1) * old_size)?;
            match layout {
                RecordLayout::Current => Some(chunk.to_vec()),
                RecordLayout::Legacy => match decode_voice_state(chunk, layout, default) {
                    Ok(state) => {
                        let mut image = vec![0u8; size];
                        state.encode(&mut image);
                        Some(image)
                    }
                    Err(err) => {
                        warn!("legacy preset {} unreadable ({}); using init preset", slot, err);
                        None
                    }
                },
            }
        });
        records.extend_from_slice(migrated.as_deref().unwrap_or(&default_image));
    }

    Migration {
        header: PresetHeader::CURRENT,
        records,
    }
}

/// Carries the init preset and the on-disk header into
/// [`PresetStore::upgrade_presets`](crate::preset::PresetStore::upgrade_presets).
#[derive(Debug, Clone, Copy)]
pub struct PresetUpgrader {
    init_preset: VoiceState,
    on_disk: PresetHeader,
}

impl PresetUpgrader {
    pub fn new(init_preset: VoiceState, on_disk: PresetHeader) -> Self {
        Self {
            init_preset,
            on_disk,
        }
    }

    pub fn init_preset(&self) -> &VoiceState {
        &self.init_preset
    }

    pub fn needs_upgrade(&self) -> bool {
        !self.on_disk.initialized || self.on_disk != PresetHeader::CURRENT
    }

    pub fn upgrade(&self, records: &[u8], capacity: usize) -> Migration {
        if self.needs_upgrade() {
            let (major, minor, patch) = self.on_disk.version();
            info!(
                "migrating presets from {}.{}.{} (initialized: {}) to {}.{}.{}",
                major,
                minor,
                patch,
                self.on_disk.initialized,
                PresetHeader::CURRENT.version_major,
                PresetHeader::CURRENT.version_minor,
                PresetHeader::CURRENT.version_patch,
            );
        }
        migrate(self.on_disk, records, &self.init_preset, capacity)
    }
}
