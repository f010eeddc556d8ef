use log::{debug, info, warn};

use crate::preset::codec::PresetRecord;
use crate::preset::file::{MemoryPresetFile, PresetFile};
use crate::preset::upgrade::PresetUpgrader;
use crate::preset::{PresetError, PresetHeader, VoiceState};

/// Fixed-capacity table of preset records behind a version header.
///
/// The whole table is mirrored in memory; every write rewrites the backing
/// file. If the file cannot be read the store keeps working in memory only
/// and reports itself uninitialized, so the upgrade fills it with defaults.
pub struct PresetStore {
    file: Option<Box<dyn PresetFile>>,
    header: PresetHeader,
    records: Vec<u8>,
    record_size: usize,
    capacity: usize,
}

impl PresetStore {
    /// Open a table of `capacity` voice presets on `file`.
    pub fn open(file: impl PresetFile + 'static, capacity: usize) -> Self {
        Self::open_with_record_size(Box::new(file), VoiceState::SIZE, capacity)
    }

    /// Store with no backing file at all.
    pub fn in_memory(capacity: usize) -> Self {
        Self::open(MemoryPresetFile::new(), capacity)
    }

    fn open_with_record_size(mut file: Box<dyn PresetFile>, record_size: usize, capacity: usize) -> Self {
        let mut store = Self {
            file: None,
            header: PresetHeader::default(),
            records: Vec::new(),
            record_size,
            capacity,
        };

        match file.read() {
            Ok(bytes) if bytes.is_empty() => {
                info!("preset file is empty; starting with an uninitialized table");
            }
            Ok(bytes) => match bytes.get(..PresetHeader::SIZE).map(PresetHeader::decode) {
                Some(Ok(header)) => {
                    store.header = header;
                    store.records = bytes[PresetHeader::SIZE..].to_vec();
                }
                _ => warn!(
                    "preset file too short for a header ({} bytes); starting uninitialized",
                    bytes.len()
                ),
            },
            Err(err) => {
                warn!("could not read preset file ({}); presets will not be saved", err);
                return store;
            }
        }

        store.file = Some(file);
        store
    }

    pub fn header(&self) -> PresetHeader {
        self.header
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// False when the backing file failed and changes only live in memory.
    pub fn is_persistent(&self) -> bool {
        self.file.is_some()
    }

    fn slot_range(&self, slot: usize, record_size: usize) -> Result<std::ops::Range<usize>, PresetError> {
        if slot >= self.capacity {
            return Err(PresetError::OutOfRange {
                slot,
                capacity: self.capacity,
            });
        }
        if record_size != self.record_size {
            return Err(PresetError::RecordSize {
                expected: self.record_size,
                actual: record_size,
            });
        }
        let start = slot * self.record_size;
        Ok(start..start + self.record_size)
    }

    pub fn retrieve_preset<T: PresetRecord>(&self, slot: usize) -> Result<T, PresetError> {
        let range = self.slot_range(slot, T::SIZE)?;
        let bytes = self
            .records
            .get(range)
            .ok_or_else(|| PresetError::Corrupt(format!("preset {} missing from file", slot)))?;
        T::decode(bytes)
    }

    /// Overwrite one slot and flush the table to the backing file.
    pub fn write_preset<T: PresetRecord>(&mut self, slot: usize, preset: &T) -> Result<(), PresetError> {
        let range = self.slot_range(slot, T::SIZE)?;
        let table_len = self.capacity * self.record_size;
        if self.records.len() < table_len {
            self.records.resize(table_len, 0);
        }
        preset.encode(&mut self.records[range]);
        debug!("wrote preset {}", slot);
        self.flush()
    }

    /// Migrate the table to the current layout and persist it if anything changed.
    pub fn upgrade_presets(&mut self, upgrader: &PresetUpgrader) -> Result<(), PresetError> {
        let migration = upgrader.upgrade(&self.records, self.capacity);
        let unchanged = self.header.initialized
            && migration.header == self.header
            && migration.records == self.records;
        if unchanged {
            return Ok(());
        }

        self.header = migration.header;
        self.records = migration.records;
        self.flush()
    }

    fn flush(&mut self) -> Result<(), PresetError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        let mut image = vec![0u8; PresetHeader::SIZE];
        self.header.encode(&mut image);
        image.extend_from_slice(&self.records);
        file.write(&image)?;
        Ok(())
    }
}
