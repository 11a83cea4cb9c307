// ============================================================================
// FILTER PRESETS — named filter chains persisted by filter name
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::ops::filters::Filter;
use crate::ops::processor::{FilterError, ImageProcessor};
use crate::ops::registry::{self, FilterSpec};

/// Magic header for preset files
const PRESET_MAGIC: &str = "FLT1";

/// Upper bound on steps in a loaded preset.
pub const MAX_PRESET_STEPS: usize = 256;

/// File extension used for preset files.
pub const PRESET_EXTENSION: &str = "flp";

/// One step of a preset: a registry name plus an optional intensity
/// override (`None` keeps the registry default).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetStep {
    pub filter: String,
    pub intensity: Option<i32>,
}

impl PresetStep {
    pub fn to_filter(&self) -> Result<Filter, FilterError> {
        let mut filter = registry::resolve(&self.filter)?;
        if let Some(i) = self.intensity {
            filter.set_intensity(i);
        }
        Ok(filter)
    }
}

impl From<&FilterSpec> for PresetStep {
    fn from(spec: &FilterSpec) -> Self {
        Self {
            filter: spec.kind.name().to_string(),
            intensity: spec.intensity,
        }
    }
}

impl From<&Filter> for PresetStep {
    fn from(filter: &Filter) -> Self {
        Self {
            filter: filter.name().to_string(),
            intensity: Some(filter.intensity()),
        }
    }
}

/// A named, ordered filter chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub steps: Vec<PresetStep>,
}

impl Preset {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), steps: Vec::new() }
    }

    pub fn push(&mut self, step: PresetStep) {
        self.steps.push(step);
    }

    /// Resolve every step into a filter, failing on the first unknown name.
    pub fn build_chain(&self) -> Result<Vec<Filter>, FilterError> {
        self.steps.iter().map(PresetStep::to_filter).collect()
    }

    /// Resolve the whole chain, then append it to `processor`'s active
    /// filters in step order.  Steps are not queued by name, so an
    /// intensity override stays attached to its step and nothing is added
    /// if any step fails to resolve.
    pub fn load_into(&self, processor: &mut ImageProcessor) -> Result<(), FilterError> {
        for filter in self.build_chain()? {
            processor.add_filter(filter);
        }
        Ok(())
    }
}

/// On-disk wrapper
#[derive(Serialize, Deserialize)]
struct PresetFile {
    magic: String,
    preset: Preset,
}

/// Error type for preset file operations
#[derive(Debug)]
pub enum PresetError {
    Io(std::io::Error),
    Serialize(String),
    InvalidFormat(String),
    Filter(FilterError),
}

impl std::fmt::Display for PresetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresetError::Io(e) => write!(f, "I/O error: {}", e),
            PresetError::Serialize(e) => write!(f, "Serialization error: {}", e),
            PresetError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
            PresetError::Filter(e) => write!(f, "Invalid preset: {}", e),
        }
    }
}

impl std::error::Error for PresetError {}

impl From<std::io::Error> for PresetError {
    fn from(e: std::io::Error) -> Self {
        PresetError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for PresetError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        PresetError::Serialize(e.to_string())
    }
}

impl From<FilterError> for PresetError {
    fn from(e: FilterError) -> Self {
        PresetError::Filter(e)
    }
}

/// Save a preset file.
pub fn save_preset(preset: &Preset, path: &Path) -> Result<(), PresetError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let data = PresetFile {
        magic: PRESET_MAGIC.to_string(),
        preset: preset.clone(),
    };
    bincode::serialize_into(writer, &data)?;
    log_info!("Saved preset '{}' to {}", preset.name, path.display());
    Ok(())
}

/// Load a preset file.  Every step must name a known filter.
pub fn load_preset(path: &Path) -> Result<Preset, PresetError> {
    // Decode from a slice so a corrupt length prefix fails as a short read
    let raw = std::fs::read(path)?;
    let data: PresetFile = bincode::deserialize(&raw)?;
    if data.magic != PRESET_MAGIC {
        return Err(PresetError::InvalidFormat(format!(
            "Unknown preset header: {:?}",
            data.magic
        )));
    }
    if data.preset.steps.len() > MAX_PRESET_STEPS {
        return Err(PresetError::InvalidFormat(format!(
            "Preset has {} steps, which exceeds the maximum of {}",
            data.preset.steps.len(),
            MAX_PRESET_STEPS
        )));
    }
    data.preset.build_chain()?;
    log_info!(
        "Loaded preset '{}' ({} steps) from {}",
        data.preset.name,
        data.preset.steps.len(),
        path.display()
    );
    Ok(data.preset)
}
