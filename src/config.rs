use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::env::EnvConfig;
use crate::nes::NesConfig;
use crate::policy::Policy;
use crate::reward::RewardConfig;

/// Every tuning knob in one place. Any subset may be given in a JSON file;
/// the rest keeps its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterConfig {
    pub env: EnvConfig,
    pub reward: RewardConfig,
    pub policy: Policy,
    pub nes: NesConfig,
}

impl FighterConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config: {}", path.display()))?;
        let config: Self = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.env.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create config: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
