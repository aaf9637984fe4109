//! Reading knowledge from a brain directory.
//!
//! A brain directory holds the core knowledge, a bridge mapping, and one
//! file per module:
//!
//! ```text
//! braindata/
//!   basedata.json      [{ "tokens": ["time"], "val": 5.0, "resp": "...", "cmd": "py:..." }, ...]
//!   bridgedata.json    [{ "keywords": ["python", "py"], "module": "python.json" }, ...]
//!   python.json        [{ "tokens": ["list"], "val": 3.0, "resp": "..." }, ...]
//! ```
//!
//! Several bridge records may name the same module file; their keywords are
//! merged. A record naming a file that does not exist is skipped. This is the
//! only place in the crate that touches the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::SourceError;
use crate::knowledge::{EntryDefinition, ModuleDefinition, Registry};
use crate::normalize::Normalizer;

pub const BASE_DATA_FILE: &str = "basedata.json";
pub const BRIDGE_DATA_FILE: &str = "bridgedata.json";

/// One record of `bridgedata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeRecord {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub module: String,
}

/// Parsed, not yet admitted, knowledge.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeSource {
    pub core: Vec<EntryDefinition>,
    pub modules: Vec<ModuleDefinition>,
}

impl KnowledgeSource {
    /// Admit the parsed knowledge into a registry.
    pub fn into_registry(self, normalizer: &Normalizer) -> Result<Registry, SourceError> {
        Ok(Registry::new(self.core, self.modules, normalizer)?)
    }
}

/// A directory of knowledge files.
#[derive(Debug, Clone)]
pub struct BrainDir {
    root: PathBuf,
}

impl BrainDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        BrainDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load(&self) -> Result<KnowledgeSource, SourceError> {
        let base_path = self.root.join(BASE_DATA_FILE);
        if !base_path.is_file() {
            return Err(SourceError::MissingBaseData { path: base_path });
        }
        let core: Vec<EntryDefinition> = read_json(&base_path)?;

        let bridge_path = self.root.join(BRIDGE_DATA_FILE);
        let bridge: Vec<BridgeRecord> = if bridge_path.is_file() {
            read_json(&bridge_path)?
        } else {
            tracing::debug!(path = %bridge_path.display(), "no bridge data, modules disabled");
            Vec::new()
        };

        let modules = self.load_modules(bridge)?;

        tracing::info!(
            root = %self.root.display(),
            core_entries = core.len(),
            modules = modules.len(),
            "loaded brain directory"
        );

        Ok(KnowledgeSource { core, modules })
    }

    fn load_modules(&self, bridge: Vec<BridgeRecord>) -> Result<Vec<ModuleDefinition>, SourceError> {
        // (file name, keywords) in first-seen order
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();

        for record in bridge {
            let file = record.module.trim();
            if file.is_empty() {
                continue;
            }
            if !self.root.join(file).is_file() {
                tracing::warn!(module = file, "bridge names a module file that does not exist");
                continue;
            }

            match grouped.iter_mut().find(|(name, _)| name == file) {
                Some((_, keywords)) => keywords.extend(record.keywords),
                None => grouped.push((file.to_string(), record.keywords)),
            }
        }

        let mut modules = Vec::with_capacity(grouped.len());
        for (file, keywords) in grouped {
            let entries: Vec<EntryDefinition> = read_json(&self.root.join(&file))?;
            modules.push(ModuleDefinition {
                id: module_id(&file),
                trigger_keywords: keywords,
                entries,
            });
        }

        Ok(modules)
    }
}

/// `python_module.json` → `python_module`.
fn module_id(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let text = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        source,
    })
}
