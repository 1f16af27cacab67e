use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes a physical design session: the libraries to load in order,
/// the design and the configuration flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionManifest {
    pub name: String,
    #[serde(default)]
    pub libraries: Vec<PathBuf>,
    pub design: Option<PathBuf>,
    /// Physical design flags, read leniently.
    #[serde(default)]
    pub settings: Value,
}

impl SessionManifest {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            libraries: Vec::new(),
            design: None,
            settings: Value::Null,
        }
    }

    /// Library paths, relative ones joined to `base`.
    pub fn library_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.libraries.iter().map(|p| resolve(base, p)).collect()
    }

    pub fn design_path(&self, base: &Path) -> Option<PathBuf> {
        self.design.as_deref().map(|p| resolve(base, p))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
