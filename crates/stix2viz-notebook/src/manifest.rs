//! Asset manifest: which bundled directories the host copies into its
//! extension search path, and which file is the loadable entry module

use crate::error::DisplayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extension directory all assets land in
pub const EXTENSION_DIR: &str = "stix2viz";

/// URL prefix under which the host serves extension assets
pub const EXTENSION_URL_PREFIX: &str = "/nbextensions";

/// Third-party rendering library shipped with the extension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Renderer {
    D3,
    #[default]
    VisNetwork,
    Echarts,
}

impl Renderer {
    pub const ALL: [Renderer; 3] = [Renderer::D3, Renderer::VisNetwork, Renderer::Echarts];

    /// Bundled source directory and module name of the library
    pub fn module_name(&self) -> &'static str {
        match self {
            Renderer::D3 => "d3",
            Renderer::VisNetwork => "vis-network",
            Renderer::Echarts => "echarts",
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module_name())
    }
}

impl FromStr for Renderer {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Renderer::ALL
            .into_iter()
            .find(|r| r.module_name() == s)
            .ok_or_else(|| DisplayError::Manifest(format!("unknown renderer '{}'", s)))
    }
}

/// Host page section an extension is loaded into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Common,
    #[default]
    Notebook,
    Tree,
    Edit,
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub section: Section,
    /// Bundled directory, relative to the package
    #[serde(rename = "src")]
    pub source_dir: String,
    /// Directory under the host's extension path
    #[serde(rename = "dest")]
    pub dest_dir: String,
    /// Loadable module, `<dest>/<name>` without the `.js` suffix
    #[serde(rename = "require", default, skip_serializing_if = "Option::is_none")]
    pub entry_module: Option<String>,
}

impl AssetEntry {
    fn validate(&self) -> Result<(), DisplayError> {
        check_relative_path("src", &self.source_dir)?;
        check_relative_path("dest", &self.dest_dir)?;

        if let Some(entry) = &self.entry_module {
            check_relative_path("require", entry)?;
            let under_dest = entry
                .strip_prefix(self.dest_dir.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .is_some_and(|name| !name.is_empty());
            if !under_dest {
                return Err(DisplayError::Manifest(format!(
                    "entry module '{}' is not inside '{}'",
                    entry, self.dest_dir
                )));
            }
        }
        Ok(())
    }
}

fn check_relative_path(field: &str, path: &str) -> Result<(), DisplayError> {
    if path.is_empty() {
        return Err(DisplayError::Manifest(format!("'{}' must not be empty", field)));
    }
    if path.starts_with('/') || path.split('/').any(|part| part.is_empty() || part == "..") {
        return Err(DisplayError::Manifest(format!(
            "'{}' must be a plain relative path, got '{}'",
            field, path
        )));
    }
    Ok(())
}

/// Ordered list of asset entries for one renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    renderer: Renderer,
    entries: Vec<AssetEntry>,
}

impl AssetManifest {
    /// Icon set, rendering library, then the visualization module
    pub fn for_renderer(renderer: Renderer) -> Self {
        let library = renderer.module_name();
        let entries = vec![
            AssetEntry {
                section: Section::Notebook,
                source_dir: format!("{}/icons", EXTENSION_DIR),
                dest_dir: format!("{}/icons", EXTENSION_DIR),
                entry_module: None,
            },
            AssetEntry {
                section: Section::Notebook,
                source_dir: library.to_string(),
                dest_dir: EXTENSION_DIR.to_string(),
                entry_module: Some(format!("{}/{}", EXTENSION_DIR, library)),
            },
            AssetEntry {
                section: Section::Notebook,
                source_dir: EXTENSION_DIR.to_string(),
                dest_dir: EXTENSION_DIR.to_string(),
                entry_module: Some(format!("{}/{}", EXTENSION_DIR, EXTENSION_DIR)),
            },
        ];

        Self { renderer, entries }
    }

    /// Build from explicit entries, validating each one
    pub fn from_entries(renderer: Renderer, entries: Vec<AssetEntry>) -> Result<Self, DisplayError> {
        let manifest = Self { renderer, entries };
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), DisplayError> {
        for entry in &self.entries {
            entry.validate()?;
        }
        if self.visualization_module().is_none() {
            return Err(DisplayError::Manifest(
                "no entry provides the visualization module".to_string(),
            ));
        }
        Ok(())
    }

    pub fn renderer(&self) -> Renderer {
        self.renderer
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    /// Entry module of the visualization module itself
    pub fn visualization_module(&self) -> Option<&str> {
        self.entries
            .iter()
            .filter_map(|e| e.entry_module.as_deref())
            .find(|module| module.rsplit('/').next() == Some(EXTENSION_DIR))
    }

    /// Module path the loader script requires
    pub fn require_path(&self) -> String {
        let module = self
            .visualization_module()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/{}", EXTENSION_DIR, EXTENSION_DIR));
        format!("{}/{}", EXTENSION_URL_PREFIX.trim_start_matches('/'), module)
    }

    /// URL the host serves the icon set from
    pub fn icon_dir_url(&self) -> String {
        let dest = self
            .entries
            .iter()
            .find(|e| e.entry_module.is_none() && e.dest_dir.ends_with("/icons"))
            .map(|e| e.dest_dir.clone())
            .unwrap_or_else(|| format!("{}/icons", EXTENSION_DIR));
        format!("{}/{}", EXTENSION_URL_PREFIX, dest)
    }

    /// Entries in the `{section, src, dest, require}` form the host reads
    pub fn to_value(&self) -> Result<serde_json::Value, DisplayError> {
        Ok(serde_json::to_value(&self.entries)?)
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::for_renderer(Renderer::default())
    }
}
