//! Configuration for dataset file naming

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Result, StorageError};

/// Input and output file names of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Tile data file
    pub art_file: String,

    /// Index file
    pub index_file: String,

    /// Metadata file
    pub tiledata_file: String,

    /// Tile data file written on save
    pub art_output: String,

    /// Index file written on save
    pub index_output: String,

    /// Metadata file written on save
    pub tiledata_output: String,

    /// Match input names ignoring ASCII case (`Art.mul`, `TileData.mul`)
    pub case_insensitive: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            art_file: "art.mul".to_string(),
            index_file: "artidx.mul".to_string(),
            tiledata_file: "tiledata.mul".to_string(),
            art_output: "art_.mul".to_string(),
            index_output: "artidx_.mul".to_string(),
            tiledata_output: "tiledata_.mul".to_string(),
            case_insensitive: true,
        }
    }
}

impl DatasetConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; missing keys take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| StorageError::open(path, e))?;
        serde_json::from_str(&text).map_err(|source| StorageError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Set the input file names
    #[must_use]
    pub fn with_input_names(
        mut self,
        art: impl Into<String>,
        index: impl Into<String>,
        tiledata: impl Into<String>,
    ) -> Self {
        self.art_file = art.into();
        self.index_file = index.into();
        self.tiledata_file = tiledata.into();
        self
    }

    /// Set the output file names
    #[must_use]
    pub fn with_output_names(
        mut self,
        art: impl Into<String>,
        index: impl Into<String>,
        tiledata: impl Into<String>,
    ) -> Self {
        self.art_output = art.into();
        self.index_output = index.into();
        self.tiledata_output = tiledata.into();
        self
    }

    /// Enable or disable case-insensitive input matching
    #[must_use]
    pub const fn with_case_insensitive(mut self, enable: bool) -> Self {
        self.case_insensitive = enable;
        self
    }
}
