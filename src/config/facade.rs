//! Config loading facade: assembles sources and deserializes the merged result.

use super::merge::builder_with_defaults;
use super::sources::{environment, global_file, workspace_file};
use super::MemoflowConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace: defaults, global file, workspace
    /// files, environment.
    pub fn load(workspace_root: &Path) -> Result<MemoflowConfig, ApiError> {
        let global = global_file::global_config_path();
        Self::load_layers(global.as_deref(), workspace_root)
    }

    /// Load with an explicit global file location.
    pub fn load_layers(
        global_path: Option<&Path>,
        workspace_root: &Path,
    ) -> Result<MemoflowConfig, ApiError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, global_path)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Load from a single explicit file on top of the defaults. The file must exist.
    pub fn load_from_file(path: &Path) -> Result<MemoflowConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = builder_with_defaults()?.add_source(File::from(path));
        let builder = environment::add_to_builder(builder);
        Ok(builder.build()?.try_deserialize()?)
    }
}
