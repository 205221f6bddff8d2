use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{GenerateConfig, LoadConfig, StructureConfig};
use crate::cli::{GenerateArgs, LoadArgs, StructureArgs, parse_atom_ordering};
use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};

pub fn build_generate_config(args: &GenerateArgs) -> Result<GenerateConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(&args.structure)?;

    let structure = merge_structure(&args.structure, &mut file_config, &defaults)?;
    let generate_file = file_config.generate.take().unwrap_or_default();

    let qm_selection = args
        .qm
        .clone()
        .or(generate_file.qm_selection)
        .ok_or_else(|| {
            CliError::Config(
                "A QM selection is required, either via --qm or `generate.qm-selection`."
                    .to_string(),
            )
        })?;
    let mm_selection = args
        .mm
        .clone()
        .or(generate_file.mm_selection)
        .unwrap_or(defaults.mm_selection);
    let output = args.output.clone().or(generate_file.output).ok_or_else(|| {
        CliError::Config(
            "An output path is required, either via --output or `generate.output`.".to_string(),
        )
    })?;

    Ok(GenerateConfig {
        structure,
        qm_selection,
        mm_selection,
        output,
    })
}

pub fn build_load_config(args: &LoadArgs) -> Result<LoadConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(&args.structure)?;

    let structure = merge_structure(&args.structure, &mut file_config, &defaults)?;
    let load_file = file_config.load.take().unwrap_or_default();

    let object = args
        .object
        .clone()
        .or(load_file.object)
        .unwrap_or_else(|| structure.object_name.clone());
    let target_selection = args
        .selection
        .clone()
        .or(load_file.target_selection)
        .unwrap_or(defaults.target_selection);

    Ok(LoadConfig {
        structure,
        input: args.input.clone(),
        object,
        target_selection,
        subset_output: args.output.clone(),
    })
}

fn load_file_config(args: &StructureArgs) -> Result<FileConfig> {
    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    apply_set_values(file_config, &args.set_values)
}

fn merge_structure(
    args: &StructureArgs,
    file_config: &mut FileConfig,
    defaults: &DefaultsConfig,
) -> Result<StructureConfig> {
    let structure_file = file_config.structure.take().unwrap_or_default();

    let path = args
        .structure
        .clone()
        .or(structure_file.path)
        .ok_or_else(|| {
            CliError::Config(
                "A structure file is required, either via --structure or `structure.path`."
                    .to_string(),
            )
        })?;
    let object_name = match args.object_name.clone().or(structure_file.object_name) {
        Some(name) => name,
        None => object_name_from_path(&path)?,
    };
    let atom_ordering = args
        .atom_ordering
        .or(structure_file.atom_ordering)
        .unwrap_or(defaults.atom_ordering);
    let selections = std::mem::take(&mut file_config.selections)
        .into_iter()
        .map(|(name, value)| match value {
            toml::Value::String(expression) => Ok((name, expression)),
            other => Err(CliError::Config(format!(
                "Selection '{}' must be a string expression, found {}",
                name,
                other.type_str()
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StructureConfig {
        path,
        object_name,
        atom_ordering,
        selections,
    })
}

fn object_name_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::Argument(format!(
                "Cannot derive an object name from '{}'; pass --object-name.",
                path.display()
            ))
        })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let value = value_str.to_string();

        match key {
            "structure.path" => {
                config.structure.get_or_insert_with(Default::default).path =
                    Some(PathBuf::from(value));
            }
            "structure.object-name" => {
                config
                    .structure
                    .get_or_insert_with(Default::default)
                    .object_name = Some(value);
            }
            "structure.atom-ordering" => {
                config
                    .structure
                    .get_or_insert_with(Default::default)
                    .atom_ordering = Some(parse_atom_ordering(value_str).map_err(|e| {
                    CliError::Config(format!("Invalid value for {}: {}", key, e))
                })?);
            }
            "generate.qm-selection" => {
                config
                    .generate
                    .get_or_insert_with(Default::default)
                    .qm_selection = Some(value);
            }
            "generate.mm-selection" => {
                config
                    .generate
                    .get_or_insert_with(Default::default)
                    .mm_selection = Some(value);
            }
            "generate.output" => {
                config.generate.get_or_insert_with(Default::default).output =
                    Some(PathBuf::from(value));
            }
            "load.object" => {
                config.load.get_or_insert_with(Default::default).object = Some(value);
            }
            "load.target-selection" => {
                config
                    .load
                    .get_or_insert_with(Default::default)
                    .target_selection = Some(value);
            }
            _ => match key.strip_prefix("selections.") {
                Some(name) if !name.is_empty() => {
                    config
                        .selections
                        .insert(name.to_string(), toml::Value::String(value));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            },
        }
    }
    Ok(config)
}
