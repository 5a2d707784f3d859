//! EDS CLI library
//!
//! This module contains the core CLI logic for the EDS converter: picking
//! the conversion direction from the input extension, deriving the output
//! path and driving the [`Converter`].

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::path::{Path, PathBuf};

use log::{info, warn};

use eds::{
    Converter, EdsError,
    config::{AppConfig, ImportConfig},
};

/// Which way a file is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `.eds` to YAML.
    Import,
    /// YAML to `.eds`.
    Export,
}

impl Direction {
    /// Picks the direction from the extension of `input`.
    ///
    /// # Errors
    ///
    /// Returns `EdsError::Config` for any extension other than `.eds`,
    /// `.yaml` or `.yml`.
    pub fn of(input: &Path) -> Result<Self, EdsError> {
        let extension = input
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("eds") => Ok(Self::Import),
            Some("yaml" | "yml") => Ok(Self::Export),
            _ => Err(EdsError::Config(format!(
                "cannot tell the conversion direction of `{}`; expected an .eds, .yaml or .yml file",
                input.display()
            ))),
        }
    }

    /// Extension of the files this direction writes.
    pub fn output_extension(self) -> &'static str {
        match self {
            Self::Import => "yaml",
            Self::Export => "eds",
        }
    }
}

/// Run the EDS CLI application
///
/// Converts the input file in the direction given by its extension and
/// writes the result to the output path, which defaults to the input path
/// with the other extension.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `EdsError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Schema loading errors
/// - Fatal conversion diagnostics
pub fn run(args: &Args) -> Result<(), EdsError> {
    let input = Path::new(&args.input);
    let direction = Direction::of(input)?;
    let output = args
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension(direction.output_extension()));

    info!(
        input_path = args.input,
        output_path = output.display().to_string(),
        direction:?;
        "Processing document"
    );

    let app_config = apply_overrides(config::load_config(args.config.as_ref())?, args);
    let converter = Converter::new(app_config)?;

    let warnings = match direction {
        Direction::Import => converter.import_file(input, &output)?,
        Direction::Export => converter.export_file(input, &output)?,
    };

    if !warnings.is_empty() {
        warn!(count = warnings.len(); "Conversion finished with warnings");
    }
    info!(output_file = output.display().to_string(); "Document written successfully");

    Ok(())
}

/// Command-line flags win over the configuration file.
fn apply_overrides(config: AppConfig, args: &Args) -> AppConfig {
    if !args.no_images {
        return config;
    }
    let import = ImportConfig::new(false, config.import().inline_comments());
    AppConfig::new(config.schema().clone(), import)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(no_images: bool) -> Args {
        Args {
            input: "woning.eds".to_string(),
            output: None,
            config: None,
            no_images,
            log_level: "off".to_string(),
        }
    }

    #[test]
    fn test_no_images_overrides_config() {
        let config = AppConfig::new(Default::default(), ImportConfig::new(true, false));

        let kept = apply_overrides(config.clone(), &args(false));
        assert!(kept.import().extract_images());

        let overridden = apply_overrides(config, &args(true));
        assert!(!overridden.import().extract_images());
        assert!(!overridden.import().inline_comments());
    }

    #[test]
    fn test_direction_from_extension() {
        assert_eq!(Direction::of(Path::new("a/woning.eds")).unwrap(), Direction::Import);
        assert_eq!(Direction::of(Path::new("woning.yaml")).unwrap(), Direction::Export);
        assert_eq!(Direction::of(Path::new("woning.YML")).unwrap(), Direction::Export);
        assert!(Direction::of(Path::new("woning.txt")).is_err());
        assert!(Direction::of(Path::new("woning")).is_err());
    }

    #[test]
    fn test_output_extension() {
        let input = Path::new("plans/woning.eds");
        let direction = Direction::of(input).unwrap();
        assert_eq!(
            input.with_extension(direction.output_extension()),
            Path::new("plans/woning.yaml")
        );
    }
}
