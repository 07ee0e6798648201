use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "umlizer.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub diagram: DiagramConfig,
    pub output: OutputConfig,
}

/// Source discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Substrings or glob patterns; matching paths are skipped
    pub exclude: Vec<String>,
    /// Load files on the rayon pool
    pub parallel: bool,
}

/// Diagram settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub format: OutputFormat,
    pub rank_direction: RankDirection,
    pub comment: String,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output path without extension
    pub target: PathBuf,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Dot,
    Png,
    Svg,
    Pdf,
    Json,
}

impl OutputFormat {
    /// File extension for the artifact
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Dot => "dot",
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Json => "json",
        }
    }

    /// Whether the format needs the Graphviz `dot` executable
    pub fn needs_graphviz(&self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Svg | OutputFormat::Pdf)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dot" | "gv" => Ok(OutputFormat::Dot),
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            "pdf" => Ok(OutputFormat::Pdf),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::config_validation(format!("unknown format: {}", other))),
        }
    }
}

/// Graphviz rank direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RankDirection {
    /// Bases below derived types
    #[default]
    Bt,
    Tb,
    Lr,
    Rl,
}

impl RankDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankDirection::Bt => "BT",
            RankDirection::Tb => "TB",
            RankDirection::Lr => "LR",
            RankDirection::Rl => "RL",
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["__pycache__".to_string()],
            parallel: true,
        }
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            rank_direction: RankDirection::default(),
            comment: "Graph".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target: PathBuf::from("classes"),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        target: Option<PathBuf>,
        exclude: Vec<String>,
        format: Option<OutputFormat>,
    ) {
        if let Some(target) = target {
            self.output.target = target;
        }

        if !exclude.is_empty() {
            self.source.exclude.extend(exclude);
        }

        if let Some(format) = format {
            self.diagram.format = format;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.output.target.as_os_str().is_empty() {
            return Err(Error::config_validation("output target must not be empty"));
        }

        for pattern in &self.source.exclude {
            if pattern.is_empty() {
                return Err(Error::config_validation("exclude patterns must not be empty"));
            }
            if crate::analysis::is_glob(pattern) {
                glob::Pattern::new(pattern)?;
            }
        }

        Ok(())
    }

    /// Path of the artifact for the configured format
    pub fn artifact_path(&self) -> PathBuf {
        self.output.target.with_extension(self.diagram.format.extension())
    }

    /// Path of the DOT source written next to rendered images
    pub fn dot_path(&self) -> PathBuf {
        self.output.target.with_extension(OutputFormat::Dot.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.exclude, vec!["__pycache__".to_string()]);
        assert!(config.source.parallel);
        assert_eq!(config.diagram.format, OutputFormat::Dot);
        assert_eq!(config.diagram.rank_direction, RankDirection::Bt);
        assert_eq!(config.output.target, PathBuf::from("classes"));
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[source]
exclude = ["__pycache__", "tests/**"]
parallel = false

[diagram]
format = "svg"
rank_direction = "LR"

[output]
target = "out/diagram"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.exclude.len(), 2);
        assert!(!config.source.parallel);
        assert_eq!(config.diagram.format, OutputFormat::Svg);
        assert_eq!(config.diagram.rank_direction, RankDirection::Lr);
        assert_eq!(config.output.target, PathBuf::from("out/diagram"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/umlizer.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_empty_target() {
        let mut config = Config::default();
        config.output.target = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_exclude() {
        let mut config = Config::default();
        config.source.exclude.push(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bad_glob() {
        let mut config = Config::default();
        config.source.exclude.push("[unclosed*".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_cli_target() {
        let mut config = Config::default();
        config.merge_cli(Some(PathBuf::from("/tmp/uml")), vec![], None);
        assert_eq!(config.output.target, PathBuf::from("/tmp/uml"));
    }

    #[test]
    fn test_merge_cli_exclude_extends() {
        let mut config = Config::default();
        config.merge_cli(None, vec!["venv".to_string()], None);
        assert_eq!(config.source.exclude, vec!["__pycache__".to_string(), "venv".to_string()]);
    }

    #[test]
    fn test_merge_cli_format() {
        let mut config = Config::default();
        config.merge_cli(None, vec![], Some(OutputFormat::Png));
        assert_eq!(config.diagram.format, OutputFormat::Png);
        assert_eq!(config.artifact_path(), PathBuf::from("classes.png"));
        assert_eq!(config.dot_path(), PathBuf::from("classes.dot"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("gv".parse::<OutputFormat>().unwrap(), OutputFormat::Dot);
        assert!("bmp".parse::<OutputFormat>().is_err());
        assert!(OutputFormat::Svg.needs_graphviz());
        assert!(!OutputFormat::Json.needs_graphviz());
    }

    #[test]
    fn test_rank_direction_parsing() {
        let toml_str = r#"rank_direction = "TB""#;
        let diagram: DiagramConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(diagram.rank_direction, RankDirection::Tb);
        assert_eq!(diagram.rank_direction.as_str(), "TB");
    }
}
