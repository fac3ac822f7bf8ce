use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use strum_macros::{Display, EnumString};

use crate::edge::TiledEdgeEngine;
use crate::image::PngCompression;
use crate::prelude::*;

/// Engine compared against the sequential reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ParallelBackend {
    /// wgpu compute shader. Fails the run when no adapter is present.
    #[default]
    Gpu,
    /// Row bands on the rayon thread pool.
    Cpu,
}

/// Settings for one comparison run. Every field has a default, so an empty
/// YAML document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub input: PathBuf,
    /// Destination of the sequential edge map.
    pub output: PathBuf,
    /// Destination of the parallel edge map, if it should be exported too.
    pub parallel_output: Option<PathBuf>,
    pub backend: ParallelBackend,
    /// Band height for the `cpu` backend.
    pub tile_rows: u32,
    pub max_reported_mismatches: usize,
    pub png_compression: PngCompression,
    pub display: bool,
    /// When set, displayed images are written here instead of only being logged.
    pub preview_dir: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("img/input/clock_S.jpg"),
            output: PathBuf::from("img/output/output.png"),
            parallel_output: None,
            backend: ParallelBackend::Gpu,
            tile_rows: crate::edge::DEFAULT_TILE_ROWS,
            max_reported_mismatches: 10,
            png_compression: PngCompression::Best,
            display: true,
            preview_dir: None,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&data).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn from_yaml(data: &str) -> Result<RunConfig> {
        if data.trim().is_empty() {
            return Ok(RunConfig::default());
        }
        let config: RunConfig = serde_yml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from command-line arguments (program name excluded).
    ///
    /// `--config FILE` supplies the base; every other flag overrides it.
    pub fn from_args<I>(args: I) -> Result<RunConfig>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        let mut config = match args.iter().position(|a| a == "--config") {
            Some(i) => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| Error::Config("--config requires a value".to_string()))?;
                RunConfig::load(path)?
            }
            None => RunConfig::default(),
        };

        config.apply_args(args)?;
        Ok(config)
    }

    /// Applies command-line overrides. `--config` and its value are skipped.
    pub fn apply_args<I>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut input_seen = false;

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| Error::Config(format!("{} requires a value", flag)))
            };

            match arg.as_str() {
                "--config" => {
                    value("--config")?;
                }
                "--backend" => self.backend = parse_value("--backend", &value("--backend")?)?,
                "--output" => self.output = PathBuf::from(value("--output")?),
                "--parallel-output" => {
                    self.parallel_output = Some(PathBuf::from(value("--parallel-output")?))
                }
                "--tile-rows" => {
                    self.tile_rows = parse_value("--tile-rows", &value("--tile-rows")?)?
                }
                "--max-mismatches" => {
                    self.max_reported_mismatches =
                        parse_value("--max-mismatches", &value("--max-mismatches")?)?
                }
                "--png-compression" => {
                    self.png_compression =
                        parse_value("--png-compression", &value("--png-compression")?)?
                }
                "--preview-dir" => self.preview_dir = Some(PathBuf::from(value("--preview-dir")?)),
                "--log-level" => self.log_level = value("--log-level")?,
                "--log-dir" => self.log_dir = Some(PathBuf::from(value("--log-dir")?)),
                "--no-display" => self.display = false,
                flag if flag.starts_with("--") => {
                    return Err(Error::Config(format!("unknown option: {}", flag)));
                }
                positional => {
                    if input_seen {
                        return Err(Error::Config(format!(
                            "unexpected extra argument: {}",
                            positional
                        )));
                    }
                    self.input = PathBuf::from(positional);
                    input_seen = true;
                }
            }
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        TiledEdgeEngine::new(self.tile_rows).map(|_| ())
    }
}

fn parse_value<T>(flag: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| Error::Config(format!("invalid value for {}: {:?} ({})", flag, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.input, PathBuf::from("img/input/clock_S.jpg"));
        assert_eq!(config.output, PathBuf::from("img/output/output.png"));
        assert_eq!(config.backend, ParallelBackend::Gpu);
        assert_eq!(config.tile_rows, 32);
        assert_eq!(config.max_reported_mismatches, 10);
        assert_eq!(config.png_compression, PngCompression::Best);
        assert!(config.display);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(RunConfig::from_yaml("").unwrap(), RunConfig::default());
        assert_eq!(RunConfig::from_yaml("{}").unwrap(), RunConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = "\
backend: cpu
tile_rows: 8
png_compression: fast
parallel_output: out/par.png
";
        let config = RunConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.backend, ParallelBackend::Cpu);
        assert_eq!(config.tile_rows, 8);
        assert_eq!(config.png_compression, PngCompression::Fast);
        assert_eq!(config.parallel_output, Some(PathBuf::from("out/par.png")));
        assert_eq!(config.input, RunConfig::default().input);
    }

    #[test]
    fn test_bad_yaml_values_are_rejected() {
        assert!(matches!(
            RunConfig::from_yaml("backend: quantum\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RunConfig::from_yaml("tile_rows: 0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RunConfig::from_yaml("no_such_field: 1\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_args_override_fields() {
        let mut config = RunConfig::default();
        config
            .apply_args(args(&[
                "--backend",
                "cpu",
                "--tile-rows",
                "4",
                "--max-mismatches",
                "3",
                "--no-display",
                "--output",
                "a.png",
                "--parallel-output",
                "b.png",
                "input.png",
            ]))
            .unwrap();

        assert_eq!(config.backend, ParallelBackend::Cpu);
        assert_eq!(config.tile_rows, 4);
        assert_eq!(config.max_reported_mismatches, 3);
        assert!(!config.display);
        assert_eq!(config.output, PathBuf::from("a.png"));
        assert_eq!(config.parallel_output, Some(PathBuf::from("b.png")));
        assert_eq!(config.input, PathBuf::from("input.png"));
    }

    #[test]
    fn test_bad_args_are_rejected() {
        let cases: [&[&str]; 6] = [
            &["--backend", "fpga"],
            &["--tile-rows", "zero"],
            &["--tile-rows", "0"],
            &["--output"],
            &["--frobnicate"],
            &["a.png", "b.png"],
        ];
        for case in cases {
            let mut config = RunConfig::default();
            assert!(
                matches!(config.apply_args(args(case)), Err(Error::Config(_))),
                "{:?} was accepted",
                case
            );
        }
    }

    #[test]
    fn test_config_file_is_base_for_args() {
        let dir = crate::common::test_utils::test_output_path("config_file");
        fs::create_dir_all(&dir).unwrap();
        let path = Path::new(&dir).join("run.yaml");
        fs::write(&path, "backend: cpu\ntile_rows: 16\ndisplay: false\n").unwrap();

        let config = RunConfig::from_args(args(&[
            "--tile-rows",
            "2",
            "--config",
            path.to_str().unwrap(),
            "photo.jpg",
        ]))
        .unwrap();

        assert_eq!(config.backend, ParallelBackend::Cpu);
        assert_eq!(config.tile_rows, 2);
        assert!(!config.display);
        assert_eq!(config.input, PathBuf::from("photo.jpg"));
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        assert!(matches!(
            RunConfig::load("/nonexistent/edge_parity.yaml"),
            Err(Error::Config(_))
        ));
    }
}
