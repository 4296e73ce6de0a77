use crate::common::*;
use insecurity::config::{AttributionConfig, ExtractionConfig, PreprocessConfig, SelectionConfig};

pub use dataset::*;
pub use model::*;
pub use output::*;

pub static CONFIG_VERSION: Lazy<VersionReq> = Lazy::new(|| VersionReq::parse("0.1.0").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_version")]
    pub version: Version,
    pub model: ModelConfig,
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        Self::from_json5(&text)
    }

    pub fn from_json5(text: &str) -> Result<Self> {
        let config: Self = json5::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Checks constraints across sections.
    pub fn check(&self) -> Result<()> {
        ensure!(
            self.extraction.top_k <= self.selection.num_candidates,
            "extraction.top_k ({}) must not exceed selection.num_candidates ({})",
            self.extraction.top_k,
            self.selection.num_candidates
        );
        ensure!(
            self.model.num_classes >= self.selection.num_candidates,
            "selection.num_candidates ({}) exceeds the number of classes ({})",
            self.selection.num_candidates,
            self.model.num_classes
        );
        self.extraction.budgets.budgets()?;
        Ok(())
    }
}

mod model {
    use super::*;

    /// Model configuration.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ModelConfig {
        /// The classifier checkpoint in VarStore format.
        pub classifier_file: PathBuf,
        /// The difficulty predictor checkpoint in VarStore format.
        pub difficulty_file: PathBuf,
        /// Number of output classes of the classifier.
        pub num_classes: usize,
        /// Number of outputs of the difficulty trunk.
        #[serde(default = "default_trunk_outputs")]
        pub trunk_outputs: usize,
        /// Hidden width of the difficulty head.
        #[serde(default = "default_difficulty_hidden")]
        pub difficulty_hidden: usize,
        /// Probed layer names.
        #[serde(default)]
        pub attribution: AttributionConfig,
        /// The device where the models run on.
        #[serde(with = "tch_serde::serde_device")]
        pub device: Device,
    }

    fn default_trunk_outputs() -> usize {
        1000
    }

    fn default_difficulty_hidden() -> usize {
        512
    }
}

mod dataset {
    use super::*;

    /// Dataset files.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DatasetConfig {
        /// The directory that image paths in the ground truth list are relative to.
        pub image_dir: PathBuf,
        /// Lines of `path label index`.
        pub ground_truth_file: PathBuf,
        /// Lines of 15 (x, y) part coordinates followed by the dataset index.
        pub part_locations_file: PathBuf,
        /// CSV table of attributes shared by class pairs.
        pub attribute_table_file: PathBuf,
        /// Image normalization.
        #[serde(default)]
        pub preprocess: PreprocessConfig,
    }
}

mod output {
    use super::*;

    /// Output options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct OutputConfig {
        /// Results are saved in a timestamped subdirectory.
        pub dir: PathBuf,
    }
}

pub fn deserialize_version<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let version = Version::parse(&text).map_err(|err| {
        D::Error::custom(format!(
            "failed to parse version number '{}': {:?}",
            text, err
        ))
    })?;

    if !CONFIG_VERSION.matches(&version) {
        return Err(D::Error::custom(format!(
            "incompatible version: get '{}', but it is incompatible with requirement '{}'",
            version, &*CONFIG_VERSION,
        )));
    }

    Ok(version)
}
