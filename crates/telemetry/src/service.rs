//! Model service introspection surface.
//!
//! Tracking needs three facts about a service: which artifact kinds it
//! packs, which handler kinds its APIs use, and its environment. Kinds are a
//! closed set, each knowing the name it reports under.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Kind of a packed model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Pickle,
    Sklearn,
    Keras,
    Pytorch,
    TensorflowSavedModel,
    Xgboost,
    #[serde(rename = "lightgbm")]
    LightGbm,
    H2o,
    Fastai,
    Onnx,
    TextFile,
}

impl ArtifactKind {
    /// Name reported in the `artifact_types` property
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Pickle => "PickleArtifact",
            Self::Sklearn => "SklearnModelArtifact",
            Self::Keras => "KerasModelArtifact",
            Self::Pytorch => "PytorchModelArtifact",
            Self::TensorflowSavedModel => "TensorflowSavedModelArtifact",
            Self::Xgboost => "XgboostModelArtifact",
            Self::LightGbm => "LightGBMModelArtifact",
            Self::H2o => "H2oModelArtifact",
            Self::Fastai => "FastaiModelArtifact",
            Self::Onnx => "OnnxModelArtifact",
            Self::TextFile => "TextFileArtifact",
        }
    }
}

/// Kind of request handler behind an API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    #[serde(rename = "dataframe")]
    DataFrame,
    Json,
    Image,
    FastaiImage,
    TensorflowTensor,
    Clipper,
}

impl HandlerKind {
    /// Name reported in the `handler_types` property
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::DataFrame => "DataframeHandler",
            Self::Json => "JsonHandler",
            Self::Image => "ImageHandler",
            Self::FastaiImage => "FastaiImageHandler",
            Self::TensorflowTensor => "TensorflowTensorHandler",
            Self::Clipper => "ClipperHandler",
        }
    }
}

/// A named artifact packed with the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceArtifact {
    pub name: String,
    pub kind: ArtifactKind,
}

/// An API endpoint exposed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceApi {
    pub name: String,
    pub handler: HandlerKind,
}

/// Conda environment section of a service env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CondaEnv {
    pub name: String,
    pub channels: Vec<String>,
    pub dependencies: Vec<String>,
}

impl Default for CondaEnv {
    fn default() -> Self {
        Self {
            name: "bentoml-custom-conda-env".to_string(),
            channels: vec!["defaults".to_string()],
            dependencies: Vec::new(),
        }
    }
}

/// Runtime environment a service declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEnv {
    pub setup_sh: Option<String>,
    pub requirements_txt: Option<String>,
    pub conda_env: CondaEnv,
    pub pip_dependencies: Vec<String>,
}

impl ServiceEnv {
    /// Environment as a property mapping. Unset optional entries are omitted.
    pub fn to_properties(&self) -> Map<String, Value> {
        let mut env = Map::new();
        if let Some(ref setup_sh) = self.setup_sh {
            env.insert("setup_sh".into(), json!(setup_sh));
        }
        if let Some(ref requirements) = self.requirements_txt {
            env.insert("requirements_txt".into(), json!(requirements));
        }
        env.insert(
            "conda_env".into(),
            json!({
                "name": self.conda_env.name,
                "channels": self.conda_env.channels,
                "dependencies": self.conda_env.dependencies,
            }),
        );
        env.insert("pip_dependencies".into(), json!(self.pip_dependencies));
        env
    }
}

/// What tracking needs to see of a model service.
pub trait ModelService: Send + Sync {
    /// Packed artifacts, in declaration order
    fn artifacts(&self) -> &[ServiceArtifact];

    /// Exposed APIs, in declaration order
    fn apis(&self) -> &[ServiceApi];

    /// Declared runtime environment
    fn env(&self) -> &ServiceEnv;
}
