use crate::model::mapping::FieldMapping;
use crate::model::pdf::{BackendKind, PdfOptionsOverride};
use serde::{Deserialize, Serialize};

/// Request payload carrying a single local file path, used by the
/// placeholder and column listing endpoints.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PathRequest {
    pub path: String,
}

/// Request payload for `POST /api/merge/start`.
///
/// Only `table_path` and `mapping` are required; every other field overrides
/// the server configuration for this job only.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct StartMergeRequest {
    pub table_path: String,
    #[serde(default)]
    pub template_path: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub mapping: FieldMapping,
    #[serde(default)]
    pub backend: Option<BackendKind>,
    #[serde(default)]
    pub pdf: PdfOptionsOverride,
}
