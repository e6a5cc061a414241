use std::collections::HashMap;
use std::path::Path;

use crate::models::CaseDefinition;

use super::CaseError;

/// Load a single case definition from a YAML file.
pub fn load_case_file(path: &Path) -> Result<CaseDefinition, CaseError> {
    let raw = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CaseError::NotFound(path.display().to_string())
        } else {
            CaseError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })?;
    serde_yaml::from_str(&raw).map_err(|source| CaseError::Load {
        path: path.display().to_string(),
        source,
    })
}

/// Immutable collection of loaded cases, keyed by `case_id`.
///
/// Populated once at startup; safely shared across sessions afterwards.
pub struct CaseStore {
    cases: HashMap<String, CaseDefinition>,
}

impl CaseStore {
    pub fn new() -> Self {
        Self {
            cases: HashMap::new(),
        }
    }

    /// Load every `*.yaml` / `*.yml` file in a directory. A malformed file
    /// fails the whole load; cases are startup data, not user input.
    pub fn load_dir(dir: &Path) -> Result<Self, CaseError> {
        let entries = std::fs::read_dir(dir).map_err(|source| CaseError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let mut cases = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(|source| CaseError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == "yaml" || e == "yml");
            if !is_yaml {
                continue;
            }
            let case = load_case_file(&path)?;
            tracing::debug!(case_id = %case.case_id, path = %path.display(), "loaded case");
            cases.insert(case.case_id.clone(), case);
        }

        tracing::info!(count = cases.len(), "case store loaded");
        Ok(Self { cases })
    }

    pub fn insert(&mut self, case: CaseDefinition) {
        self.cases.insert(case.case_id.clone(), case);
    }

    pub fn case(&self, case_id: &str) -> Result<&CaseDefinition, CaseError> {
        self.cases
            .get(case_id)
            .ok_or_else(|| CaseError::NotFound(case_id.to_string()))
    }

    pub fn case_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.cases.keys().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl Default for CaseStore {
    fn default() -> Self {
        Self::new()
    }
}
