//! # Directory-Backed Result Store
//!
//! Keeps runs and models in memory and writes attachments to
//! `<root>/<run-id>/<file-name>`. Writing an attachment again replaces the
//! file. Names that are empty, absolute, or climb out of the run directory
//! are rejected.

use std::path::{Component, Path, PathBuf};

use suro_core::{Model, ModelId, Run, RunId};
use suro_results::{InMemoryStore, ResultStore, StoreError, StoreResult};

/// A [`ResultStore`] writing attachments below a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    entities: InMemoryStore,
}

impl DirectoryStore {
    /// A store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entities: InMemoryStore::new(),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a run's attachments.
    pub fn run_dir(&self, run: &RunId) -> PathBuf {
        self.root.join(run.to_string())
    }

    /// Add or replace a model.
    pub fn insert_model(&self, model: Model) {
        self.entities.insert_model(model);
    }

    /// Add or replace a run.
    pub fn insert_run(&self, run: Run) {
        self.entities.insert_run(run);
    }
}

impl ResultStore for DirectoryStore {
    fn get_run(&self, id: &RunId) -> StoreResult<Option<Run>> {
        self.entities.get_run(id)
    }

    fn get_model(&self, id: &ModelId) -> StoreResult<Option<Model>> {
        self.entities.get_model(id)
    }

    fn attach_as_bytes(
        &self,
        run: &RunId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StoreResult<()> {
        if self.entities.get_run(run)?.is_none() {
            return Err(StoreError::RunNotFound(*run));
        }
        if !is_plain_file_name(file_name) {
            return Err(StoreError::InvalidFileName(file_name.to_string()));
        }
        let dir = self.run_dir(run);
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = dir.join(file_name);
        std::fs::write(&path, &bytes).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), content_type, "wrote attachment");
        Ok(())
    }
}

/// Every component of `name` is a normal path segment.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_under_run_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let run = Run::detached();
        store.insert_run(run.clone());

        store
            .attach_as_bytes(&run.id, "a.csv", "text/csv", b"x,y".to_vec())
            .unwrap();
        let written = std::fs::read(dir.path().join(run.id.to_string()).join("a.csv")).unwrap();
        assert_eq!(written, b"x,y");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("nested"));
        let run = Run::detached();
        store.insert_run(run.clone());

        store.attach_as_bytes(&run.id, "a.csv", "text/csv", b"1".to_vec()).unwrap();
        store.attach_as_bytes(&run.id, "a.csv", "text/csv", b"2".to_vec()).unwrap();
        assert_eq!(std::fs::read(store.run_dir(&run.id).join("a.csv")).unwrap(), b"2");
    }

    #[test]
    fn unknown_run_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        assert!(matches!(
            store.attach_as_bytes(&RunId::new(), "a.csv", "text/csv", vec![]),
            Err(StoreError::RunNotFound(_))
        ));
    }

    #[test]
    fn names_leaving_the_run_directory_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("root"));
        let run = Run::detached();
        store.insert_run(run.clone());

        let outside = dir.path().join("escaped.csv");
        let absolute = outside.display().to_string();
        for name in ["../../escaped.csv", "../escaped.csv", absolute.as_str(), "", "./"] {
            let err = store
                .attach_as_bytes(&run.id, name, "text/csv", b"x".to_vec())
                .unwrap_err();
            assert!(matches!(err, StoreError::InvalidFileName(_)), "{name:?}");
        }
        assert!(!outside.exists());
        assert!(!store.root().exists());
    }

    #[test]
    fn only_normal_components_form_a_plain_name() {
        assert!(is_plain_file_name("a.csv"));
        assert!(is_plain_file_name("reports/a.csv"));
        assert!(!is_plain_file_name("reports/../../a.csv"));
        assert!(!is_plain_file_name("/a.csv"));
    }
}
