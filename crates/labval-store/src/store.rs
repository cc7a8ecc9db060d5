//! Typed document store for algorithms and workflows.

use chrono::Utc;
use labval_core::{Algorithm, AlgorithmDefinition, DocumentId, Workflow, WorkflowDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::backend::{Collection, StorageBackend};
use crate::error::{Error, Result};
use crate::memory::MemoryBackend;

/// A workflow together with its algorithms, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWorkflow {
    /// The workflow
    pub workflow: Workflow,
    /// Its algorithms, following `algorithmOrder`
    pub algorithms: Vec<Algorithm>,
}

/// CRUD over algorithms and workflows.
///
/// Definitions are normalized and validated before they are written.
/// Cloning is cheap; clones share the backend.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl Store {
    /// Creates a store on top of a backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Creates a store backed by memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Backend name.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Whether the backend can serve requests.
    pub fn is_ready(&self) -> bool {
        self.backend.is_ready()
    }

    // ================================================================
    // Algorithms
    // ================================================================

    /// Lists algorithms, oldest first.
    pub async fn list_algorithms(&self) -> Result<Vec<Algorithm>> {
        let mut algorithms: Vec<Algorithm> = self.load_all(Collection::Algorithms).await?;
        algorithms.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(algorithms)
    }

    /// Fetches an algorithm.
    pub async fn get_algorithm(&self, id: &DocumentId) -> Result<Algorithm> {
        self.load(Collection::Algorithms, id)
            .await?
            .ok_or(Error::AlgorithmNotFound { id: *id })
    }

    /// Stores a new algorithm.
    pub async fn create_algorithm(&self, definition: AlgorithmDefinition) -> Result<Algorithm> {
        let definition = definition.normalized();
        definition.validate()?;
        let algorithm = Algorithm::new(definition);
        self.save(Collection::Algorithms, &algorithm.id, &algorithm)
            .await?;
        tracing::debug!(id = %algorithm.id, name = %algorithm.name(), "Created algorithm");
        Ok(algorithm)
    }

    /// Replaces the body of an existing algorithm.
    pub async fn update_algorithm(
        &self,
        id: &DocumentId,
        definition: AlgorithmDefinition,
    ) -> Result<Algorithm> {
        let existing = self.get_algorithm(id).await?;
        let definition = definition.normalized();
        definition.validate()?;
        let algorithm = Algorithm {
            definition,
            last_modified: Utc::now().max(existing.created),
            ..existing
        };
        self.save(Collection::Algorithms, id, &algorithm).await?;
        tracing::debug!(id = %id, name = %algorithm.name(), "Updated algorithm");
        Ok(algorithm)
    }

    /// Deletes an algorithm.
    ///
    /// Workflows referring to it are left untouched.
    pub async fn delete_algorithm(&self, id: &DocumentId) -> Result<()> {
        if !self
            .backend
            .delete(Collection::Algorithms, &id.to_string())
            .await?
        {
            return Err(Error::AlgorithmNotFound { id: *id });
        }
        tracing::debug!(id = %id, "Deleted algorithm");
        Ok(())
    }

    /// Stores a copy of an algorithm under a new id.
    ///
    /// Without a name the copy is called `"<name> (Copy)"`.
    pub async fn duplicate_algorithm(
        &self,
        id: &DocumentId,
        name: Option<&str>,
    ) -> Result<Algorithm> {
        let source = self.get_algorithm(id).await?;
        let copy = source.definition.duplicate(name)?;
        self.create_algorithm(copy).await
    }

    // ================================================================
    // Workflows
    // ================================================================

    /// Lists workflows, oldest first.
    pub async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        let mut workflows: Vec<Workflow> = self.load_all(Collection::Workflows).await?;
        workflows.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(workflows)
    }

    /// Fetches a workflow.
    pub async fn get_workflow(&self, id: &DocumentId) -> Result<Workflow> {
        self.load(Collection::Workflows, id)
            .await?
            .ok_or(Error::WorkflowNotFound { id: *id })
    }

    /// Stores a new workflow.
    pub async fn create_workflow(&self, definition: WorkflowDefinition) -> Result<Workflow> {
        let definition = self.checked_workflow(definition).await?;
        let workflow = Workflow::new(definition);
        self.save(Collection::Workflows, &workflow.id, &workflow)
            .await?;
        tracing::debug!(id = %workflow.id, name = %workflow.name(), "Created workflow");
        Ok(workflow)
    }

    /// Replaces the body of an existing workflow.
    pub async fn update_workflow(
        &self,
        id: &DocumentId,
        definition: WorkflowDefinition,
    ) -> Result<Workflow> {
        let existing = self.get_workflow(id).await?;
        let definition = self.checked_workflow(definition).await?;
        let workflow = Workflow {
            definition,
            last_modified: Utc::now().max(existing.created),
            ..existing
        };
        self.save(Collection::Workflows, id, &workflow).await?;
        tracing::debug!(id = %id, name = %workflow.name(), "Updated workflow");
        Ok(workflow)
    }

    /// Deletes a workflow.
    pub async fn delete_workflow(&self, id: &DocumentId) -> Result<()> {
        if !self
            .backend
            .delete(Collection::Workflows, &id.to_string())
            .await?
        {
            return Err(Error::WorkflowNotFound { id: *id });
        }
        tracing::debug!(id = %id, "Deleted workflow");
        Ok(())
    }

    /// Fetches a workflow and its algorithms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlgorithmNotFound`] when an algorithm was deleted
    /// after the workflow was saved.
    pub async fn resolve_workflow(&self, id: &DocumentId) -> Result<ResolvedWorkflow> {
        let workflow = self.get_workflow(id).await?;
        let mut algorithms = Vec::with_capacity(workflow.definition.algorithm_order.len());
        for algorithm_id in &workflow.definition.algorithm_order {
            algorithms.push(self.get_algorithm(algorithm_id).await?);
        }
        Ok(ResolvedWorkflow {
            workflow,
            algorithms,
        })
    }

    async fn checked_workflow(&self, definition: WorkflowDefinition) -> Result<WorkflowDefinition> {
        let definition = definition.normalized();
        definition.validate()?;
        for id in &definition.algorithm_order {
            if self.load::<Algorithm>(Collection::Algorithms, id).await?.is_none() {
                return Err(Error::UnknownAlgorithm { id: *id });
            }
        }
        Ok(definition)
    }

    // ================================================================
    // Encoding
    // ================================================================

    async fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<T>> {
        match self.backend.get(collection, &id.to_string()).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn load_all<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        let mut documents = Vec::new();
        for (id, bytes) in self.backend.scan(collection).await? {
            match serde_json::from_slice(&bytes) {
                Ok(document) => documents.push(document),
                Err(e) => {
                    tracing::warn!(%collection, %id, error = %e, "Skipping unreadable document");
                }
            }
        }
        Ok(documents)
    }

    async fn save<T: Serialize + Sync>(
        &self,
        collection: Collection,
        id: &DocumentId,
        document: &T,
    ) -> Result<()> {
        let bytes = serde_json::to_vec(document)?;
        self.backend.put(collection, &id.to_string(), bytes).await
    }
}
