//! Project store: the authoritative saved-project collection.
//!
//! # Responsibility
//! - Create, load, rename, delete and select projects over a storage seam.
//! - Guard autosave against the load feedback loop.
//! - Build and consume share links.
//!
//! # Invariants
//! - `selected` always names a record present in `projects` once the store
//!   is open; deleting the selected project immediately re-selects or
//!   creates a replacement.
//! - `projects` is sorted by `lastEdited` descending before every persist
//!   and whenever exposed to callers.
//! - Autosave persistence is best effort: a failed write is logged and the
//!   next mutation retries; it never aborts the session.

use crate::codec::portable::{compress_to_portable, expand_from_portable, PortableError};
use crate::model::project::{
    validate_project_name, ProjectId, ProjectRecord, ValidationError, DEFAULT_PROJECT_NAME,
};
use crate::model::scene::Scene;
use crate::repo::project_repo::{ProjectStorage, RepoError};
use crate::store::autosave::AutosaveScheduler;
use crate::wire::{decode_wire, encode_wire, from_wire, to_wire, WireError};
use log::{debug, error, info};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Query parameter carrying the share payload.
pub const SHARE_PARAM: &str = "projectData";

/// Everything but the characters that survive percent-encoding unescaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Store-level error: storage transport, name validation, codec failures on
/// the share path, and selection/lookup misses.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
    Validation(ValidationError),
    Portable(PortableError),
    Wire(WireError),
    Json(serde_json::Error),
    NotFound(ProjectId),
    NoSelection,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Portable(err) => write!(f, "{err}"),
            Self::Wire(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "project not found: {id}"),
            Self::NoSelection => write!(f, "no project is selected"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Portable(err) => Some(err),
            Self::Wire(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::NotFound(_) | Self::NoSelection => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PortableError> for StoreError {
    fn from(value: PortableError) -> Self {
        Self::Portable(value)
    }
}

impl From<WireError> for StoreError {
    fn from(value: WireError) -> Self {
        Self::Wire(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Authoritative project collection over a pluggable storage backend.
///
/// Single-threaded and host-driven: the embedding event loop calls
/// `mark_dirty` after each scene mutation and `tick` periodically to run the
/// debounced autosave.
pub struct ProjectStore<S: ProjectStorage> {
    storage: S,
    projects: Vec<ProjectRecord>,
    selected: Option<ProjectId>,
    is_loading: bool,
    autosave: AutosaveScheduler,
}

impl<S: ProjectStorage> ProjectStore<S> {
    /// Hydrates the store from durable storage.
    ///
    /// Selects the most recently edited project and loads it into `scene`,
    /// or creates a fresh default project when storage is empty.
    pub fn open(storage: S, now_ms: i64, scene: &mut Scene) -> Result<Self, StoreError> {
        let mut projects = storage.load_projects()?;
        sort_by_recency(&mut projects);

        let mut store = Self {
            storage,
            projects,
            selected: None,
            is_loading: false,
            autosave: AutosaveScheduler::default(),
        };

        match store.projects.first().map(|record| record.id) {
            Some(id) => store.load_project(id, scene)?,
            None => {
                store.create_project(None, now_ms, scene)?;
            }
        }

        info!(
            "event=store_open module=store status=ok projects={}",
            store.projects.len()
        );
        Ok(store)
    }

    /// Creates, persists and selects a new empty project.
    ///
    /// The name is disambiguated against existing siblings by appending
    /// `" (N)"` until unique. The live scene is reset to empty.
    pub fn create_project(
        &mut self,
        name: Option<&str>,
        now_ms: i64,
        scene: &mut Scene,
    ) -> Result<ProjectId, StoreError> {
        let base = name.unwrap_or(DEFAULT_PROJECT_NAME).trim();
        let unique = self.disambiguate_name(base);
        let record = ProjectRecord::new(unique, now_ms);
        let id = record.id;

        self.projects.push(record);
        self.persist()?;

        self.selected = Some(id);
        self.autosave.cancel();
        *scene = Scene::default();

        info!("event=project_create module=store status=ok project_id={id}");
        Ok(id)
    }

    /// Selects a project and atomically replaces the live scene with its
    /// saved data. Any pending autosave is cancelled first.
    pub fn load_project(&mut self, id: ProjectId, scene: &mut Scene) -> Result<(), StoreError> {
        let record = self
            .projects
            .iter()
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let data = record.data.clone();

        self.begin_load();
        self.selected = Some(id);
        *scene = data;
        self.finish_load();

        info!("event=project_load module=store status=ok project_id={id}");
        Ok(())
    }

    /// Raises the load guard and drops any pending autosave.
    ///
    /// While the guard is up, `save_current` and `mark_dirty` are no-ops, so
    /// a half-populated scene can never be persisted over saved data.
    pub fn begin_load(&mut self) {
        self.is_loading = true;
        self.autosave.cancel();
    }

    pub fn finish_load(&mut self) {
        self.is_loading = false;
    }

    /// Writes a scene snapshot into the selected project and persists.
    ///
    /// Suppressed entirely while a load is in progress.
    pub fn save_current(&mut self, scene: &Scene, now_ms: i64) -> Result<(), StoreError> {
        if self.is_loading {
            debug!("event=project_save module=store status=skipped reason=loading");
            return Ok(());
        }

        let id = self.selected.ok_or(StoreError::NoSelection)?;
        let record = self
            .projects
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        record.data = scene.clone();
        record.last_edited_ms = now_ms;
        self.persist()?;

        debug!("event=project_save module=store status=ok project_id={id}");
        Ok(())
    }

    /// Notes a scene mutation and arms the debounced autosave.
    ///
    /// No-op while a load is in progress.
    pub fn mark_dirty(&mut self, now: Instant) {
        if self.is_loading {
            return;
        }
        self.autosave.request(now);
    }

    /// Runs a due autosave, snapshotting `scene` at fire time.
    ///
    /// Returns whether a save was attempted. A failed storage write is
    /// logged and swallowed; the next `mark_dirty` arms a retry.
    pub fn tick(&mut self, now: Instant, now_ms: i64, scene: &Scene) -> bool {
        if !self.autosave.fire_due(now) {
            return false;
        }

        match self.save_current(scene, now_ms) {
            Ok(()) => info!("event=autosave module=store status=ok"),
            Err(err) => error!("event=autosave module=store status=error error={err}"),
        }
        true
    }

    /// Renames a project after validating the new name.
    pub fn rename_project(
        &mut self,
        id: ProjectId,
        new_name: &str,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        validate_project_name(new_name)?;
        let record = self
            .projects
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        record.name = new_name.trim().to_string();
        record.last_edited_ms = now_ms;
        self.persist()?;

        info!("event=project_rename module=store status=ok project_id={id}");
        Ok(())
    }

    /// Deletes a project. When the selection is deleted, the most recently
    /// edited remaining project is loaded; with none left, a fresh default
    /// project is created.
    pub fn delete_project(
        &mut self,
        id: ProjectId,
        now_ms: i64,
        scene: &mut Scene,
    ) -> Result<(), StoreError> {
        let index = self
            .projects
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.projects.remove(index);
        self.persist()?;

        info!("event=project_delete module=store status=ok project_id={id}");

        if self.selected == Some(id) {
            self.selected = None;
            match self.projects.first().map(|record| record.id) {
                Some(next) => self.load_project(next, scene)?,
                None => {
                    self.create_project(None, now_ms, scene)?;
                }
            }
        }
        Ok(())
    }

    /// Builds a share link for the selected project's saved data.
    pub fn generate_share_link(&self, base_url: &str) -> Result<String, StoreError> {
        let record = self.selected_record().ok_or(StoreError::NoSelection)?;
        let wire = to_wire(&record.name, &record.data);
        let text = encode_wire(&wire)?;
        let portable = compress_to_portable(&text)?;
        let encoded = utf8_percent_encode(&portable, QUERY_VALUE);
        Ok(format!("{base_url}?{SHARE_PARAM}={encoded}"))
    }

    /// Imports a share payload (the decoded `projectData` value) as a new
    /// project, then selects and loads it.
    ///
    /// Importing the same payload twice re-selects the project created the
    /// first time instead of duplicating it.
    pub fn import_from_share_link(
        &mut self,
        payload: &str,
        now_ms: i64,
        scene: &mut Scene,
    ) -> Result<ProjectId, StoreError> {
        if let Some(existing) = self
            .projects
            .iter()
            .find(|record| record.source_link.as_deref() == Some(payload))
        {
            let id = existing.id;
            info!("event=share_import module=store status=deduplicated project_id={id}");
            self.load_project(id, scene)?;
            return Ok(id);
        }

        let text = expand_from_portable(payload)?;
        let wire = decode_wire(&text)?;
        let (name, data) = from_wire(&wire)?;

        let unique = self.disambiguate_name(name.trim());
        let mut record = ProjectRecord::new(unique, now_ms);
        record.data = data;
        record.source_link = Some(payload.to_string());
        let id = record.id;

        self.projects.push(record);
        self.persist()?;
        self.load_project(id, scene)?;

        info!("event=share_import module=store status=ok project_id={id}");
        Ok(id)
    }

    /// Serializes the selected project's saved scene as plain JSON.
    ///
    /// This path bypasses the compact wire form entirely and is lossless.
    pub fn export_project_json(&self) -> Result<String, StoreError> {
        let record = self.selected_record().ok_or(StoreError::NoSelection)?;
        Ok(serde_json::to_string(&record.data)?)
    }

    /// Imports plain JSON as a new project, then selects and loads it.
    ///
    /// Accepts either a full project record (name and scene are taken from
    /// it, identity is minted fresh) or a bare scene document.
    pub fn import_project_json(
        &mut self,
        text: &str,
        now_ms: i64,
        scene: &mut Scene,
    ) -> Result<ProjectId, StoreError> {
        let (name, data) = match serde_json::from_str::<ProjectRecord>(text) {
            Ok(record) => (record.name, record.data),
            Err(_) => {
                let data: Scene = serde_json::from_str(text)?;
                (DEFAULT_PROJECT_NAME.to_string(), data)
            }
        };

        let unique = self.disambiguate_name(name.trim());
        let mut record = ProjectRecord::new(unique, now_ms);
        record.data = data;
        let id = record.id;

        self.projects.push(record);
        self.persist()?;
        self.load_project(id, scene)?;

        info!("event=json_import module=store status=ok project_id={id}");
        Ok(id)
    }

    /// Projects sorted by recency, most recently edited first.
    pub fn projects(&self) -> &[ProjectRecord] {
        &self.projects
    }

    pub fn selected_id(&self) -> Option<ProjectId> {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&ProjectRecord> {
        let id = self.selected?;
        self.projects.iter().find(|record| record.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Read access to the storage backend, mainly for tests and diagnostics.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the store and returns the storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn disambiguate_name(&self, base: &str) -> String {
        if !self.name_taken(base) {
            return base.to_string();
        }
        let mut counter = 2u32;
        loop {
            let candidate = format!("{base} ({counter})");
            if !self.name_taken(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn name_taken(&self, name: &str) -> bool {
        self.projects.iter().any(|record| record.name == name)
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        sort_by_recency(&mut self.projects);
        self.storage.store_projects(&self.projects)?;
        Ok(())
    }
}

fn sort_by_recency(projects: &mut [ProjectRecord]) {
    projects.sort_by(|a, b| b.last_edited_ms.cmp(&a.last_edited_ms));
}

/// Extracts and percent-decodes the share payload from a URL, if present.
pub fn share_payload_from_url(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split_once('#').map_or(query, |(before, _)| before);

    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if key == SHARE_PARAM {
                return percent_decode_str(value)
                    .decode_utf8()
                    .ok()
                    .map(|decoded| decoded.into_owned());
            }
        }
    }
    None
}

/// Removes the share parameter from a URL, keeping every other query pair.
///
/// Consumption is one-shot: callers replace the visible URL with the
/// stripped form after importing.
pub fn strip_share_param(url: &str) -> String {
    let (base, rest) = match url.split_once('?') {
        Some(parts) => parts,
        None => return url.to_string(),
    };
    let (query, fragment) = match rest.split_once('#') {
        Some((query, fragment)) => (query, Some(fragment)),
        None => (rest, None),
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(key, _)| key);
            key != SHARE_PARAM
        })
        .collect();

    let mut stripped = base.to_string();
    if !kept.is_empty() {
        stripped.push('?');
        stripped.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        stripped.push('#');
        stripped.push_str(fragment);
    }
    stripped
}
