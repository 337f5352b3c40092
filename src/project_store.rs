use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use log::{debug, error, info, trace, warn};
use serde_json::Value;

use crate::{
    clock_id, decode_records, load_collection, load_records, next_id, now_millis, save_collection,
    today, KeyValueStore, Project, ProjectStatus, Result, StoredProject, Timer, WorkdeskError,
    PROJECTS_KEY, TIMERS_KEY,
};

/// Owns the project list and the per-project timer lists.
///
/// Every mutator writes the collection it touched back to the backend
/// before returning. Write failures are logged and otherwise absorbed;
/// call [`ProjectStore::save`] directly to observe them.
pub struct ProjectStore<S: KeyValueStore> {
    /// Where both collections are persisted
    backend: S,

    /// Projects in insertion order
    projects: Vec<Project>,

    /// Timers grouped by owning project id
    timers: BTreeMap<u64, Vec<Timer>>,
}

impl<S: KeyValueStore> ProjectStore<S> {
    /// Loads both collections from `backend`.
    ///
    /// This constructor:
    /// 1. Reads the project list, backfilling fields missing from legacy records
    /// 2. Reads the timer lists
    /// 3. Repairs references between the two that a partial write may have broken
    pub fn open(backend: S) -> Self {
        let fallback_date = today();

        let stored: Vec<StoredProject> = load_records(&backend, PROJECTS_KEY)
            .into_option()
            .unwrap_or_default();
        let mut seen = HashSet::new();
        let mut projects = Vec::with_capacity(stored.len());
        for record in stored {
            if !seen.insert(record.id) {
                warn!("Dropping duplicate project id {} from storage", record.id);
                continue;
            }
            projects.push(record.into_project(fallback_date));
        }

        let raw_timers: BTreeMap<String, Value> = load_collection(&backend, TIMERS_KEY)
            .into_option()
            .unwrap_or_default();
        let mut timers = BTreeMap::new();
        for (key, value) in raw_timers {
            let Ok(project_id) = key.parse::<u64>() else {
                warn!("Ignoring timer list under non-numeric key {:?}", key);
                continue;
            };
            match value {
                Value::Array(values) => {
                    timers.insert(project_id, decode_records(TIMERS_KEY, values));
                }
                other => warn!(
                    "Ignoring timer list of project {} that is not an array: {}",
                    project_id, other
                ),
            }
        }

        let mut store = Self {
            backend,
            projects,
            timers,
        };
        store.reconcile();

        info!(
            "Loaded {} projects with {} timers",
            store.projects.len(),
            store.timers.values().map(Vec::len).sum::<usize>()
        );
        store
    }

    /// Drops orphaned timer lists, gives every project a list and clears
    /// active timer ids that no longer resolve.
    fn reconcile(&mut self) {
        let project_ids: HashSet<u64> = self.projects.iter().map(|p| p.id).collect();
        self.timers.retain(|project_id, list| {
            let keep = project_ids.contains(project_id);
            if !keep {
                warn!(
                    "Dropping {} timers of missing project {}",
                    list.len(),
                    project_id
                );
            }
            keep
        });

        for project in &mut self.projects {
            let list = self.timers.entry(project.id).or_default();
            if let Some(timer_id) = project.active_timer_id {
                if !list.iter().any(|t| t.id == timer_id) {
                    warn!(
                        "Clearing dangling active timer {} on project {}",
                        timer_id, project.id
                    );
                    project.active_timer_id = None;
                }
            }
        }
    }

    /// The backend the store persists to
    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// All projects in insertion order
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Retrieves a project by its ID
    pub fn project(&self, id: u64) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Timers of a project, empty when the project has none or does not exist
    pub fn timers(&self, project_id: u64) -> &[Timer] {
        self.timers
            .get(&project_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The full timer map, keyed by project id
    pub fn timer_lists(&self) -> &BTreeMap<u64, Vec<Timer>> {
        &self.timers
    }

    pub fn timer(&self, project_id: u64, timer_id: u64) -> Option<&Timer> {
        self.timers(project_id).iter().find(|t| t.id == timer_id)
    }

    /// The timer a project shows on its card
    pub fn active_timer(&self, project_id: u64) -> Option<&Timer> {
        let timer_id = self.project(project_id)?.active_timer_id?;
        self.timer(project_id, timer_id)
    }

    /// Searches projects by title and content using fuzzy matching.
    /// Results are sorted by relevance, title matches weighing double.
    pub fn search_projects(&self, query: &str) -> Vec<&Project> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        debug!("Searching projects with query: '{}'", query);
        let matcher = SkimMatcherV2::default();

        let mut scored: Vec<(i64, &Project)> = self
            .projects
            .iter()
            .filter_map(|project| {
                let title_score = matcher.fuzzy_match(&project.title, query).unwrap_or(0);
                let content_score = matcher.fuzzy_match(&project.content, query).unwrap_or(0);
                let score = title_score * 2 + content_score;
                (score > 0).then_some((score, project))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, project)| project).collect()
    }

    /// Creates a project dated today and returns its id
    pub fn add_project(&mut self, title: impl Into<String>) -> u64 {
        self.add_project_on(title, today())
    }

    /// Creates a project with an explicit creation date.
    ///
    /// The id is one past the highest existing id, or 1 for an empty store.
    pub fn add_project_on(&mut self, title: impl Into<String>, create_date: NaiveDate) -> u64 {
        let id = next_id(1, self.projects.iter().map(|p| p.id));
        let project = Project::new(id, title.into(), create_date);
        info!("Adding project {}: {}", id, project.title);

        self.projects.push(project);
        self.timers.insert(id, Vec::new());
        self.persist_projects();
        self.persist_timers();
        id
    }

    /// Deletes a project and all of its timers.
    ///
    /// Returns `false` when there was nothing to delete.
    pub fn delete_project(&mut self, id: u64) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        let removed_project = self.projects.len() != before;
        let removed_timers = self.timers.remove(&id).is_some();

        if removed_project {
            info!("Deleted project {}", id);
            self.persist_projects();
        } else {
            debug!("Project {} not found, nothing to delete", id);
        }
        if removed_timers {
            self.persist_timers();
        }
        removed_project || removed_timers
    }

    pub fn update_project_title(&mut self, id: u64, title: impl Into<String>) -> Result<()> {
        self.project_mut(id)?.title = title.into();
        self.persist_projects();
        Ok(())
    }

    pub fn update_project_content(&mut self, id: u64, content: impl Into<String>) -> Result<()> {
        self.project_mut(id)?.content = content.into();
        self.persist_projects();
        Ok(())
    }

    pub fn update_project_status(&mut self, id: u64, status: ProjectStatus) -> Result<()> {
        let project = self.project_mut(id)?;
        debug!("Project {} status {} -> {}", id, project.status, status);
        project.status = status;
        self.persist_projects();
        Ok(())
    }

    /// Points the project card at one of the project's timers, or clears it.
    ///
    /// A timer id that is not in this project's list is rejected.
    pub fn set_active_timer(&mut self, project_id: u64, timer_id: Option<u64>) -> Result<()> {
        if let Some(timer_id) = timer_id {
            if self.project(project_id).is_some() && self.timer(project_id, timer_id).is_none() {
                warn!(
                    "Refusing to activate timer {} which is not in project {}",
                    timer_id, project_id
                );
                return Err(WorkdeskError::TimerNotFound {
                    project_id,
                    timer_id,
                });
            }
        }

        self.project_mut(project_id)?.active_timer_id = timer_id;
        self.persist_projects();
        Ok(())
    }

    /// Appends a stopped timer to the project and returns its id
    pub fn add_timer(&mut self, project_id: u64, name: impl Into<String>) -> Result<u64> {
        self.add_timer_at(project_id, name, now_millis())
    }

    pub fn add_timer_at(
        &mut self,
        project_id: u64,
        name: impl Into<String>,
        now_ms: i64,
    ) -> Result<u64> {
        if self.project(project_id).is_none() {
            return Err(WorkdeskError::ProjectNotFound { id: project_id });
        }

        let list = self.timers.entry(project_id).or_default();
        let id = clock_id(now_ms, list.iter().map(|t| t.id));
        let timer = Timer::new(id, name.into());
        info!("Adding timer {} ({}) to project {}", id, timer.name, project_id);
        list.push(timer);

        self.persist_timers();
        Ok(id)
    }

    pub fn update_timer_name(
        &mut self,
        project_id: u64,
        timer_id: u64,
        name: impl Into<String>,
    ) -> Result<()> {
        self.timer_mut(project_id, timer_id)?.name = name.into();
        self.persist_timers();
        Ok(())
    }

    /// Starts a stopped timer or stops a running one.
    ///
    /// Returns whether the timer is running afterwards.
    pub fn toggle_timer(&mut self, project_id: u64, timer_id: u64) -> Result<bool> {
        self.toggle_timer_at(project_id, timer_id, now_millis())
    }

    pub fn toggle_timer_at(&mut self, project_id: u64, timer_id: u64, now_ms: i64) -> Result<bool> {
        let timer = self.timer_mut(project_id, timer_id)?;
        let running = timer.toggle(now_ms);
        debug!(
            "Timer {} of project {} {} (elapsed {} ms)",
            timer_id,
            project_id,
            if running { "started" } else { "stopped" },
            timer.elapsed
        );
        self.persist_timers();
        Ok(running)
    }

    /// Removes a timer, clearing the project's active timer if it pointed here.
    ///
    /// Returns `false` when the project or timer does not exist.
    pub fn delete_timer(&mut self, project_id: u64, timer_id: u64) -> bool {
        let Some(list) = self.timers.get_mut(&project_id) else {
            debug!("No timers for project {}", project_id);
            return false;
        };

        let before = list.len();
        list.retain(|t| t.id != timer_id);
        if list.len() == before {
            debug!("Timer {} not found in project {}", timer_id, project_id);
            return false;
        }

        info!("Deleted timer {} from project {}", timer_id, project_id);
        self.persist_timers();

        if let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) {
            if project.active_timer_id == Some(timer_id) {
                project.active_timer_id = None;
                self.persist_projects();
            }
        }
        true
    }

    /// Writes both collections to the backend
    pub fn save(&mut self) -> Result<()> {
        self.save_projects()?;
        self.save_timers()
    }

    fn save_projects(&mut self) -> Result<()> {
        trace!("Saving {} projects", self.projects.len());
        save_collection(&mut self.backend, PROJECTS_KEY, &self.projects)
    }

    fn save_timers(&mut self) -> Result<()> {
        trace!("Saving timers of {} projects", self.timers.len());
        save_collection(&mut self.backend, TIMERS_KEY, &self.timers)
    }

    fn persist_projects(&mut self) {
        if let Err(e) = self.save_projects() {
            error!("Failed to save projects: {}", e);
        }
    }

    fn persist_timers(&mut self) {
        if let Err(e) = self.save_timers() {
            error!("Failed to save timers: {}", e);
        }
    }

    fn project_mut(&mut self, id: u64) -> Result<&mut Project> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(WorkdeskError::ProjectNotFound { id })
    }

    fn timer_mut(&mut self, project_id: u64, timer_id: u64) -> Result<&mut Timer> {
        self.timers
            .get_mut(&project_id)
            .and_then(|list| list.iter_mut().find(|t| t.id == timer_id))
            .ok_or(WorkdeskError::TimerNotFound {
                project_id,
                timer_id,
            })
    }
}
