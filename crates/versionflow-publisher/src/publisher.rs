//! Session boundaries around the version pipeline
//!
//! The publisher opens pipeline sessions, fetches the whitelists a stage
//! needs before handing input to the pipeline, reports every failure to the
//! notification sink and persists versions when a session ends.

use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info};
use versionflow::{
    DraftVersion, Mode, PipelineSession, StageContext, StageInput, StageKey, StageRegistry,
    StartMode, VersionId, resolve,
};

use crate::auth::AuthContext;
use crate::error::{PublisherError, Result};
use crate::notify::{MAIN_GROUP, Notification, NotificationSink};
use crate::storage::VersionStore;
use crate::whitelist::WhitelistSource;

/// A pipeline session plus the project it publishes into
#[derive(Debug)]
pub struct PublishSession {
    pipeline: PipelineSession<'static>,
    project_type: String,
    saved_id: Option<VersionId>,
}

impl PublishSession {
    pub fn pipeline(&self) -> &PipelineSession<'static> {
        &self.pipeline
    }

    pub fn project_type(&self) -> &str {
        &self.project_type
    }

    /// Identifier handed out by the first save, if any
    pub fn saved_id(&self) -> Option<&VersionId> {
        self.saved_id
            .as_ref()
            .or_else(|| self.pipeline.draft().id())
    }

    pub fn current_stage(&self) -> Option<StageKey> {
        self.pipeline.current_stage()
    }

    pub fn back(&mut self) -> Result<StageKey> {
        Ok(self.pipeline.back()?)
    }
}

/// Opens, feeds and closes publishing sessions
pub struct Publisher {
    store: Arc<dyn VersionStore>,
    whitelist: Arc<dyn WhitelistSource>,
    notifier: Arc<dyn NotificationSink>,
    registry: &'static StageRegistry,
    notify_group: String,
}

impl Publisher {
    pub fn new(
        store: Arc<dyn VersionStore>,
        whitelist: Arc<dyn WhitelistSource>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            whitelist,
            notifier,
            registry: StageRegistry::global(),
            notify_group: MAIN_GROUP.to_string(),
        }
    }

    pub fn with_notify_group(mut self, group: impl Into<String>) -> Self {
        self.notify_group = group.into();
        self
    }

    pub fn registry(&self) -> &'static StageRegistry {
        self.registry
    }

    /// Start the creation wizard with a fresh draft
    pub fn begin_wizard(&self, project_type: impl Into<String>) -> Result<PublishSession> {
        let pipeline = PipelineSession::start(self.registry, StartMode::Wizard, None);
        let pipeline = self.reported(pipeline.map_err(PublisherError::from))?;
        Ok(PublishSession {
            pipeline,
            project_type: project_type.into(),
            saved_id: None,
        })
    }

    /// Reopen a draft saved earlier, starting again from the first stage
    pub async fn resume_wizard(
        &self,
        id: &VersionId,
        project_type: impl Into<String>,
    ) -> Result<PublishSession> {
        let draft = self
            .reported(self.store.load(id).await.map_err(PublisherError::from))?;
        let pipeline = PipelineSession::start(self.registry, StartMode::Wizard, Some(draft));
        let pipeline = self.reported(pipeline.map_err(PublisherError::from))?;
        Ok(PublishSession {
            pipeline,
            project_type: project_type.into(),
            saved_id: Some(id.clone()),
        })
    }

    /// Open one stage of a published version for editing
    pub async fn begin_edit(
        &self,
        id: &VersionId,
        stage: StageKey,
        project_type: impl Into<String>,
    ) -> Result<PublishSession> {
        // Stage editability is decided before touching storage
        self.reported(
            resolve(self.registry, stage, Mode::SingleStageEdit)
                .map(|_| ())
                .map_err(PublisherError::from),
        )?;
        let draft = self.reported(self.store.load(id).await.map_err(PublisherError::from))?;
        let pipeline = PipelineSession::start(
            self.registry,
            StartMode::SingleStageEdit(stage),
            Some(draft),
        );
        let pipeline = self.reported(pipeline.map_err(PublisherError::from))?;
        debug!(id = %id, stage = %stage, "single-stage edit opened");
        Ok(PublishSession {
            pipeline,
            project_type: project_type.into(),
            saved_id: Some(id.clone()),
        })
    }

    /// Validate and commit input for the session's current stage
    pub async fn submit(
        &self,
        session: &mut PublishSession,
        input: StageInput,
        auth: &AuthContext,
    ) -> Result<()> {
        let ctx = self.context_for(session, auth).await?;
        let result = session.pipeline.submit_stage(input, &ctx);
        self.reported(result.map_err(PublisherError::from))
    }

    /// Commit the empty value of the current optional stage
    pub async fn skip(&self, session: &mut PublishSession, auth: &AuthContext) -> Result<()> {
        let ctx = self.context_for(session, auth).await?;
        let result = session.pipeline.skip_stage(&ctx);
        self.reported(result.map_err(PublisherError::from))
    }

    /// Persist the draft mid-wizard so it can be resumed later
    pub async fn save_progress(&self, session: &mut PublishSession) -> Result<VersionId> {
        let draft = match &session.saved_id {
            Some(id) => session.pipeline.draft().clone().assign_id(id.clone()),
            None => session.pipeline.draft().clone(),
        };
        let id = self.reported(self.store.save(&draft).await.map_err(PublisherError::from))?;
        info!(id = %id, "draft saved");
        session.saved_id = Some(id.clone());
        Ok(id)
    }

    /// Publish a completed wizard session
    pub async fn finish(&self, session: PublishSession) -> Result<DraftVersion> {
        if session.pipeline.mode() != Mode::Wizard {
            return self.reported(Err(PublisherError::EditNotFinished));
        }
        if !session.pipeline.is_complete() {
            let missing = self
                .registry
                .mandatory_stages()
                .into_iter()
                .filter(|key| !session.pipeline.history().contains(key))
                .collect();
            return self.reported(Err(PublisherError::Incomplete(missing)));
        }

        let saved_id = session.saved_id().cloned();
        let draft = session.pipeline.into_draft();
        let id = match saved_id {
            Some(id) => id,
            None => self.reported(self.store.save(&draft).await.map_err(PublisherError::from))?,
        };

        let published = draft.into_published(id.clone(), OffsetDateTime::now_utc());
        self.reported(self.store.save(&published).await.map_err(PublisherError::from))?;
        info!(id = %id, "version published");
        Ok(published)
    }

    /// Persist a committed single-stage edit
    pub async fn finish_edit(&self, session: PublishSession) -> Result<DraftVersion> {
        if !session.pipeline.is_finished() {
            return self.reported(Err(PublisherError::EditNotFinished));
        }
        let edited = session.pipeline.into_draft();
        let id = self.reported(self.store.save(&edited).await.map_err(PublisherError::from))?;
        info!(id = %id, "version updated");
        Ok(edited)
    }

    /// Drop a session without persisting anything
    pub fn abandon(&self, session: PublishSession) {
        let (done, total) = session.pipeline.progress();
        debug!(done, total, "publishing session abandoned");
    }

    /// Fetch the externally supplied data the current stage validates against
    async fn context_for(
        &self,
        session: &PublishSession,
        auth: &AuthContext,
    ) -> Result<StageContext> {
        match session.pipeline.current_stage() {
            Some(StageKey::Loaders) | Some(StageKey::Targets) => self.reported(
                self.whitelist
                    .stage_context(auth, &session.project_type)
                    .await,
            ),
            _ => Ok(StageContext::new()),
        }
    }

    fn reported<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.notifier
                .notify(Notification::from_publisher_error(&self.notify_group, err));
        }
        result
    }
}
