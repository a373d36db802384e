//! Pipeline orchestration: the only place a draft version is mutated

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::draft::DraftVersion;
use crate::error::{PipelineError, Result, ValidationErrors};
use crate::registry::StageRegistry;
use crate::resolver::{Mode, resolve};
use crate::stage::{StageContext, StageInput, StageKey};

/// How a session is started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Walk every stage from the first one
    Wizard,
    /// Amend one stage of a published version
    SingleStageEdit(StageKey),
}

/// Per-session cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePosition {
    /// Stage awaiting input; `None` once the wizard walked past the last stage
    pub current: Option<StageKey>,
    pub mode: Mode,
    /// Committed stage keys, most recent last
    pub history: Vec<StageKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Active,
    /// Single-stage edit committed
    Finished,
    /// A fatal error occurred
    Aborted,
}

/// A pipeline session over one draft version
#[derive(Debug)]
pub struct PipelineSession<'r> {
    registry: &'r StageRegistry,
    position: PipelinePosition,
    draft: DraftVersion,
    state: SessionState,
}

impl<'r> PipelineSession<'r> {
    /// Start a session in the given mode
    ///
    /// Single-stage edit requires an editable stage and a published draft.
    pub fn start(
        registry: &'r StageRegistry,
        mode: StartMode,
        draft: Option<DraftVersion>,
    ) -> Result<Self> {
        let (position, draft) = match mode {
            StartMode::Wizard => (
                PipelinePosition {
                    current: registry.first(),
                    mode: Mode::Wizard,
                    history: Vec::new(),
                },
                draft.unwrap_or_default(),
            ),
            StartMode::SingleStageEdit(key) => {
                resolve(registry, key, Mode::SingleStageEdit)?;
                let draft = require_published(draft)?;
                (
                    PipelinePosition {
                        current: Some(key),
                        mode: Mode::SingleStageEdit,
                        history: Vec::new(),
                    },
                    draft,
                )
            }
        };

        debug!(mode = ?position.mode, stage = ?position.current, "pipeline session started");
        Ok(Self {
            registry,
            position,
            draft,
            state: SessionState::Active,
        })
    }

    /// Continue a session from a previously saved cursor
    pub fn resume(
        registry: &'r StageRegistry,
        position: PipelinePosition,
        draft: DraftVersion,
    ) -> Result<Self> {
        for key in position.current.iter().chain(&position.history) {
            registry.lookup(*key)?;
        }
        let draft = match (position.mode, position.current) {
            (Mode::Wizard, _) => draft,
            (Mode::SingleStageEdit, Some(_)) if !position.history.is_empty() => {
                return Err(PipelineError::SessionClosed);
            }
            (Mode::SingleStageEdit, Some(key)) => {
                resolve(registry, key, Mode::SingleStageEdit)?;
                require_published(Some(draft))?
            }
            (Mode::SingleStageEdit, None) => return Err(PipelineError::SessionClosed),
        };

        Ok(Self {
            registry,
            position,
            draft,
            state: SessionState::Active,
        })
    }

    /// Validate and commit input for the current stage
    ///
    /// On any error the draft and the cursor are left untouched.
    pub fn submit_stage(&mut self, input: StageInput, ctx: &StageContext) -> Result<()> {
        self.ensure_active()?;
        let registry = self.registry;
        let key = self.position.current.ok_or(PipelineError::SessionClosed)?;
        let variant = self.guard(resolve(registry, key, self.position.mode))?;

        if variant.requires_upstream() {
            let missing = self.missing_before(key)?;
            if !missing.is_empty() {
                return Err(PipelineError::StageLocked {
                    stage: key,
                    missing,
                });
            }
        }

        if let Err(err) = variant.definition.check(&input, ctx) {
            debug!(stage = %key, error = %err, "stage input rejected");
            return Err(err);
        }

        let next = match self.position.mode {
            Mode::Wizard => self.guard(registry.next_after(key))?,
            Mode::SingleStageEdit => None,
        };

        let draft = std::mem::take(&mut self.draft);
        self.draft = variant.definition.apply(draft, input);
        self.position.history.push(key);
        self.position.current = next;

        if self.position.mode == Mode::SingleStageEdit {
            self.state = SessionState::Finished;
            info!(stage = %key, "single-stage edit committed");
        } else {
            debug!(stage = %key, next = ?next, "stage committed");
        }
        Ok(())
    }

    /// Commit the explicit empty value of a skippable stage
    pub fn skip_stage(&mut self, ctx: &StageContext) -> Result<()> {
        self.ensure_active()?;
        let registry = self.registry;
        let key = self.position.current.ok_or(PipelineError::SessionClosed)?;
        let definition = self.guard(registry.lookup(key))?;
        match definition.empty_input {
            Some(empty) => self.submit_stage(empty(), ctx),
            None => Err(PipelineError::Validation(ValidationErrors::single(
                "stage",
                format!("'{key}' cannot be skipped"),
            ))),
        }
    }

    /// Reopen the most recently committed stage
    ///
    /// Committed values stay on the draft; re-submitting overwrites them.
    pub fn back(&mut self) -> Result<StageKey> {
        self.ensure_active()?;
        self.require_wizard("back")?;
        let previous = self
            .position
            .history
            .pop()
            .ok_or(PipelineError::NoHistory)?;
        self.position.current = Some(previous);
        debug!(stage = %previous, "moved back");
        Ok(previous)
    }

    /// Move the wizard cursor to `key` if every preceding mandatory stage committed
    pub fn enter(&mut self, key: StageKey) -> Result<()> {
        self.ensure_active()?;
        self.require_wizard("enter")?;
        let missing = self.missing_before(key)?;
        if !missing.is_empty() {
            return Err(PipelineError::StageLocked {
                stage: key,
                missing,
            });
        }
        self.position.current = Some(key);
        Ok(())
    }

    /// True iff every mandatory stage appears in the history
    pub fn is_complete(&self) -> bool {
        self.registry
            .mandatory_stages()
            .iter()
            .all(|key| self.position.history.contains(key))
    }

    /// Committed mandatory stages out of the total
    pub fn progress(&self) -> (usize, usize) {
        let mandatory = self.registry.mandatory_stages();
        let done = mandatory
            .iter()
            .filter(|key| self.position.history.contains(key))
            .count();
        (done, mandatory.len())
    }

    /// A single-stage edit has committed its stage
    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn is_aborted(&self) -> bool {
        self.state == SessionState::Aborted
    }

    pub fn current_stage(&self) -> Option<StageKey> {
        self.position.current
    }

    pub fn mode(&self) -> Mode {
        self.position.mode
    }

    pub fn history(&self) -> &[StageKey] {
        &self.position.history
    }

    pub fn position(&self) -> &PipelinePosition {
        &self.position
    }

    pub fn draft(&self) -> &DraftVersion {
        &self.draft
    }

    pub fn into_draft(self) -> DraftVersion {
        self.draft
    }

    /// Split into cursor and draft so the caller can hold them between requests
    pub fn into_parts(self) -> (PipelinePosition, DraftVersion) {
        (self.position, self.draft)
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Finished | SessionState::Aborted => Err(PipelineError::SessionClosed),
        }
    }

    fn require_wizard(&mut self, operation: &str) -> Result<()> {
        if self.position.mode == Mode::Wizard {
            return Ok(());
        }
        self.guard(Err(PipelineError::InvalidModeTransition {
            reason: format!("{operation} is only available in wizard mode"),
        }))
    }

    fn missing_before(&mut self, key: StageKey) -> Result<Vec<StageKey>> {
        let registry = self.registry;
        let before = self.guard(registry.mandatory_before(key))?;
        Ok(before
            .into_iter()
            .filter(|k| !self.position.history.contains(k))
            .collect())
    }

    /// Abort the session when `result` carries a fatal error
    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_fatal() {
                warn!(error = %err, "pipeline session aborted");
                self.state = SessionState::Aborted;
            }
        }
        result
    }
}

fn require_published(draft: Option<DraftVersion>) -> Result<DraftVersion> {
    match draft {
        Some(draft) if draft.is_published() => Ok(draft),
        Some(_) => Err(PipelineError::InvalidModeTransition {
            reason: "single-stage edit requires a published version".to_string(),
        }),
        None => Err(PipelineError::InvalidModeTransition {
            reason: "single-stage edit requires an existing version".to_string(),
        }),
    }
}
