//! Dialog adapter answering from a script.

use crate::tracker::{
    domain::TransitionDescriptor,
    ports::{DialogError, TrackerDialogs, TransitionPrompt, WorklogDraft},
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Scripted answer to a worklog dialog.
#[derive(Debug, Clone)]
enum WorklogAnswer {
    Confirm,
    Replace(WorklogDraft),
    Cancel,
}

#[derive(Debug, Default)]
struct Script {
    transitions: VecDeque<Option<TransitionDescriptor>>,
    worklogs: VecDeque<WorklogAnswer>,
    transition_prompts: Vec<TransitionPrompt>,
    worklog_drafts: Vec<WorklogDraft>,
}

/// Answers dialogs from queued responses and records every prompt.
///
/// An empty queue answers with [`DialogError::Cancelled`].
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    script: Mutex<Script>,
}

impl ScriptedDialogs {
    /// Creates dialogs with no queued answers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the transition the user picks next.
    pub fn choose(&self, transition: TransitionDescriptor) {
        self.lock().transitions.push_back(Some(transition));
    }

    /// Queues a dismissed transition dialog.
    pub fn cancel_transition(&self) {
        self.lock().transitions.push_back(None);
    }

    /// Queues a worklog dialog confirmed without edits.
    pub fn confirm_worklog(&self) {
        self.lock().worklogs.push_back(WorklogAnswer::Confirm);
    }

    /// Queues a worklog dialog whose values the user replaced.
    pub fn edit_worklog_to(&self, draft: WorklogDraft) {
        self.lock().worklogs.push_back(WorklogAnswer::Replace(draft));
    }

    /// Queues a dismissed worklog dialog.
    pub fn cancel_worklog(&self) {
        self.lock().worklogs.push_back(WorklogAnswer::Cancel);
    }

    /// Returns the transition prompts shown so far.
    #[must_use]
    pub fn transition_prompts(&self) -> Vec<TransitionPrompt> {
        self.lock().transition_prompts.clone()
    }

    /// Returns the worklog drafts shown so far.
    #[must_use]
    pub fn worklog_drafts(&self) -> Vec<WorklogDraft> {
        self.lock().worklog_drafts.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TrackerDialogs for ScriptedDialogs {
    async fn choose_transition(
        &self,
        prompt: TransitionPrompt,
    ) -> Result<TransitionDescriptor, DialogError> {
        let mut script = self.lock();
        script.transition_prompts.push(prompt);
        script
            .transitions
            .pop_front()
            .flatten()
            .ok_or(DialogError::Cancelled)
    }

    async fn edit_worklog(&self, draft: WorklogDraft) -> Result<WorklogDraft, DialogError> {
        let mut script = self.lock();
        script.worklog_drafts.push(draft.clone());
        match script.worklogs.pop_front() {
            Some(WorklogAnswer::Confirm) => Ok(draft),
            Some(WorklogAnswer::Replace(edited)) => Ok(edited),
            Some(WorklogAnswer::Cancel) | None => Err(DialogError::Cancelled),
        }
    }
}
