//! Mock judge for tests. Returns scripted feedback and verdicts, counts
//! calls, and can be rigged to fail outright or only for matching content.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::domain::debate::{ParticipantScore, Room, Turn, TurnFeedback};
use crate::domain::foundation::ParticipantId;
use crate::ports::{DebateJudge, JudgeError, Verdict};

/// A scripted judge for exercising handlers without a real model.
pub struct MockJudge {
    feedback: Mutex<TurnFeedback>,
    verdict: Mutex<Verdict>,
    fail_all: bool,
    fail_when_contains: Option<String>,
    analyze_calls: AtomicU32,
    verdict_calls: AtomicU32,
    transcribe_calls: AtomicU32,
}

impl MockJudge {
    /// Judge that scores every turn 8/7/6 and declares no winner.
    pub fn new() -> Self {
        Self {
            feedback: Mutex::new(TurnFeedback {
                logic: 8.0,
                credibility: 7.0,
                rhetoric: 6.0,
                commentary: "Well reasoned.".to_string(),
                strengths: vec!["Clear structure".to_string()],
                weaknesses: vec!["Light on sources".to_string()],
            }),
            verdict: Mutex::new(Verdict {
                winner_id: None,
                summary: "An even match.".to_string(),
                feedback: HashMap::new(),
            }),
            fail_all: false,
            fail_when_contains: None,
            analyze_calls: AtomicU32::new(0),
            verdict_calls: AtomicU32::new(0),
            transcribe_calls: AtomicU32::new(0),
        }
    }

    /// Judge whose every call fails with an unavailable error.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new()
        }
    }

    /// Fails analysis only for turns whose content contains `needle`.
    pub fn fail_when_contains(mut self, needle: impl Into<String>) -> Self {
        self.fail_when_contains = Some(needle.into());
        self
    }

    /// Replaces the scripted per-turn feedback.
    pub fn with_feedback(self, feedback: TurnFeedback) -> Self {
        *self.feedback.lock().unwrap() = feedback;
        self
    }

    /// Replaces the scripted verdict.
    pub fn with_verdict(self, verdict: Verdict) -> Self {
        *self.verdict.lock().unwrap() = verdict;
        self
    }

    pub fn analyze_calls(&self) -> u32 {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn verdict_calls(&self) -> u32 {
        self.verdict_calls.load(Ordering::SeqCst)
    }

    pub fn transcribe_calls(&self) -> u32 {
        self.transcribe_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockJudge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DebateJudge for MockJudge {
    async fn analyze_turn(&self, content: &str, _topic: &str) -> Result<TurnFeedback, JudgeError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all {
            return Err(JudgeError::unavailable("mock judge is down"));
        }
        if let Some(needle) = &self.fail_when_contains {
            if content.contains(needle.as_str()) {
                return Err(JudgeError::unavailable("mock judge rejected content"));
            }
        }
        Ok(self.feedback.lock().unwrap().clone())
    }

    async fn final_verdict(
        &self,
        _room: &Room,
        _turns: &[Turn],
        _scores: &HashMap<ParticipantId, ParticipantScore>,
    ) -> Result<Verdict, JudgeError> {
        self.verdict_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all {
            return Err(JudgeError::unavailable("mock judge is down"));
        }
        Ok(self.verdict.lock().unwrap().clone())
    }

    async fn transcribe_audio(&self, audio_url: &str) -> Result<String, JudgeError> {
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all {
            return Err(JudgeError::unavailable("mock judge is down"));
        }
        Ok(format!("Transcript of {}", audio_url))
    }
}
