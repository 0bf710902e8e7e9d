use crate::api::ChatReply;

/// How the classifier arrived at the latest bot reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningTrace {
    pub intent: String,
    /// Empty when no keyword matched.
    pub matched_keyword: String,
    pub steps: Vec<String>,
}

impl ReasoningTrace {
    pub fn from_reply(reply: &ChatReply) -> Self {
        Self {
            intent: reply.intent.clone(),
            matched_keyword: reply.matched_keyword.clone().unwrap_or_default(),
            steps: reply.steps.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceView<'a> {
    /// No turn has completed yet.
    Unset,
    /// A turn completed but the backend reported no steps.
    Empty(&'a ReasoningTrace),
    Populated(&'a ReasoningTrace),
}

#[derive(Debug, Default)]
pub struct ReasoningTraceHolder {
    current: Option<ReasoningTrace>,
}

impl ReasoningTraceHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, trace: ReasoningTrace) {
        self.current = Some(trace);
    }

    pub fn current(&self) -> Option<&ReasoningTrace> {
        self.current.as_ref()
    }

    pub fn view(&self) -> TraceView<'_> {
        match &self.current {
            None => TraceView::Unset,
            Some(trace) if trace.steps.is_empty() => TraceView::Empty(trace),
            Some(trace) => TraceView::Populated(trace),
        }
    }
}
