//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{Action, ClientError};

pub enum UiEvent {
    Info(String),
    /// Outcome of a backend effect, to be applied to the view state.
    Completed(Action),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Timeout,
    Server,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Characters,
    StartSession,
    Chat,
    EndSession,
    Report,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("timeout") || message_lower.contains("timed out") {
            UiErrorCategory::Timeout
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("failed to reach")
            || message_lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("status") {
            UiErrorCategory::Server
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let (category, message) = match err {
            ClientError::Transport { .. } => (UiErrorCategory::Transport, err.to_string()),
            ClientError::Status { detail, .. } => (
                UiErrorCategory::Server,
                match detail {
                    Some(detail) => format!("{err} ({detail})"),
                    None => err.to_string(),
                },
            ),
            ClientError::Timeout { .. } => (UiErrorCategory::Timeout, err.to_string()),
            ClientError::MalformedPayload { .. } => (UiErrorCategory::Validation, err.to_string()),
        };
        Self {
            category,
            context,
            message,
        }
    }

    /// Failure carried by a backend completion, if any.
    pub fn from_completion(action: &Action) -> Option<Self> {
        let (context, err) = match action {
            Action::CharactersLoaded(Err(err)) => (UiErrorContext::Characters, err),
            Action::SessionStarted {
                result: Err(err), ..
            } => (UiErrorContext::StartSession, err),
            Action::ReplyReceived {
                result: Err(err), ..
            } => (UiErrorContext::Chat, err),
            Action::SessionEnded {
                result: Err(err), ..
            } => (UiErrorContext::EndSession, err),
            Action::ReportLoaded {
                result: Err(err), ..
            } => (UiErrorContext::Report, err),
            _ => return None,
        };
        Some(Self::from_client_error(context, err))
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Timeout => "Timeout",
        UiErrorCategory::Server => "Server",
        UiErrorCategory::Validation => "Data",
        UiErrorCategory::Unknown => "Unexpected",
    }
}
