/// Last-fetched status of a server-side job.
///
/// The server owns the full status object; the client only reads these
/// fields and treats everything else as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobStatus {
    pub message: String,
    pub succeeded: bool,
    pub completed: bool,
    pub snag_messages: Vec<String>,
}

impl JobStatus {
    pub fn running(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            succeeded: false,
            completed: false,
            snag_messages: Vec::new(),
        }
    }

    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            succeeded: true,
            completed: true,
            snag_messages: Vec::new(),
        }
    }

    pub fn failed(message: impl Into<String>, snags: Vec<String>) -> Self {
        Self {
            message: message.into(),
            succeeded: false,
            completed: true,
            snag_messages: snags,
        }
    }
}
