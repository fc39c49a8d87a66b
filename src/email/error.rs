const RESPONSE_EXCERPT_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryErrorKind {
    /// Expected to resolve on its own shortly; eligible for retry.
    Transient,
    /// Will not resolve by retrying.
    Permanent,
}

/// A failed delivery attempt. The kind drives the retry decision; every
/// other field only feeds the operator-facing diagnostic line.
#[derive(Debug)]
pub struct DeliveryError {
    kind: DeliveryErrorKind,
    message: String,
    code: Option<String>,
    command: Option<String>,
    response_code: Option<u16>,
    response: Option<String>,
}

impl DeliveryError {
    pub fn transient(message: impl Into<String>) -> DeliveryError {
        Self::new(DeliveryErrorKind::Transient, message)
    }

    pub fn permanent(message: impl Into<String>) -> DeliveryError {
        Self::new(DeliveryErrorKind::Permanent, message)
    }

    fn new(kind: DeliveryErrorKind, message: impl Into<String>) -> DeliveryError {
        DeliveryError {
            kind,
            message: message.into(),
            code: None,
            command: None,
            response_code: None,
            response: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> DeliveryError {
        self.code = Some(code.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> DeliveryError {
        self.command = Some(command.into());
        self
    }

    pub fn with_response_code(mut self, response_code: u16) -> DeliveryError {
        self.response_code = Some(response_code);
        self
    }

    pub fn with_response(mut self, response: &str) -> DeliveryError {
        self.response = Some(response.chars().take(RESPONSE_EXCERPT_LENGTH).collect());
        self
    }

    pub fn is_transient(&self) -> bool {
        self.kind == DeliveryErrorKind::Transient
    }

    pub fn response_code(&self) -> Option<u16> {
        self.response_code
    }
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = vec![self.message.clone()];

        if let Some(code) = &self.code {
            parts.push(format!("code={}", code));
        }
        if let Some(command) = &self.command {
            parts.push(format!("command={}", command));
        }
        if let Some(response_code) = self.response_code {
            parts.push(format!("responseCode={}", response_code));
        }
        if let Some(response) = &self.response {
            parts.push(format!("response={}", response));
        }

        write!(f, "{}", parts.join(" | "))
    }
}

impl std::error::Error for DeliveryError {}
