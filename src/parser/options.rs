//! Options controlling how a document is opened.

/// Options for opening PDF documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Password for encrypted documents
    pub password: Option<String>,

    /// Refuse documents whose permissions forbid content extraction
    pub check_extractable: bool,

    /// Whether to reconstruct embedded images
    pub extract_images: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set password for encrypted documents.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enable or disable the extraction permission check.
    pub fn check_extractable(mut self, check: bool) -> Self {
        self.check_extractable = check;
        self
    }

    /// Enable or disable image reconstruction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Extract text only.
    pub fn text_only(self) -> Self {
        self.with_images(false)
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            password: None,
            check_extractable: true,
            extract_images: true,
        }
    }
}
