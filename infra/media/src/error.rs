use std::borrow::Cow;

/// A specialized [`MediaError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Rejected payloads: not an image, unsupported format, bad path.
    #[error("Media validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Filesystem failures while preparing roots or writing files.
    #[error("Media I/O error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal media error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<std::io::Error> for MediaError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source, context: None }
    }
}

/// Adds `.context(...)` to results that convert into [`MediaError`].
pub trait MediaErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, MediaError>;
}

impl<T> MediaErrorExt<T> for Result<T, MediaError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                MediaError::Validation { context: c, .. }
                | MediaError::Io { context: c, .. }
                | MediaError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> MediaErrorExt<T> for Result<T, std::io::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, MediaError> {
        self.map_err(|source| MediaError::Io { source, context: Some(context.into()) })
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
