use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_locale(tag: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidLocale {
                tag: tag.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn rule_syntax(pos: usize, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::RuleSyntax {
                pos,
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_attribute(attribute: impl Into<String>, value: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidAttributeValue {
                attribute: attribute.into(),
                value: value.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_offset(offset: usize, limit: usize) -> Error {
        Error(ErrorKind::InvalidOffset { offset, limit }.into())
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn internal(code: i32, context: impl Into<String>) -> Error {
        Error(
            ErrorKind::Internal {
                code,
                context: context.into(),
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid locale '{tag}': {message}")]
    InvalidLocale { tag: String, message: String },

    #[error("rule syntax error at offset {pos}: {message}")]
    RuleSyntax { pos: usize, message: String },

    #[error("invalid value '{value}' for collation attribute '{attribute}'")]
    InvalidAttributeValue { attribute: String, value: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("offset {offset} out of range 0..={limit}")]
    InvalidOffset { offset: usize, limit: usize },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("internal collation engine failure (status {code}): {context}")]
    Internal { code: i32, context: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
