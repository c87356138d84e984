use std::fmt;

use formats::{DocumentError, ParamError};

/// Errors a front end reports to the user.
#[derive(Debug)]
pub enum ViewerError {
    /// The page was opened without a `config` parameter.
    MissingConfig,
    /// The configuration document could not be fetched or parsed. Fatal.
    ConfigFetch(String),
    /// A URL parameter was malformed. Parameters before it were applied.
    ParamDecode(ParamError),
    /// A saved-state file could not be read. The state is unchanged.
    FileLoad(DocumentError),
    /// No WebGL (or equivalent) rendering support. Fatal.
    UnsupportedEnvironment,
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::MissingConfig => write!(
                f,
                "No parameters provided, as a minimum a configuration file is required."
            ),
            ViewerError::ConfigFetch(msg) => {
                write!(f, "Unable to read configuration file: {msg}")
            }
            ViewerError::ParamDecode(err) => write!(f, "{err}"),
            ViewerError::FileLoad(err) => write!(f, "Unable to load state file: {err}"),
            ViewerError::UnsupportedEnvironment => write!(
                f,
                "Your web browser does not appear to support WebGL, which is essential \
                 to this application. Please see: https://get.webgl.org or \
                 https://en.wikipedia.org/wiki/WebGL#Support"
            ),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::ParamDecode(err) => Some(err),
            ViewerError::FileLoad(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParamError> for ViewerError {
    fn from(err: ParamError) -> Self {
        ViewerError::ParamDecode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::ViewerError;
    use formats::{ParamError, ParamKind};

    #[test]
    fn param_errors_name_the_parameter() {
        let err: ViewerError = ParamError { kind: ParamKind::Home }.into();
        assert_eq!(err.to_string(), "Failed to parse url for home");
    }
}
