pub(crate) mod internal;

use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum KvseedError {
    // The store did not answer its health check within the retry budget.
    Unreachable { attempts: u32 },
    // A configuration file could not be read or parsed. Aborts the import.
    Import {
        path: PathBuf,
        cause: Box<dyn error::Error + Send + Sync>,
    },
    // The store rejected a request or could not be reached after connecting.
    Store(String),
    // Invalid process configuration.
    Config(String),
    Io(io::Error),
}

impl fmt::Display for KvseedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KvseedError::Unreachable { attempts } => {
                write!(f, "store unreachable after {} attempts", attempts)
            }
            KvseedError::Import { path, cause } => {
                write!(f, "unable to load properties from {}. {}", path.display(), cause)
            }
            KvseedError::Store(description) => write!(f, "store request failed. {}", description),
            KvseedError::Config(description) => write!(f, "invalid config. {}", description),
            KvseedError::Io(err) => err.fmt(f),
        }
    }
}

impl error::Error for KvseedError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            KvseedError::Import { cause, .. } => Some(cause.as_ref()),
            KvseedError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl KvseedError {
    pub(crate) fn import(path: impl Into<PathBuf>, cause: internal::Error) -> Self {
        if let Some(backtrace) = cause.backtrace() {
            tracing::trace!("{:?}", backtrace);
        }
        KvseedError::Import {
            path: path.into(),
            cause: Box::new(cause),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, KvseedError::Unreachable { .. })
    }
}

impl From<io::Error> for KvseedError {
    fn from(err: io::Error) -> Self {
        KvseedError::Io(err)
    }
}

impl From<reqwest::Error> for KvseedError {
    fn from(err: reqwest::Error) -> Self {
        KvseedError::Store(err.to_string())
    }
}

impl From<serde_yaml::Error> for KvseedError {
    fn from(err: serde_yaml::Error) -> Self {
        KvseedError::Config(err.to_string())
    }
}
