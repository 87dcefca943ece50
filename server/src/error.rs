//! Consolidates mob construction and settings file errors under a common
//! error type

use std::fmt;

#[derive(Debug)]
pub enum Error {
    // A spawn table names an entity kind the registry doesn't know
    UnknownEntityKind(String),
    // The entity kind exists but can't be instantiated as a mob
    NotAMob(String),
    Io(std::io::Error),
    Ron(ron::error::SpannedError),
    RonSer(ron::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntityKind(kind) => write!(f, "Unknown entity kind: {}", kind),
            Self::NotAMob(kind) => write!(f, "Entity kind is not a mob: {}", kind),
            Self::Io(err) => write!(f, "Io error: {}", err),
            Self::Ron(err) => write!(f, "Failed to parse ron: {}", err),
            Self::RonSer(err) => write!(f, "Failed to serialize ron: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Ron(err) => Some(err),
            Self::RonSer(err) => Some(err),
            Self::UnknownEntityKind(_) | Self::NotAMob(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self { Error::Io(err) }
}

impl From<ron::error::SpannedError> for Error {
    fn from(err: ron::error::SpannedError) -> Self { Error::Ron(err) }
}

impl From<ron::Error> for Error {
    fn from(err: ron::Error) -> Self { Error::RonSer(err) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_kind() {
        let err = Error::UnknownEntityKind("wolf".to_owned());
        assert_eq!(err.to_string(), "Unknown entity kind: wolf");
        let err = Error::NotAMob("item".to_owned());
        assert_eq!(err.to_string(), "Entity kind is not a mob: item");
    }

    #[test]
    fn bad_ron_converts() {
        let err: Error = ron::from_str::<u32>("not a number").unwrap_err().into();
        assert!(matches!(err, Error::Ron(_)));
    }
}
