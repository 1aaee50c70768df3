//! Typed deserialization that reports where in the document it failed.
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(located)
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(located)
}

fn located(err: serde_path_to_error::Error<serde_json::Error>) -> Error {
    Error::Parse {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Case {
        #[allow(dead_code)]
        name: String,
        expected: bool,
    }

    #[test]
    fn error_names_the_failing_path() {
        let err = from_str_with_path::<Vec<Case>>(
            r#"[{"name": "a", "expected": true}, {"name": "b", "expected": "yes"}]"#,
        )
        .unwrap_err();
        match err {
            Error::Parse { path, .. } => assert_eq!(path, "[1].expected"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn well_formed_input_passes_through() {
        let cases: Vec<Case> = from_slice_with_path(br#"[{"name": "a", "expected": false}]"#).unwrap();
        assert!(!cases[0].expected);
    }
}
