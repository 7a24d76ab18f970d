//! Environment and configuration utilities.

use log::{debug, info};
use std::path::Path;

/// Loads environment variables from a dotenv file.
///
/// With no `path`, `.env` is looked up in the current directory and its
/// parents, and a missing file is not an error. An explicit `path` must
/// exist. Variables already set in the environment are never overridden.
///
/// # Examples
///
/// ```
/// use reddit_companion::conf::load_env;
/// use std::path::Path;
///
/// assert!(load_env(Some(Path::new("/does/not/exist.env"))).is_err());
/// ```
pub fn load_env(path: Option<&Path>) -> Result<(), dotenvy::Error> {
    let result = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match result {
        Ok(path) => {
            info!("loaded environment from {}", path.display());
            Ok(())
        }
        Err(err) if path.is_none() && err.not_found() => {
            debug!("no .env file found");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn it_loads_an_explicit_file() {
        let path = env::temp_dir().join("reddit-companion-conf-test.env");
        fs::write(&path, "REDDIT_COMPANION_CONF_TEST=loaded\n").unwrap();
        temp_env::with_var_unset("REDDIT_COMPANION_CONF_TEST", || {
            load_env(Some(&path)).unwrap();
            assert_eq!(env::var("REDDIT_COMPANION_CONF_TEST").unwrap(), "loaded");
        });
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn it_does_not_override_the_environment() {
        let path = env::temp_dir().join("reddit-companion-conf-override.env");
        fs::write(&path, "REDDIT_COMPANION_CONF_OVERRIDE=from_file\n").unwrap();
        temp_env::with_var("REDDIT_COMPANION_CONF_OVERRIDE", Some("from_env"), || {
            load_env(Some(&path)).unwrap();
            assert_eq!(
                env::var("REDDIT_COMPANION_CONF_OVERRIDE").unwrap(),
                "from_env"
            );
        });
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn it_requires_an_explicit_file_to_exist() {
        let err = load_env(Some(Path::new("/does/not/exist.env"))).unwrap_err();
        assert!(err.not_found());
    }
}
