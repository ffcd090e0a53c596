use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid settings file: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not encode settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[allow(dead_code)] // Only returned by builds without the "hooks" feature
    #[error("global hotkeys are not available in this build")]
    Unsupported,

    #[error("could not listen for global input: {0}")]
    Listen(String),
}
