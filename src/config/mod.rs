// Re-export all items from the submodules
mod app_config;

pub use app_config::{
    AppConfig,
    ObsConfig,
    RepositoryConfig,
    default_config_path,
    expand_tilde,
    load_config,
};
