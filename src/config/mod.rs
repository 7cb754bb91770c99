//! Application settings and well-known paths.

mod path;
mod settings;

pub use path::{
    app_config_dir, default_config_file, default_db_dir, home_dir, resolve_path, PathResolver,
    APP_DIR,
};
pub use settings::{DatabaseSettings, Settings, WatchSettings};
