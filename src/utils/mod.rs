pub mod config;
pub mod environment;
pub mod git;
pub mod paths;

pub use config::{CONFIG_FILENAME, Config, ExportFormat, load_config, save_config};
pub use environment::{VAULT_DIR_ENV, get_vault_dir};
pub use git::{GitInfo, collect_git_info};
pub use paths::{path_to_slug, project_name, validate_key_component};
