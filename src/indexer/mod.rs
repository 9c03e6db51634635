pub mod builder;
pub mod project_discovery;

pub use builder::build_index;
pub use project_discovery::discover_projects;
