/// A project namespace found under `projects/` in the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub slug: String,
    pub metadata_files: Vec<String>,
}
