use crate::error::Result;
use crate::models::ProjectInfo;
use crate::storage::METADATA_EXTENSION;
use crate::store::KeyedStore;

/// Discover every project namespace in the vault and the metadata files inside it
///
/// Returns an empty Vec if the vault has no projects yet (not an error). Projects are
/// returned in slug order; metadata files in filename order.
///
/// A namespace that cannot be listed is logged and skipped so one unreadable
/// project does not hide the rest.
pub fn discover_projects<S: KeyedStore>(store: &S) -> Result<Vec<ProjectInfo>> {
    let mut projects: Vec<ProjectInfo> = store
        .namespaces()?
        .into_iter()
        .filter_map(|slug| match store.list(&slug) {
            Ok(names) => Some(ProjectInfo {
                metadata_files: names
                    .into_iter()
                    .filter(|name| name.ends_with(METADATA_EXTENSION))
                    .collect(),
                slug,
            }),
            Err(e) => {
                tracing::warn!(project = %slug, error = %e, "skipping unreadable project directory");
                None
            }
        })
        .collect();

    projects.sort_by(|a, b| a.slug.cmp(&b.slug));
    for project in &mut projects {
        project.metadata_files.sort();
    }

    Ok(projects)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::store::{FsStore, MemoryStore, StoreKey};

    #[test]
    fn test_empty_vault_has_no_projects() {
        let store = MemoryStore::new();
        assert!(discover_projects(&store).unwrap().is_empty());
    }

    #[test]
    fn test_only_metadata_files_are_collected() {
        let store = MemoryStore::new();
        store.put(&StoreKey::project("b-proj", "2026-01-01_aaaa0000.md"), b"").unwrap();
        store.put(&StoreKey::project("b-proj", "2026-01-01_aaaa0000.meta.json"), b"{}").unwrap();
        store.put(&StoreKey::project("a-proj", "notes.txt"), b"").unwrap();
        store.put(&StoreKey::root("index.json"), b"{}").unwrap();

        let projects = discover_projects(&store).unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].slug, "a-proj");
        assert!(projects[0].metadata_files.is_empty());
        assert_eq!(projects[1].metadata_files, vec!["2026-01-01_aaaa0000.meta.json"]);
    }

    #[test]
    fn test_filesystem_ignores_stray_temp_files() {
        let dir = TempDir::new().unwrap();
        let project_dir = dir.path().join("projects").join("demo");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("x.meta.json"), "{}").unwrap();
        fs::write(project_dir.join("x.meta.json.tmp"), "{}").unwrap();

        let projects = discover_projects(&FsStore::new(dir.path())).unwrap();

        assert_eq!(projects[0].metadata_files, vec!["x.meta.json"]);
    }
}
