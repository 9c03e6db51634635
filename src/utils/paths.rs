use std::path::{Component, Path};

use crate::error::{Result, VaultError};

/// Converts a project path into a filesystem-safe directory name
///
/// Separators are normalized, a Windows drive letter is folded into the first segment,
/// and every run of non-alphanumeric characters becomes a single hyphen.
///
/// # Examples
///
/// ```
/// use session_vault::path_to_slug;
///
/// assert_eq!(path_to_slug("/home/user/my-project"), "home-user-my-project");
/// assert_eq!(path_to_slug(r"C:\Users\user\project"), "c-users-user-project");
/// ```
pub fn path_to_slug(project_path: &str) -> String {
    let normalized = project_path.replace('\\', "/");
    let trimmed = normalized.trim_matches('/');

    let mut slug = String::with_capacity(trimmed.len());
    let mut pending_hyphen = false;
    for ch in trimmed.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Last non-empty segment of a project path, for display
///
/// # Examples
///
/// ```
/// use session_vault::project_name;
///
/// assert_eq!(project_name("/home/user/my-project/"), "my-project");
/// assert_eq!(project_name(r"C:\work\api"), "api");
/// ```
pub fn project_name(project_path: &str) -> String {
    project_path
        .split(['/', '\\'])
        .rfind(|segment| !segment.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Validates that a store key component is a plain file or directory name
///
/// Keys come from metadata files and index entries, so they are checked before being
/// joined onto the vault root.
///
/// # Errors
///
/// Returns an error if the name is empty, contains a separator, or is `.`/`..`.
pub fn validate_key_component(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(VaultError::InvalidKey(name.to_string()));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(VaultError::InvalidKey(name.to_string())),
    }
}
