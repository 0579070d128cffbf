use std::path::{Component, Path, PathBuf};

/// Renders a host path for log and error messages: canonical when the path
/// exists, otherwise absolute with `.` and `..` folded away.
pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl<P: AsRef<Path> + ?Sized> BestEffortPathExt for P {
    fn best_effort_path_display(&self) -> String {
        let path = self.as_ref();
        if let Ok(canonical) = path.canonicalize() {
            return canonical.display().to_string();
        }

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };
        fold_components(&absolute).display().to_string()
    }
}

fn fold_components(path: &Path) -> PathBuf {
    path.components()
        .fold(Vec::new(), |mut kept, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if matches!(kept.last(), Some(Component::Normal(_))) {
                        kept.pop();
                    }
                }
                other => kept.push(other),
            }
            kept
        })
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_paths_are_folded() {
        let display = Path::new("/does/not/./exist/../here.txt").best_effort_path_display();
        assert_eq!(display, "/does/not/here.txt");
    }

    #[test]
    fn existing_paths_are_canonical() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("x").join("..");
        std::fs::create_dir(dir.path().join("x")).unwrap();
        assert_eq!(
            nested.best_effort_path_display(),
            dir.path().canonicalize().unwrap().display().to_string()
        );
    }
}
