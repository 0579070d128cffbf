use std::cell::RefCell;

use hashlink::LinkedHashMap;
use tracing::trace;

use crate::tree::path;

use super::{DirEntry, EntryKind, MkdirOptions, RmOptions, VfsError, VirtualFs};

type Directory = LinkedHashMap<String, MemoryEntry>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum MemoryEntry {
    File(String),
    Directory(Directory),
}

/// Filesystem held entirely in memory.
///
/// Directories list their entries in creation order. Overwriting a file
/// keeps its position.
#[derive(Debug, Default)]
pub struct MemoryFs {
    root: RefCell<Directory>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolves `.` and `..` and returns the remaining segments.
fn normalize(path: &str) -> Vec<String> {
    path::segments(path).fold(Vec::new(), |mut segments, segment| {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name.to_string()),
        }
        segments
    })
}

fn render_path(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}

fn directory_at<'a>(root: &'a Directory, segments: &[String]) -> Result<&'a Directory, VfsError> {
    let mut current = root;
    for (depth, name) in segments.iter().enumerate() {
        current = match current.get(name) {
            Some(MemoryEntry::Directory(directory)) => directory,
            Some(MemoryEntry::File(_)) => {
                return Err(VfsError::NotADirectoryError {
                    path: render_path(&segments[..=depth]),
                });
            }
            None => {
                return Err(VfsError::NotFoundError {
                    path: render_path(&segments[..=depth]),
                });
            }
        };
    }
    Ok(current)
}

fn directory_at_mut<'a>(
    root: &'a mut Directory,
    segments: &[String],
) -> Result<&'a mut Directory, VfsError> {
    let mut current = root;
    for (depth, name) in segments.iter().enumerate() {
        current = match current.get_mut(name) {
            Some(MemoryEntry::Directory(directory)) => directory,
            Some(MemoryEntry::File(_)) => {
                return Err(VfsError::NotADirectoryError {
                    path: render_path(&segments[..=depth]),
                });
            }
            None => {
                return Err(VfsError::NotFoundError {
                    path: render_path(&segments[..=depth]),
                });
            }
        };
    }
    Ok(current)
}

impl VirtualFs for MemoryFs {
    async fn mkdir(&self, path: &str, options: MkdirOptions) -> Result<(), VfsError> {
        let segments = normalize(path);
        trace!("mkdir {} ({:?})", render_path(&segments), options);
        let mut root = self.root.borrow_mut();

        if options.recursive {
            let mut current = &mut *root;
            for (depth, name) in segments.iter().enumerate() {
                let entry = current
                    .entry(name.clone())
                    .or_insert_with(|| MemoryEntry::Directory(Directory::new()));
                current = match entry {
                    MemoryEntry::Directory(directory) => directory,
                    MemoryEntry::File(_) => {
                        return Err(VfsError::NotADirectoryError {
                            path: render_path(&segments[..=depth]),
                        });
                    }
                };
            }
            return Ok(());
        }

        let Some((name, parent)) = segments.split_last() else {
            return Err(VfsError::AlreadyExistsError {
                path: path::ROOT.to_string(),
            });
        };
        let parent = directory_at_mut(&mut root, parent)?;
        if parent.contains_key(name) {
            return Err(VfsError::AlreadyExistsError {
                path: render_path(&segments),
            });
        }
        parent.insert(name.clone(), MemoryEntry::Directory(Directory::new()));
        Ok(())
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), VfsError> {
        let segments = normalize(path);
        trace!("write {} ({} bytes)", render_path(&segments), content.len());
        let Some((name, parent)) = segments.split_last() else {
            return Err(VfsError::IsADirectoryError {
                path: path::ROOT.to_string(),
            });
        };

        let mut root = self.root.borrow_mut();
        let parent = directory_at_mut(&mut root, parent)?;
        match parent.get_mut(name) {
            Some(MemoryEntry::Directory(_)) => Err(VfsError::IsADirectoryError {
                path: render_path(&segments),
            }),
            Some(MemoryEntry::File(existing)) => {
                *existing = content.to_string();
                Ok(())
            }
            None => {
                parent.insert(name.clone(), MemoryEntry::File(content.to_string()));
                Ok(())
            }
        }
    }

    async fn read_file(&self, path: &str) -> Result<String, VfsError> {
        let segments = normalize(path);
        let Some((name, parent)) = segments.split_last() else {
            return Err(VfsError::IsADirectoryError {
                path: path::ROOT.to_string(),
            });
        };

        let root = self.root.borrow();
        match directory_at(&root, parent)?.get(name) {
            Some(MemoryEntry::File(content)) => Ok(content.clone()),
            Some(MemoryEntry::Directory(_)) => Err(VfsError::IsADirectoryError {
                path: render_path(&segments),
            }),
            None => Err(VfsError::NotFoundError {
                path: render_path(&segments),
            }),
        }
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, VfsError> {
        let segments = normalize(path);
        let root = self.root.borrow();
        let directory = directory_at(&root, &segments)?;
        Ok(directory
            .iter()
            .map(|(name, entry)| {
                let kind = match entry {
                    MemoryEntry::File(_) => EntryKind::File,
                    MemoryEntry::Directory(_) => EntryKind::Directory,
                };
                DirEntry::new(name.clone(), kind)
            })
            .collect())
    }

    async fn rm(&self, path: &str, options: RmOptions) -> Result<(), VfsError> {
        let segments = normalize(path);
        trace!("rm {} ({:?})", render_path(&segments), options);
        let mut root = self.root.borrow_mut();

        let Some((name, parent)) = segments.split_last() else {
            if !options.recursive && !root.is_empty() {
                return Err(VfsError::DirectoryNotEmptyError {
                    path: path::ROOT.to_string(),
                });
            }
            root.clear();
            return Ok(());
        };

        let parent = match directory_at_mut(&mut root, parent) {
            Ok(parent) => parent,
            Err(VfsError::NotFoundError { .. } | VfsError::NotADirectoryError { .. })
                if options.force =>
            {
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        let blocked = match parent.get(name) {
            None if options.force => return Ok(()),
            None => {
                return Err(VfsError::NotFoundError {
                    path: render_path(&segments),
                });
            }
            Some(MemoryEntry::Directory(directory)) => !options.recursive && !directory.is_empty(),
            Some(MemoryEntry::File(_)) => false,
        };
        if blocked {
            return Err(VfsError::DirectoryNotEmptyError {
                path: render_path(&segments),
            });
        }
        parent.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FileSystemTree;

    #[compio::test]
    async fn recursive_mkdir_creates_ancestors_and_is_idempotent() {
        let fs = MemoryFs::new();
        fs.mkdir("/a/b/c", MkdirOptions::RECURSIVE).await.unwrap();
        fs.mkdir("/a/b/c", MkdirOptions::RECURSIVE).await.unwrap();

        assert_eq!(
            fs.read_dir("/a/b").await.unwrap(),
            vec![DirEntry::new("c", EntryKind::Directory)]
        );
    }

    #[compio::test]
    async fn plain_mkdir_requires_parent_and_rejects_existing() {
        let fs = MemoryFs::new();
        assert!(fs.mkdir("/a/b", MkdirOptions::default()).await.unwrap_err().is_not_found());

        fs.mkdir("/a", MkdirOptions::default()).await.unwrap();
        assert!(matches!(
            fs.mkdir("/a", MkdirOptions::default()).await,
            Err(VfsError::AlreadyExistsError { .. })
        ));
    }

    #[compio::test]
    async fn write_file_requires_an_existing_parent() {
        let fs = MemoryFs::new();
        assert!(fs.write_file("/missing/a.txt", "a").await.unwrap_err().is_not_found());

        fs.write_file("/a.txt", "a").await.unwrap();
        assert!(matches!(
            fs.write_file("/a.txt/b.txt", "b").await,
            Err(VfsError::NotADirectoryError { .. })
        ));
    }

    #[compio::test]
    async fn overwriting_keeps_listing_order() {
        let fs = MemoryFs::new();
        fs.write_file("/b.txt", "1").await.unwrap();
        fs.write_file("/a.txt", "1").await.unwrap();
        fs.write_file("/b.txt", "2").await.unwrap();

        let names = fs
            .read_dir("/")
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["b.txt", "a.txt"]);
        assert_eq!(fs.read_file("/b.txt").await.unwrap(), "2");
    }

    #[compio::test]
    async fn reading_directories_as_files_fails() {
        let fs = MemoryFs::new();
        fs.mkdir("/dir", MkdirOptions::RECURSIVE).await.unwrap();

        assert!(matches!(
            fs.read_file("/dir").await,
            Err(VfsError::IsADirectoryError { .. })
        ));
        assert!(matches!(
            fs.write_file("/dir", "x").await,
            Err(VfsError::IsADirectoryError { .. })
        ));
    }

    #[compio::test]
    async fn rm_honours_force_and_recursive() {
        let fs = MemoryFs::new();
        fs.mkdir("/a/b", MkdirOptions::RECURSIVE).await.unwrap();
        fs.write_file("/a/b/c.txt", "c").await.unwrap();

        assert!(fs.rm("/missing", RmOptions::default()).await.unwrap_err().is_not_found());
        fs.rm("/missing/deeper", RmOptions::FORCE_RECURSIVE).await.unwrap();

        let non_recursive = RmOptions {
            force: true,
            recursive: false,
        };
        assert!(matches!(
            fs.rm("/a", non_recursive).await,
            Err(VfsError::DirectoryNotEmptyError { .. })
        ));

        fs.rm("/a", RmOptions::FORCE_RECURSIVE).await.unwrap();
        assert!(fs.read_dir("/").await.unwrap().is_empty());
    }

    #[compio::test]
    async fn dot_segments_are_resolved() {
        let fs = MemoryFs::new();
        fs.mkdir("/a/b", MkdirOptions::RECURSIVE).await.unwrap();
        fs.write_file("/a/./b/../c.txt", "c").await.unwrap();

        assert_eq!(fs.read_file("/a/c.txt").await.unwrap(), "c");
    }

    #[compio::test]
    async fn mount_seeds_the_whole_tree() {
        let fs = MemoryFs::new();
        let tree = FileSystemTree::new()
            .file("package.json", "{}")
            .directory(
                "src",
                FileSystemTree::new()
                    .file("index.js", "run()")
                    .directory("empty", FileSystemTree::new()),
            );

        fs.mount(&tree).await.unwrap();

        assert_eq!(fs.read_file("/package.json").await.unwrap(), "{}");
        assert_eq!(fs.read_file("/src/index.js").await.unwrap(), "run()");
        assert!(fs.read_dir("/src/empty").await.unwrap().is_empty());
    }
}
