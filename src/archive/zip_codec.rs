use std::io::{Cursor, Write};

use hashlink::LinkedHashMap;
use snafu::ResultExt;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::codec::{ZipEntrySnafu, ZipFinishSnafu, ZipWriteSnafu};
use super::{ArchiveCodec, ArchiveError, Compression};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ZipEntry {
    Folder,
    File(String),
}

/// Zip archive codec.
///
/// Entry names drop the leading `/` of tree paths; folder names end in `/`.
/// Entries are written in the order they were first added.
#[derive(Debug, Default, Clone)]
pub struct ZipCodec {
    entries: LinkedHashMap<String, ZipEntry>,
}

impl ZipCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn file_options(compression: Compression) -> SimpleFileOptions {
    let method = match compression {
        Compression::Stored => CompressionMethod::Stored,
        Compression::Deflated => CompressionMethod::Deflated,
        Compression::Zstd => CompressionMethod::Zstd,
    };
    SimpleFileOptions::default().compression_method(method)
}

impl ArchiveCodec for ZipCodec {
    fn add_file(&mut self, path: &str, content: &str) {
        let name = path.trim_start_matches('/');
        if name.is_empty() {
            return;
        }
        match self.entries.get_mut(name) {
            Some(entry) => *entry = ZipEntry::File(content.to_string()),
            None => {
                self.entries
                    .insert(name.to_string(), ZipEntry::File(content.to_string()));
            }
        }
    }

    fn add_folder(&mut self, path: &str) {
        let name = path.trim_matches('/');
        if name.is_empty() {
            return;
        }
        let name = format!("{name}/");
        if !self.entries.contains_key(&name) {
            self.entries.insert(name, ZipEntry::Folder);
        }
    }

    fn generate(&self, compression: Compression) -> Result<Vec<u8>, ArchiveError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, entry) in self.entries.iter() {
            match entry {
                ZipEntry::Folder => writer
                    .add_directory(name.clone(), file_options(compression))
                    .context(ZipEntrySnafu { name })?,
                ZipEntry::File(content) => {
                    writer
                        .start_file(name.clone(), file_options(compression))
                        .context(ZipEntrySnafu { name })?;
                    writer
                        .write_all(content.as_bytes())
                        .context(ZipWriteSnafu { name })?;
                }
            }
        }
        Ok(writer.finish().context(ZipFinishSnafu)?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Read;
    use zip::ZipArchive;

    #[rstest]
    #[case(Compression::Stored)]
    #[case(Compression::Deflated)]
    #[case(Compression::Zstd)]
    fn entries_are_readable_with_every_compression(#[case] compression: Compression) {
        let mut codec = ZipCodec::new();
        codec.add_folder("/proj");
        codec.add_file("/proj/a.txt", "hello");
        codec.add_folder("/proj/empty");

        let bytes = codec.generate(compression).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let names = archive.file_names().map(String::from).collect::<Vec<_>>();
        assert_eq!(names.len(), 3);
        assert!(archive.by_name("proj/empty/").unwrap().is_dir());

        let mut content = String::new();
        archive
            .by_name("proj/a.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn repeated_entries_are_merged() {
        let mut codec = ZipCodec::new();
        codec.add_folder("/a");
        codec.add_folder("a/");
        codec.add_file("/a/b.txt", "first");
        codec.add_file("a/b.txt", "second");
        codec.add_folder("/");

        assert_eq!(codec.len(), 2);
        let bytes = codec.generate(Compression::Stored).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive
            .by_name("a/b.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "second");
    }

    #[test]
    fn empty_codecs_produce_empty_archives() {
        let codec = ZipCodec::new();
        assert!(codec.is_empty());
        let bytes = codec.generate(Compression::Deflated).unwrap();
        assert_eq!(ZipArchive::new(Cursor::new(bytes)).unwrap().len(), 0);
    }
}
