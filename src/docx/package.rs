use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use anyhow::Context;
use zip::ZipArchive;

/// The parts of a `.docx` container, read eagerly into memory.
pub struct DocxPackage {
    pub entries: Vec<DocxEntry>,
}

pub struct DocxEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl DocxPackage {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let f = File::open(path).with_context(|| format!("open docx: {}", path.display()))?;
        Self::from_reader(f).with_context(|| format!("read docx: {}", path.display()))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> anyhow::Result<Self> {
        let mut zip = ZipArchive::new(reader).context("read zip")?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i).context("zip entry")?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .with_context(|| format!("read zip entry: {}", file.name()))?;
            entries.push(DocxEntry {
                name: file.name().to_string(),
                data,
            });
        }
        Ok(Self { entries })
    }

    /// Part bytes by name. Leading `/` is ignored and the match is
    /// case-insensitive, since producers disagree on both.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        let wanted = name.trim_start_matches('/');
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(wanted))
            .map(|e| e.data.as_slice())
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }
}
