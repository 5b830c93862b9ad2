//! Zip archive extraction.
//!
//! Only entries whose names end in a known image suffix are selected, and they
//! are yielded in ascending byte order of their full in-archive name. That
//! order decides the vertical stacking order of the chapter.

use std::io::{Read, Seek};

use tracing::debug;
use zip::ZipArchive;

use super::error::StitchError;
use super::StitchLimits;

/// Suffixes (lowercase) recognised as page images.
pub const IMAGE_SUFFIXES: [&str; 4] = [".png", ".jpg", ".jpeg", ".webp"];

/// One selected archive entry with its raw, still-encoded bytes.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub fn is_image_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// Lazy, single-pass iterator over the image entries of an archive.
///
/// Each call to `next` reads and inflates exactly one entry.
pub struct ImageEntries<R> {
    archive: ZipArchive<R>,
    names: std::vec::IntoIter<String>,
    max_entry_bytes: u64,
}

impl<R: Read + Seek> ImageEntries<R> {
    /// Number of image entries not yet yielded.
    pub fn remaining(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.len() == 0
    }

    fn read_entry(&mut self, name: String) -> Result<ArchiveEntry, StitchError> {
        let file = self.archive.by_name(&name)?;

        let declared = file.size();
        if declared > self.max_entry_bytes {
            return Err(StitchError::limit(format!(
                "entry '{}' is {} bytes, maximum is {}",
                name, declared, self.max_entry_bytes
            )));
        }

        // Headers can lie about the inflated size, so cap the read as well.
        let mut bytes = Vec::with_capacity(declared as usize);
        file.take(self.max_entry_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| {
                // Bad CRC or a broken deflate stream: the container itself is malformed.
                debug!("Archive entry '{}' is corrupt: {}", name, e);
                StitchError::InvalidArchive(e.into())
            })?;

        if bytes.len() as u64 > self.max_entry_bytes {
            return Err(StitchError::limit(format!(
                "entry '{}' inflates past {} bytes",
                name, self.max_entry_bytes
            )));
        }

        Ok(ArchiveEntry { name, bytes })
    }
}

impl<R: Read + Seek> Iterator for ImageEntries<R> {
    type Item = Result<ArchiveEntry, StitchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        Some(self.read_entry(name))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

/// Open `reader` as a zip container and select its image entries.
///
/// An archive with no matching entries yields an empty iterator, not an error.
pub fn image_entries<R: Read + Seek>(
    reader: R,
    limits: &StitchLimits,
) -> Result<ImageEntries<R>, StitchError> {
    let mut archive = ZipArchive::new(reader)?;

    let mut names = Vec::new();
    for index in 0..archive.len() {
        let file = archive.by_index_raw(index)?;
        if file.is_dir() || !is_image_name(file.name()) {
            continue;
        }
        names.push(file.name().to_string());
    }
    names.sort();

    if names.len() > limits.max_archive_entries {
        return Err(StitchError::limit(format!(
            "archive holds {} images, maximum is {}",
            names.len(),
            limits.max_archive_entries
        )));
    }

    debug!("Selected {} image entries from {} archive entries", names.len(), archive.len());

    Ok(ImageEntries {
        archive,
        names: names.into_iter(),
        max_entry_bytes: limits.max_entry_bytes,
    })
}
