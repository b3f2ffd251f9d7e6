//! The archive facade.
//!
//! [`Archive`] owns only the path of its backing file; every operation
//! opens the file, does its work, and closes it before returning. All
//! structural changes rewrite the archive into a temp file in the same
//! directory and then replace the original, so readers never observe a
//! half-written archive.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::creation;
use crate::entry::{EntryDescriptor, EntryHeader, EntrySummary};
use crate::error::{Result, ZipError};
use crate::extraction;
use crate::format::{CentralFileHeader, EndOfCentralDirectory};
use crate::options::{AddOptions, DeleteOptions, ExtractOptions, ExtractTarget};
use crate::select::{SelectionRule, Selector};

/// A ZIP archive identified by its path.
///
/// The file may or may not exist yet; `create` and `add` bring it into
/// being, the read-oriented operations require it.
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
}

/// Top-level facts about an archive, as reported by [`Archive::properties`].
#[derive(Debug, Clone)]
pub struct ArchiveProperties {
    /// Number of entries in the central directory.
    pub entry_count: usize,
    /// Archive-level comment.
    pub comment: String,
    /// Whether the backing file exists and parses.
    pub status: ArchiveState,
}

/// Coarse archive condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveState {
    /// The backing file does not exist.
    NotExist,
    /// The backing file exists but is not a parseable archive.
    Invalid,
    /// The archive parses.
    Ok,
}

impl ArchiveState {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotExist => "not_exist",
            Self::Invalid => "invalid",
            Self::Ok => "ok",
        }
    }
}

/// The decoded central directory plus its trailer.
struct Directory {
    entries: Vec<EntryHeader>,
    eocd: EndOfCentralDirectory,
}

impl Archive {
    /// Wraps `path`; no file is touched until an operation runs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the archive from scratch with the given entries.
    ///
    /// An existing file at the path is overwritten. Returns one summary
    /// per expanded entry, including filtered and skipped ones.
    pub fn create(
        &self,
        descriptors: &[EntryDescriptor],
        mut options: AddOptions,
    ) -> Result<Vec<EntrySummary>> {
        options.validate()?;
        let mut temp = self.scratch_file()?;

        let batch = creation::write_batch(temp.as_file_mut(), 0, 0, descriptors, &mut options)?;
        let mut central = Vec::new();
        for header in &batch.centrals {
            header.write_to(&mut central)?;
        }
        io::Write::write_all(temp.as_file_mut(), &central)?;

        let eocd = EndOfCentralDirectory::new(
            entry_count_u16(batch.centrals.len())?,
            central.len() as u32,
            batch.bytes_written as u32,
            options.resolve_comment("").into_bytes(),
        );
        eocd.write_to(temp.as_file_mut())?;

        self.replace_with(temp)?;
        Ok(batch.summaries)
    }

    /// Appends entries to the archive, creating it if absent.
    ///
    /// Existing entries are carried over byte-for-byte; only the central
    /// directory and trailer are rebuilt.
    pub fn add(
        &self,
        descriptors: &[EntryDescriptor],
        mut options: AddOptions,
    ) -> Result<Vec<EntrySummary>> {
        options.validate()?;
        if !self.path.exists() {
            return self.create(descriptors, options);
        }

        let mut old = self.open_read()?;
        let directory = self.read_directory(&mut old)?;
        let cd_offset = u64::from(directory.eocd.central_dir_offset);
        let cd_size = u64::from(directory.eocd.central_dir_size);
        let old_count = directory.entries.len();

        let mut temp = self.scratch_file()?;
        old.seek(SeekFrom::Start(0))?;
        io::copy(&mut (&mut old).take(cd_offset), temp.as_file_mut())?;

        let batch = creation::write_batch(
            temp.as_file_mut(),
            cd_offset,
            old_count,
            descriptors,
            &mut options,
        )?;

        // Pre-existing central entries keep their offsets, so their raw
        // bytes carry over unchanged.
        old.seek(SeekFrom::Start(cd_offset))?;
        io::copy(&mut (&mut old).take(cd_size), temp.as_file_mut())?;
        drop(old);

        let mut new_central = Vec::new();
        for header in &batch.centrals {
            header.write_to(&mut new_central)?;
        }
        io::Write::write_all(temp.as_file_mut(), &new_central)?;

        let old_comment = String::from_utf8_lossy(&directory.eocd.comment).into_owned();
        let eocd = EndOfCentralDirectory::new(
            entry_count_u16(old_count + batch.centrals.len())?,
            (cd_size + new_central.len() as u64) as u32,
            (cd_offset + batch.bytes_written) as u32,
            options.resolve_comment(&old_comment).into_bytes(),
        );
        eocd.write_to(temp.as_file_mut())?;

        self.replace_with(temp)?;
        Ok(batch.summaries)
    }

    /// Lists the central directory without mutating anything.
    pub fn list(&self) -> Result<Vec<EntrySummary>> {
        let mut file = self.open_read()?;
        let directory = self.read_directory(&mut file)?;
        Ok(directory
            .entries
            .iter()
            .map(EntrySummary::from_header)
            .collect())
    }

    /// Reports entry count, comment, and coarse condition.
    ///
    /// A missing file reports `not_exist`; a file that fails structural
    /// parsing reports `invalid`; neither is an error.
    pub fn properties(&self) -> Result<ArchiveProperties> {
        if !self.path.exists() {
            return Ok(ArchiveProperties {
                entry_count: 0,
                comment: String::new(),
                status: ArchiveState::NotExist,
            });
        }
        let mut file = self.open_read()?;
        match EndOfCentralDirectory::find(&mut file, &self.path) {
            Ok((eocd, _)) => Ok(ArchiveProperties {
                entry_count: usize::from(eocd.total_entries),
                comment: String::from_utf8_lossy(&eocd.comment).into_owned(),
                status: ArchiveState::Ok,
            }),
            Err(e) if e.is_structural() => Ok(ArchiveProperties {
                entry_count: 0,
                comment: String::new(),
                status: ArchiveState::Invalid,
            }),
            Err(e) => Err(e),
        }
    }

    /// Extracts entries matching the configured rule into `target`.
    pub fn extract(
        &self,
        mut target: ExtractTarget<'_>,
        mut options: ExtractOptions,
    ) -> Result<Vec<EntrySummary>> {
        options.validate()?;
        let mut file = self.open_read()?;
        let directory = self.read_directory(&mut file)?;
        extraction::extract_batch(
            &mut file,
            &self.path,
            &directory.entries,
            &mut target,
            &mut options,
        )
    }

    /// Removes entries matching the configured rule.
    ///
    /// Kept entries are copied raw, never recompressed. A rule matching
    /// nothing leaves the archive bytes untouched; a rule matching
    /// everything leaves a valid zero-entry archive. Returns summaries
    /// of the remaining entries.
    pub fn delete(&self, options: &DeleteOptions) -> Result<Vec<EntrySummary>> {
        let mut file = self.open_read()?;
        let directory = self.read_directory(&mut file)?;

        let rule = options.rule.clone().unwrap_or(SelectionRule::All);
        let mut selector = Selector::new(&rule);
        let mut kept = Vec::new();
        let mut removed_any = false;
        for header in directory.entries {
            if selector.matches(&header.stored_filename, header.index, header.is_folder()) {
                removed_any = true;
            } else {
                kept.push(header);
            }
        }

        if !removed_any {
            return Ok(kept.iter().map(EntrySummary::from_header).collect());
        }

        let mut temp = self.scratch_file()?;
        let mut offset = 0u64;
        let mut centrals: Vec<CentralFileHeader> = Vec::with_capacity(kept.len());
        for header in &kept {
            let start = u64::from(header.central.local_header_offset);
            file.seek(SeekFrom::Start(start))?;
            let local = crate::format::LocalFileHeader::read_from(&mut file, &self.path)?;
            local.write_to(temp.as_file_mut())?;
            let copied = io::copy(
                &mut (&mut file).take(u64::from(header.central.compressed_size)),
                temp.as_file_mut(),
            )?;

            let mut central = header.central.clone();
            central.local_header_offset = offset as u32;
            offset += (crate::format::headers::LOCAL_SIZE + local.name.len() + local.extra.len())
                as u64
                + copied;
            centrals.push(central);
        }
        drop(file);

        let mut central_bytes = Vec::new();
        for header in &centrals {
            header.write_to(&mut central_bytes)?;
        }
        io::Write::write_all(temp.as_file_mut(), &central_bytes)?;
        let eocd = EndOfCentralDirectory::new(
            entry_count_u16(centrals.len())?,
            central_bytes.len() as u32,
            offset as u32,
            Vec::new(),
        );
        eocd.write_to(temp.as_file_mut())?;
        self.replace_with(temp)?;

        Ok(centrals
            .iter()
            .enumerate()
            .map(|(i, c)| EntrySummary::from_header(&EntryHeader::from_central(c.clone(), i)))
            .collect())
    }

    /// Appends the contents of `other` to this archive.
    ///
    /// Local-entry regions and central directories are concatenated raw;
    /// the merged comment joins both comments with a single space. When
    /// `other` is missing this is a no-op; when this archive is missing
    /// it becomes a copy of `other`.
    pub fn merge(&self, other: &Self) -> Result<()> {
        if !other.path.exists() {
            return Ok(());
        }
        if !self.path.exists() {
            return self.duplicate_from(&other.path);
        }

        let mut this_file = self.open_read()?;
        let this_dir = self.read_directory(&mut this_file)?;
        let mut other_file = other.open_read()?;
        let other_dir = other.read_directory(&mut other_file)?;

        let this_offset = u64::from(this_dir.eocd.central_dir_offset);
        let other_offset = u64::from(other_dir.eocd.central_dir_offset);

        let mut temp = self.scratch_file()?;
        this_file.seek(SeekFrom::Start(0))?;
        io::copy(&mut (&mut this_file).take(this_offset), temp.as_file_mut())?;
        other_file.seek(SeekFrom::Start(0))?;
        io::copy(&mut (&mut other_file).take(other_offset), temp.as_file_mut())?;

        this_file.seek(SeekFrom::Start(this_offset))?;
        io::copy(
            &mut (&mut this_file).take(u64::from(this_dir.eocd.central_dir_size)),
            temp.as_file_mut(),
        )?;
        other_file.seek(SeekFrom::Start(other_offset))?;
        io::copy(
            &mut (&mut other_file).take(u64::from(other_dir.eocd.central_dir_size)),
            temp.as_file_mut(),
        )?;
        drop(this_file);
        drop(other_file);

        let comment = format!(
            "{} {}",
            String::from_utf8_lossy(&this_dir.eocd.comment),
            String::from_utf8_lossy(&other_dir.eocd.comment)
        );
        let eocd = EndOfCentralDirectory::new(
            entry_count_u16(this_dir.entries.len() + other_dir.entries.len())?,
            this_dir.eocd.central_dir_size + other_dir.eocd.central_dir_size,
            (this_offset + other_offset) as u32,
            comment.into_bytes(),
        );
        eocd.write_to(temp.as_file_mut())?;
        self.replace_with(temp)
    }

    /// Makes this archive a byte-for-byte copy of `source`.
    ///
    /// A missing source succeeds trivially.
    pub fn duplicate_from(&self, source: &Path) -> Result<()> {
        if !source.exists() {
            return Ok(());
        }
        std::fs::copy(source, &self.path)?;
        Ok(())
    }

    fn open_read(&self) -> Result<File> {
        if !self.path.exists() {
            return Err(ZipError::MissingFile {
                path: self.path.clone(),
            });
        }
        Ok(File::open(&self.path)?)
    }

    /// Decodes the trailer and the full central directory.
    fn read_directory(&self, file: &mut File) -> Result<Directory> {
        let (eocd, eocd_offset) = EndOfCentralDirectory::find(file, &self.path)?;
        let cd_offset = u64::from(eocd.central_dir_offset);
        let cd_size = u64::from(eocd.central_dir_size);
        if cd_offset + cd_size != eocd_offset {
            return Err(ZipError::InvalidArchiveSize {
                path: self.path.clone(),
                offset: cd_offset,
            });
        }

        file.seek(SeekFrom::Start(cd_offset))?;
        let mut entries = Vec::with_capacity(usize::from(eocd.total_entries));
        for index in 0..usize::from(eocd.total_entries) {
            let central = CentralFileHeader::read_from(file, &self.path)?;
            entries.push(EntryHeader::from_central(central, index));
        }
        Ok(Directory { entries, eocd })
    }

    /// A temp file in the archive's directory, so the final rename stays
    /// on one filesystem whenever possible.
    fn scratch_file(&self) -> Result<NamedTempFile> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Ok(NamedTempFile::new_in(dir)?)
    }

    /// Replaces the backing file with `temp`, falling back to copy plus
    /// delete when rename crosses a device boundary. The fallback is not
    /// atomic.
    fn replace_with(&self, temp: NamedTempFile) -> Result<()> {
        match temp.persist(&self.path) {
            Ok(_) => Ok(()),
            Err(persist_error) => {
                let temp = persist_error.file;
                let temp_path = temp.path().to_path_buf();
                std::fs::copy(&temp_path, &self.path).map_err(|_| ZipError::RenameFileFailed {
                    from: temp_path.clone(),
                    to: self.path.clone(),
                })?;
                temp.close()
                    .map_err(|_| ZipError::DeleteFileFailed { path: temp_path })?;
                Ok(())
            }
        }
    }
}

fn entry_count_u16(count: usize) -> Result<u16> {
    u16::try_from(count)
        .map_err(|_| ZipError::InvalidParameter(format!("{count} entries exceed the format limit")))
}
