//! cpio archive reading and selective extraction.
//!
//! Installer payloads are cpio archives in the portable ASCII format (`odc`,
//! magic `070707`, octal fields). The SVR4 `newc`/`crc` variants (magic
//! `070701`/`070702`, hex fields, 4-byte alignment) are read as well.
//!
//! Extraction mirrors `cpio -idmu <patterns>`: only entries matching one of
//! the patterns are written, leading directories are created, modification
//! times are kept and existing files are replaced.

use crate::nbi::error::{ErrorExt, Result};
use glob::{MatchOptions, Pattern};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Magic string for the portable ASCII (odc) format
const MAGIC_ODC: &[u8; 6] = b"070707";
/// Magic string for newc format
const MAGIC_NEWC: &[u8; 6] = b"070701";
/// Magic string for CRC format
const MAGIC_CRC: &[u8; 6] = b"070702";

/// odc header size, magic included
const ODC_HEADER_SIZE: usize = 76;
/// newc header size, magic included
const NEWC_HEADER_SIZE: usize = 110;

const TRAILER: &str = "TRAILER!!!";

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;
const S_IFREG: u32 = 0o100000;
const S_IFLNK: u32 = 0o120000;

/// Kind of filesystem object an entry describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Symlink,
    /// Devices, fifos and sockets - never extracted
    Other,
}

/// Extracted CPIO entry metadata
#[derive(Clone, Debug)]
pub struct CpioEntry {
    pub name: String,
    pub size: u64,
    pub mode: u32,
    pub mtime: u64,
    pub uid: u32,
    pub gid: u32,
    pub dev: u64,
    pub ino: u64,
    pub nlink: u32,
}

impl CpioEntry {
    pub fn kind(&self) -> EntryKind {
        match self.mode & S_IFMT {
            S_IFDIR => EntryKind::Directory,
            S_IFREG => EntryKind::File,
            S_IFLNK => EntryKind::Symlink,
            _ => EntryKind::Other,
        }
    }

    /// Permission bits, setuid/setgid/sticky included.
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }

    fn modified(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.mtime)
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

fn parse_field(header: &[u8], start: usize, len: usize, radix: u32) -> io::Result<u64> {
    let s = std::str::from_utf8(&header[start..start + len])
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    u64::from_str_radix(s, radix)
        .map_err(|e| invalid(format!("bad cpio header field {:?}: {}", s, e)))
}

fn padding(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// A streaming reader for cpio archives.
///
/// Entry data is not buffered: after [`next_entry`](Self::next_entry) returns
/// an entry, its data can be consumed with [`copy_data`](Self::copy_data) or
/// [`read_data`](Self::read_data). Unconsumed data is skipped automatically.
pub struct CpioReader<R: Read> {
    reader: R,
    remaining: u64,
    padding: usize,
}

impl<R: Read> CpioReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            remaining: 0,
            padding: 0,
        }
    }

    /// Read the next entry header from the archive
    /// Returns Ok(None) at the end of the archive (TRAILER!!!)
    pub fn next_entry(&mut self) -> io::Result<Option<CpioEntry>> {
        self.finish_data()?;

        let mut magic = [0u8; 6];
        if let Err(e) = self.reader.read_exact(&mut magic) {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Ok(None);
            }
            return Err(e);
        }

        let (entry, name_padding, data_padding) = match &magic {
            MAGIC_ODC => self.read_odc_header()?,
            MAGIC_NEWC | MAGIC_CRC => self.read_newc_header()?,
            _ => {
                return Err(invalid(format!(
                    "Invalid CPIO magic: {:?}",
                    String::from_utf8_lossy(&magic)
                )));
            }
        };

        if name_padding > 0 {
            let mut skip = [0u8; 3];
            self.reader.read_exact(&mut skip[..name_padding])?;
        }

        if entry.name == TRAILER {
            return Ok(None);
        }

        self.remaining = entry.size;
        self.padding = data_padding;
        Ok(Some(entry))
    }

    fn read_odc_header(&mut self) -> io::Result<(CpioEntry, usize, usize)> {
        let mut header = [0u8; ODC_HEADER_SIZE];
        self.reader.read_exact(&mut header[6..])?;

        let namesize = parse_field(&header, 59, 6, 8)? as usize;
        let entry = CpioEntry {
            dev: parse_field(&header, 6, 6, 8)?,
            ino: parse_field(&header, 12, 6, 8)?,
            mode: parse_field(&header, 18, 6, 8)? as u32,
            uid: parse_field(&header, 24, 6, 8)? as u32,
            gid: parse_field(&header, 30, 6, 8)? as u32,
            nlink: parse_field(&header, 36, 6, 8)? as u32,
            mtime: parse_field(&header, 48, 11, 8)?,
            size: parse_field(&header, 65, 11, 8)?,
            name: self.read_name(namesize)?,
        };
        Ok((entry, 0, 0))
    }

    fn read_newc_header(&mut self) -> io::Result<(CpioEntry, usize, usize)> {
        let mut header = [0u8; NEWC_HEADER_SIZE];
        self.reader.read_exact(&mut header[6..])?;

        let namesize = parse_field(&header, 94, 8, 16)? as usize;
        let dev_major = parse_field(&header, 62, 8, 16)?;
        let dev_minor = parse_field(&header, 70, 8, 16)?;
        let entry = CpioEntry {
            ino: parse_field(&header, 6, 8, 16)?,
            mode: parse_field(&header, 14, 8, 16)? as u32,
            uid: parse_field(&header, 22, 8, 16)? as u32,
            gid: parse_field(&header, 30, 8, 16)? as u32,
            nlink: parse_field(&header, 38, 8, 16)? as u32,
            mtime: parse_field(&header, 46, 8, 16)?,
            size: parse_field(&header, 54, 8, 16)?,
            dev: (dev_major << 32) | dev_minor,
            name: self.read_name(namesize)?,
        };
        let data_padding = padding(entry.size as usize);
        Ok((entry, padding(NEWC_HEADER_SIZE + namesize), data_padding))
    }

    /// Reads a NUL-terminated name of `namesize` bytes.
    fn read_name(&mut self, namesize: usize) -> io::Result<String> {
        let mut name_buf = vec![0u8; namesize];
        self.reader.read_exact(&mut name_buf)?;
        if name_buf.last() == Some(&0) {
            name_buf.pop();
        }
        Ok(String::from_utf8_lossy(&name_buf).into_owned())
    }

    /// Copies the current entry's data into `writer`.
    pub fn copy_data<W: Write>(&mut self, writer: &mut W) -> io::Result<u64> {
        let expected = self.remaining;
        let copied = io::copy(&mut (&mut self.reader).take(expected), writer)?;
        self.remaining -= copied;
        if copied != expected {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "cpio archive ends inside entry data",
            ));
        }
        Ok(copied)
    }

    /// Reads the current entry's data into memory.
    pub fn read_data(&mut self) -> io::Result<Vec<u8>> {
        let mut data = Vec::with_capacity(self.remaining as usize);
        self.copy_data(&mut data)?;
        Ok(data)
    }

    fn finish_data(&mut self) -> io::Result<()> {
        let skip = self.remaining + self.padding as u64;
        if skip > 0 {
            let skipped = io::copy(&mut (&mut self.reader).take(skip), &mut io::sink())?;
            if skipped != skip {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "cpio archive ends inside entry data",
                ));
            }
        }
        self.remaining = 0;
        self.padding = 0;
        Ok(())
    }
}

/// Selects archive entries by shell pattern.
///
/// Like `cpio`, a `*` also matches `/`, so `*Py*` selects everything below
/// `Python.framework`. Names are tried as stored and without a leading `./`.
#[derive(Debug, Clone)]
pub struct EntryMatcher {
    patterns: Vec<Pattern>,
}

impl EntryMatcher {
    const OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, name: &str) -> bool {
        let stripped = name.strip_prefix("./").unwrap_or(name);
        self.patterns.iter().any(|p| {
            p.matches_with(name, Self::OPTIONS) || p.matches_with(stripped, Self::OPTIONS)
        })
    }
}

/// Options for [`extract_matching`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractOptions {
    /// Apply the archived uid/gid to extracted files (needs root).
    pub preserve_owners: bool,
}

/// Counts of what an extraction wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
    pub hard_links: usize,
    pub skipped: usize,
}

/// Turns an archive name into a relative path below the extraction root.
///
/// Names escaping the root are refused.
fn relative_path(name: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir | Component::RootDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }
    (!path.as_os_str().is_empty()).then_some(path)
}

/// Removes whatever occupies `path` unless it is a directory that stays one.
fn clear_path(path: &Path, keep_dir: bool) -> Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).fs_context("inspecting", path),
    };
    if metadata.is_dir() {
        if !keep_dir {
            std::fs::remove_dir_all(path).fs_context("replacing directory", path)?;
        }
    } else {
        std::fs::remove_file(path).fs_context("replacing", path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn apply_metadata(path: &Path, entry: &CpioEntry, options: &ExtractOptions) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if options.preserve_owners {
        std::os::unix::fs::lchown(path, Some(entry.uid), Some(entry.gid))
            .fs_context("changing owner of", path)?;
    }
    if entry.kind() != EntryKind::Symlink {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(entry.permissions()))
            .fs_context("setting permissions on", path)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_metadata(_path: &Path, _entry: &CpioEntry, _options: &ExtractOptions) -> Result<()> {
    Ok(())
}

/// Restores a directory's modification time once nothing more is written into it.
#[cfg(unix)]
fn set_dir_modified(path: &Path, modified: SystemTime) -> io::Result<()> {
    std::fs::File::open(path)?.set_modified(modified)
}

#[cfg(not(unix))]
fn set_dir_modified(_path: &Path, _modified: SystemTime) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn make_symlink(target: &str, path: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, path).fs_context("creating symlink", path)
}

#[cfg(not(unix))]
fn make_symlink(_target: &str, path: &Path) -> Result<()> {
    crate::bail!("cannot create symlink {} on this platform", path.display())
}

/// Extracts every entry of `archive` accepted by `matcher` below `dest`.
pub fn extract_matching<R: Read>(
    archive: R,
    dest: &Path,
    matcher: &EntryMatcher,
    options: &ExtractOptions,
) -> Result<ExtractStats> {
    let mut reader = CpioReader::new(archive);
    let mut stats = ExtractStats::default();
    // (dev, ino) -> extracted paths sharing that inode
    let mut links: HashMap<(u64, u64), Vec<PathBuf>> = HashMap::new();
    let mut directories = Vec::new();

    while let Some(entry) = reader.next_entry()? {
        if !matcher.matches(&entry.name) {
            continue;
        }
        let Some(relative) = relative_path(&entry.name) else {
            log::debug!("Skipping cpio entry {:?}", entry.name);
            stats.skipped += 1;
            continue;
        };
        let path = dest.join(relative);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }

        match entry.kind() {
            EntryKind::Directory => {
                clear_path(&path, true)?;
                std::fs::create_dir_all(&path).fs_context("creating directory", &path)?;
                apply_metadata(&path, &entry, options)?;
                directories.push((path, entry.modified()));
                stats.directories += 1;
            }
            EntryKind::Symlink => {
                let target = String::from_utf8_lossy(&reader.read_data()?).into_owned();
                clear_path(&path, false)?;
                make_symlink(&target, &path)?;
                apply_metadata(&path, &entry, options)?;
                stats.symlinks += 1;
            }
            EntryKind::File => {
                let key = (entry.dev, entry.ino);
                clear_path(&path, false)?;

                let earlier = if entry.nlink > 1 {
                    links.get(&key).and_then(|paths| paths.first()).cloned()
                } else {
                    None
                };

                match earlier {
                    // Later link without data: share the earlier inode.
                    Some(first) if entry.size == 0 => {
                        std::fs::hard_link(&first, &path).fs_context("linking", &path)?;
                        stats.hard_links += 1;
                    }
                    _ => {
                        write_file(&mut reader, &entry, &path)?;
                        apply_metadata(&path, &entry, options)?;
                        stats.files += 1;

                        // newc stores the data with the last link only.
                        if entry.nlink > 1 && entry.size > 0 {
                            if let Some(empty) = links.remove(&key) {
                                for other in empty {
                                    std::fs::remove_file(&other).fs_context("replacing", &other)?;
                                    std::fs::hard_link(&path, &other)
                                        .fs_context("linking", &other)?;
                                    stats.hard_links += 1;
                                }
                            }
                        }
                    }
                }

                if entry.nlink > 1 {
                    links.entry(key).or_default().insert(0, path);
                }
            }
            EntryKind::Other => {
                log::debug!("Skipping special file {}", entry.name);
                stats.skipped += 1;
            }
        }
    }

    for (path, modified) in directories.iter().rev() {
        if let Err(e) = set_dir_modified(path, *modified) {
            log::warn!("Could not set modification time of {}: {}", path.display(), e);
        }
    }

    Ok(stats)
}

fn write_file<R: Read>(reader: &mut CpioReader<R>, entry: &CpioEntry, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path).fs_context("creating", path)?;
    reader.copy_data(&mut file).fs_context("writing", path)?;
    file.set_modified(entry.modified())
        .fs_context("setting modification time on", path)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds an odc archive from (name, mode, data) triples.
    pub(crate) fn odc(entries: &[(&str, u32, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut push = |name: &str, mode: u32, ino: u32, nlink: u32, data: &[u8]| {
            out.extend_from_slice(MAGIC_ODC);
            out.extend_from_slice(
                format!(
                    "{:06o}{:06o}{:06o}{:06o}{:06o}{:06o}{:06o}{:011o}{:06o}{:011o}",
                    1,
                    ino,
                    mode,
                    0,
                    0,
                    nlink,
                    0,
                    1_400_000_000u64,
                    name.len() + 1,
                    data.len()
                )
                .as_bytes(),
            );
            out.extend_from_slice(name.as_bytes());
            out.push(0);
            out.extend_from_slice(data);
        };
        for (i, (name, mode, data)) in entries.iter().enumerate() {
            push(name, *mode, i as u32 + 1, 1, data);
        }
        push(TRAILER, 0, 0, 1, b"");
        out
    }

    fn newc_entry(out: &mut Vec<u8>, name: &str, mode: u32, ino: u32, nlink: u32, data: &[u8]) {
        out.extend_from_slice(MAGIC_NEWC);
        out.extend_from_slice(
            format!(
                "{:08x}{:08x}{:08x}{:08x}{:08x}{:08x}{:08x}{:08x}{:08x}{:08x}{:08x}{:08x}{:08x}",
                ino,
                mode,
                0,
                0,
                nlink,
                1_400_000_000u32,
                data.len(),
                0,
                1,
                0,
                0,
                name.len() + 1,
                0
            )
            .as_bytes(),
        );
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        out.extend(std::iter::repeat_n(0u8, padding(NEWC_HEADER_SIZE + name.len() + 1)));
        out.extend_from_slice(data);
        out.extend(std::iter::repeat_n(0u8, padding(data.len())));
    }

    const DIR: u32 = S_IFDIR | 0o755;
    const FILE: u32 = S_IFREG | 0o644;
    const LINK: u32 = S_IFLNK | 0o777;

    fn python_payload() -> Vec<u8> {
        odc(&[
            (".", DIR, b""),
            ("./System", DIR, b""),
            ("./System/Library/Frameworks/Python.framework", DIR, b""),
            (
                "./System/Library/Frameworks/Python.framework/Versions/2.7/python",
                S_IFREG | 0o755,
                b"\xca\xfe\xba\xbe",
            ),
            (
                "./System/Library/Frameworks/Python.framework/Python",
                LINK,
                b"Versions/Current/Python",
            ),
            ("./usr/bin/pydoc", FILE, b"#!/usr/bin/python"),
            ("./usr/bin/ruby", FILE, b"ruby"),
            ("./usr/share/man/man1/ls.1", FILE, b"ls"),
        ])
    }

    #[test]
    fn reader_walks_odc_entries() {
        let archive = python_payload();
        let mut reader = CpioReader::new(archive.as_slice());

        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().unwrap() {
            if entry.name == "./usr/bin/pydoc" {
                assert_eq!(reader.read_data().unwrap(), b"#!/usr/bin/python");
                assert_eq!(entry.kind(), EntryKind::File);
                assert_eq!(entry.permissions(), 0o644);
                assert_eq!(entry.mtime, 1_400_000_000);
            }
            names.push(entry.name);
        }
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], ".");
    }

    #[test]
    fn reader_walks_newc_entries_with_padding() {
        let mut archive = Vec::new();
        newc_entry(&mut archive, "a", FILE, 1, 1, b"12345");
        newc_entry(&mut archive, "bb/c", FILE, 2, 1, b"xy");
        newc_entry(&mut archive, TRAILER, 0, 0, 1, b"");

        let mut reader = CpioReader::new(archive.as_slice());
        let first = reader.next_entry().unwrap().unwrap();
        assert_eq!(first.name, "a");
        // Skip data of the first entry without reading it
        let second = reader.next_entry().unwrap().unwrap();
        assert_eq!(second.name, "bb/c");
        assert_eq!(reader.read_data().unwrap(), b"xy");
        assert!(reader.next_entry().unwrap().is_none());
    }

    #[test]
    fn bad_magic_is_invalid_data() {
        let mut reader = CpioReader::new(&b"123456789012345678901234567890"[..]);
        let err = reader.next_entry().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn matcher_star_crosses_directories() {
        let matcher = EntryMatcher::new(&["*Py*", "*py*"]).unwrap();
        assert!(matcher.matches("./System/Library/Frameworks/Python.framework/Versions/2.7"));
        assert!(matcher.matches("./usr/bin/pydoc"));
        assert!(!matcher.matches("./usr/bin/ruby"));

        let ruby = EntryMatcher::new(&["*ruby*", "*lib*ruby*", "*Ruby.framework*"]).unwrap();
        assert!(ruby.matches("./usr/lib/ruby/2.0.0/set.rb"));
        assert!(ruby.matches("System/Library/Frameworks/Ruby.framework/Ruby"));
        assert!(!ruby.matches("./usr/bin/pydoc"));
    }

    #[test]
    fn extraction_selects_matching_entries() {
        let dest = tempfile::tempdir().unwrap();
        let matcher = EntryMatcher::new(&["*Py*", "*py*"]).unwrap();

        let stats = extract_matching(
            python_payload().as_slice(),
            dest.path(),
            &matcher,
            &ExtractOptions::default(),
        )
        .unwrap();

        assert_eq!(stats.directories, 1);
        assert_eq!(stats.files, 2);
        assert_eq!(stats.symlinks, 1);

        let framework = dest.path().join("System/Library/Frameworks/Python.framework");
        assert_eq!(
            std::fs::read(framework.join("Versions/2.7/python")).unwrap(),
            b"\xca\xfe\xba\xbe"
        );
        assert_eq!(
            std::fs::read_to_string(dest.path().join("usr/bin/pydoc")).unwrap(),
            "#!/usr/bin/python"
        );
        assert!(!dest.path().join("usr/bin/ruby").exists());
        assert!(!dest.path().join("usr/share").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            assert_eq!(
                std::fs::read_link(framework.join("Python")).unwrap(),
                Path::new("Versions/Current/Python")
            );
            let mode = std::fs::metadata(framework.join("Versions/2.7/python"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        let modified = std::fs::metadata(dest.path().join("usr/bin/pydoc"))
            .unwrap()
            .modified()
            .unwrap();
        assert_eq!(
            modified,
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_400_000_000)
        );
    }

    #[cfg(unix)]
    #[test]
    fn directory_mtimes_survive_later_writes() {
        let dest = tempfile::tempdir().unwrap();
        let matcher = EntryMatcher::new(&["*Py*", "*py*"]).unwrap();

        extract_matching(
            python_payload().as_slice(),
            dest.path(),
            &matcher,
            &ExtractOptions::default(),
        )
        .unwrap();

        let framework = dest.path().join("System/Library/Frameworks/Python.framework");
        assert_eq!(
            std::fs::metadata(framework).unwrap().modified().unwrap(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_400_000_000)
        );
    }

    #[test]
    fn extraction_overwrites_existing_files() {
        let dest = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dest.path().join("usr/bin")).unwrap();
        std::fs::write(dest.path().join("usr/bin/pydoc"), "stale").unwrap();

        let matcher = EntryMatcher::new(&["*pydoc"]).unwrap();
        extract_matching(
            python_payload().as_slice(),
            dest.path(),
            &matcher,
            &ExtractOptions::default(),
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.path().join("usr/bin/pydoc")).unwrap(),
            "#!/usr/bin/python"
        );
    }

    #[test]
    fn entries_escaping_the_root_are_skipped() {
        let dest = tempfile::tempdir().unwrap();
        let archive = odc(&[("../evil.py", FILE, b"x"), ("/abs/ok.py", FILE, b"y")]);
        let matcher = EntryMatcher::new(&["*py*"]).unwrap();

        let stats =
            extract_matching(archive.as_slice(), dest.path(), &matcher, &ExtractOptions::default())
                .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.files, 1);
        assert!(dest.path().join("abs/ok.py").exists());
    }

    #[test]
    fn newc_hard_links_share_data() {
        let dest = tempfile::tempdir().unwrap();
        let mut archive = Vec::new();
        newc_entry(&mut archive, "usr/bin/ruby-link", FILE, 9, 2, b"");
        newc_entry(&mut archive, "usr/bin/ruby", FILE, 9, 2, b"interp");
        newc_entry(&mut archive, TRAILER, 0, 0, 1, b"");

        let matcher = EntryMatcher::new(&["*ruby*"]).unwrap();
        let stats =
            extract_matching(archive.as_slice(), dest.path(), &matcher, &ExtractOptions::default())
                .unwrap();

        assert_eq!(stats.hard_links, 1);
        assert_eq!(
            std::fs::read_to_string(dest.path().join("usr/bin/ruby-link")).unwrap(),
            "interp"
        );
    }
}
