//! Flat-file record store.
//!
//! The listings file is a CSV container whose records each hold a single
//! field: the `|`-delimited payload produced by [`codec::encode`]. Every
//! operation reads the whole file. Deletes blank the matching line and
//! compact the file through a temp-file rename; updates replace the record
//! in the same pass.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Terminator, WriterBuilder};

use crate::clock::{Clock, SystemClock};
use crate::codec::{self, strip_quotes, Listing};
use crate::config::StoreConfig;
use crate::lock::StoreLock;
use crate::registry::UserRegistry;
use crate::timestamp;
use crate::{Error, Result};

/// Fields supplied by the caller when creating a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub owner: String,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub category: String,
}

/// Replacement fields for an update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub category: Option<String>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
    }

    fn apply(&self, previous: &Listing) -> Listing {
        Listing {
            id: previous.id,
            owner: previous.owner.clone(),
            title: self.title.clone().unwrap_or_else(|| previous.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| previous.description.clone()),
            price: self.price.unwrap_or(previous.price),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| previous.category.clone()),
            created_at: previous.created_at.clone(),
        }
        .normalized()
    }
}

pub struct RecordStore {
    config: StoreConfig,
    registry: UserRegistry,
    clock: Box<dyn Clock>,
}

impl RecordStore {
    pub fn open(config: StoreConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: StoreConfig, clock: impl Clock) -> Self {
        let registry = UserRegistry::new(config.users_path.clone());
        Self {
            config,
            registry,
            clock: Box::new(clock),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    pub fn path(&self) -> &Path {
        &self.config.listings_path
    }

    pub fn register(&self, username: &str) -> Result<()> {
        let _guard = self.lock()?;
        ensure_parent(&self.config.users_path)?;
        self.registry.register(username)
    }

    /// Every payload line, soft-deleted ones included. A missing file is
    /// an empty store.
    pub fn read_all(&self) -> Result<Vec<String>> {
        let file = match File::open(self.path()) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("listings file {} does not exist", self.path().display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);
        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record?;
            // An unquoted comma splits the payload; put it back together.
            lines.push(record.iter().collect::<Vec<_>>().join(","));
        }
        log::debug!("read {} lines from {}", lines.len(), self.path().display());
        Ok(lines)
    }

    /// Live records decoded in file order.
    pub fn listings(&self) -> Result<Vec<Listing>> {
        self.read_all()?
            .iter()
            .filter(|line| !codec::is_deleted(line))
            .map(|line| codec::decode(line))
            .collect()
    }

    /// One past the highest decodable id, or 1 for an empty or unreadable
    /// store.
    pub fn next_id(&self) -> u64 {
        let lines = match self.read_all() {
            Ok(lines) => lines,
            Err(err) => {
                log::warn!("cannot read {}: {err}", self.path().display());
                return 1;
            }
        };
        let mut max_id: u64 = 0;
        for line in lines.iter().filter(|line| !codec::is_deleted(line)) {
            match codec::decode(line) {
                Ok(listing) => max_id = max_id.max(listing.id),
                Err(err) => log::warn!("skipping undecodable line: {err}"),
            }
        }
        // Decoded ids never exceed codec::MAX_ID, so this cannot saturate.
        max_id.saturating_add(1)
    }

    /// Whether a live record has the same title, description and category.
    pub fn exists(&self, listing: &Listing) -> Result<bool> {
        for stored in self.listings()? {
            if stored.same_product(listing) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn append(&self, listing: &Listing) -> Result<()> {
        let _guard = self.lock()?;
        self.append_locked(listing)
    }

    /// Assigns the next id and the creation time, then appends.
    pub fn create(&self, new: NewListing) -> Result<Listing> {
        let _guard = self.lock()?;
        let listing = Listing {
            id: self.next_id(),
            owner: new.owner,
            title: new.title,
            description: new.description,
            price: new.price,
            category: new.category,
            created_at: timestamp::format(self.clock.now()),
        }
        .normalized();
        self.append_locked(&listing)?;
        Ok(listing)
    }

    /// Rewrites the file from `lines`, dropping soft-deleted ones. The new
    /// contents land in a sibling temp file that is renamed into place.
    pub fn compact_rewrite(&self, lines: &[String]) -> Result<()> {
        let path = self.path();
        ensure_parent(path)?;
        let tmp = tmp_path(path);
        let kept = match write_then_rename(lines, &tmp, path) {
            Ok(kept) => kept,
            Err(err) => {
                if let Err(cleanup) = std::fs::remove_file(&tmp) {
                    if cleanup.kind() != ErrorKind::NotFound {
                        log::warn!("cannot remove {}: {cleanup}", tmp.display());
                    }
                }
                return Err(err);
            }
        };
        log::debug!("rewrote {} with {kept} lines", path.display());
        Ok(())
    }

    pub fn get(&self, owner: &str, id: u64) -> Result<Listing> {
        let lines = self.read_all()?;
        let (_, listing) = find_owned(&lines, owner, id)?;
        Ok(listing)
    }

    pub fn delete(&self, owner: &str, id: u64) -> Result<()> {
        let _guard = self.lock()?;
        let mut lines = self.read_all()?;
        let (index, _) = find_owned(&lines, owner, id)?;
        lines[index].clear();
        self.compact_rewrite(&lines)?;
        log::info!("deleted listing {id} of {owner}");
        Ok(())
    }

    /// Replaces listing `id` with `patch` merged over it, in one rewrite.
    /// The id, owner and creation time are kept; the record moves to the
    /// end of the file.
    pub fn update(&self, owner: &str, id: u64, patch: &ListingPatch) -> Result<Listing> {
        let _guard = self.lock()?;
        let mut lines = self.read_all()?;
        let (index, previous) = find_owned(&lines, owner, id)?;
        let merged = patch.apply(&previous);

        for (other, line) in lines.iter().enumerate() {
            if other == index || codec::is_deleted(line) {
                continue;
            }
            if codec::decode(line)?.same_product(&merged) {
                return Err(Error::DuplicateListing);
            }
        }
        if !self.registry.exists(&merged.owner)? {
            return Err(Error::UnknownOwner(merged.owner));
        }

        lines[index].clear();
        lines.push(codec::encode(&merged));
        self.compact_rewrite(&lines)?;
        log::info!("updated listing {id} of {owner}");
        Ok(merged)
    }

    fn append_locked(&self, listing: &Listing) -> Result<()> {
        if self.exists(listing)? {
            return Err(Error::DuplicateListing);
        }
        let owner = strip_quotes(&listing.owner);
        if !self.registry.exists(&owner)? {
            return Err(Error::UnknownOwner(owner));
        }

        ensure_parent(self.path())?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);
        writer.write_record([codec::encode(listing)])?;
        writer.flush()?;
        log::info!("appended listing {} for {owner}", listing.id);
        Ok(())
    }

    fn lock(&self) -> Result<Option<StoreLock>> {
        if !self.config.lock {
            return Ok(None);
        }
        let path = self.config.lock_path();
        ensure_parent(&path)?;
        StoreLock::acquire(&path).map(Some)
    }
}

/// First live record with `id`, checked against `owner`.
fn find_owned(lines: &[String], owner: &str, id: u64) -> Result<(usize, Listing)> {
    for (index, line) in lines.iter().enumerate() {
        if codec::is_deleted(line) {
            continue;
        }
        let listing = codec::decode(line)?;
        if listing.id != id {
            continue;
        }
        if strip_quotes(owner) != strip_quotes(&listing.owner) {
            return Err(Error::OwnershipMismatch {
                id,
                owner: owner.to_string(),
            });
        }
        return Ok((index, listing));
    }
    Err(Error::NotFound(id))
}

fn write_then_rename(lines: &[String], tmp: &Path, path: &Path) -> Result<usize> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(tmp)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(file);
    let mut kept = 0usize;
    for line in lines.iter().filter(|line| !codec::is_deleted(line)) {
        writer.write_record([line.as_str()])?;
        kept += 1;
    }
    writer.flush()?;
    writer.get_ref().sync_all()?;
    drop(writer);
    std::fs::rename(tmp, path)?;
    Ok(kept)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}
