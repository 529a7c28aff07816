//! Username registry.
//!
//! An append-only file with one username per line. Listings may only be
//! created for names present here.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::codec::strip_quotes;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct UserRegistry {
    path: PathBuf,
}

impl UserRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exact line match. A missing registry file holds no users.
    pub fn exists(&self, username: &str) -> Result<bool> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("registry {} does not exist", self.path.display());
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim_end_matches('\r') == username {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn register(&self, username: &str) -> Result<()> {
        let username = normalize_username(username)?;
        if self.exists(&username)? {
            return Err(Error::AlreadyExists(username));
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{username}")?;
        file.flush()?;
        log::info!("registered user {username}");
        Ok(())
    }
}

/// Trims and strips quotes; rejects names that could not be stored as one
/// registry line or one listing field.
pub fn normalize_username(username: &str) -> Result<String> {
    let name = strip_quotes(username.trim());
    if name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || c == ',' || c == '|')
    {
        return Err(Error::InvalidUsername(username.to_string()));
    }
    Ok(name)
}
