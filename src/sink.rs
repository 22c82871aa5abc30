use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Mutex,
};

use fs4::FileExt;

use crate::{
    error::{Error, Result},
    keypair::Keypair,
};

const ADDRESS_TAG: &str = "Address: ";
const KEY_TAG: &str = ", PrivateKey: ";

/// An accepted keypair, written once to the store and never touched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    keypair: Keypair,
}

impl MatchRecord {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn address(&self) -> &str {
        &self.keypair.address
    }

    pub fn private_key(&self) -> &str {
        &self.keypair.private_key
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            ADDRESS_TAG, self.keypair.address, KEY_TAG, self.keypair.private_key
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecordError(String);

impl fmt::Display for ParseRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed match record: {:?}", self.0)
    }
}

impl std::error::Error for ParseRecordError {}

impl FromStr for MatchRecord {
    type Err = ParseRecordError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let malformed = || ParseRecordError(line.to_owned());
        let rest = line.strip_prefix(ADDRESS_TAG).ok_or_else(malformed)?;
        let (address, private_key) = rest.split_once(KEY_TAG).ok_or_else(malformed)?;

        let is_token = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());
        if !is_token(address) || !is_token(private_key) {
            return Err(malformed());
        }

        Ok(Self::new(Keypair {
            address: address.to_owned(),
            private_key: private_key.to_owned(),
        }))
    }
}

/// Append-only, line-per-match store shared by all workers.
#[derive(Debug)]
pub struct ResultSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl ResultSink {
    /// Opens (creating directories as needed) the store for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| Error::persistence(dir, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::persistence(&path, e))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one complete line and syncs it to disk before returning.
    pub fn record(&self, record: &MatchRecord) -> Result<()> {
        let line = format!("{}\n", record);

        // A poisoned lock only means another worker panicked mid-record; the
        // file handle itself is still usable.
        let file = self.file.lock().unwrap_or_else(|e| e.into_inner());

        // exclusively lock the file so other processes cannot interleave
        file.lock_exclusive()
            .map_err(|e| Error::persistence(&self.path, e))?;
        let written = (&*file)
            .write_all(line.as_bytes())
            .and_then(|_| file.sync_data());
        let unlocked = FileExt::unlock(&*file);

        written
            .and(unlocked)
            .map_err(|e| Error::persistence(&self.path, e))
    }

    /// Reads every record in a store, failing on the first malformed line.
    pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<MatchRecord>> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::persistence(path, e))?;

        contents
            .lines()
            .map(|line| {
                line.parse::<MatchRecord>().map_err(|e| {
                    Error::persistence(
                        path,
                        std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                    )
                })
            })
            .collect()
    }
}
