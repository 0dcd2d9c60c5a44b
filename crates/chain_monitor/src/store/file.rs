use std::fs::{self, create_dir_all};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{Store, StoreError};
use crate::block::BlockStore;

/// Pretty-printed JSON object mapping decimal heights to block records.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let p = path.as_ref().to_path_buf();
        if let Some(dir) = p.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            create_dir_all(dir)?;
        }
        Ok(JsonFileStore { path: p })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Temp file in the target's directory carrying the mode the target should end up with:
    /// the existing file's mode, or `0o666` less the umask for a first save.
    #[cfg(unix)]
    fn temp_file(&self) -> io::Result<NamedTempFile> {
        use std::os::unix::fs::PermissionsExt;

        let existing = match fs::metadata(&self.path) {
            Ok(meta) => Some(meta.permissions()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };
        let mode = existing
            .clone()
            .unwrap_or_else(|| fs::Permissions::from_mode(0o666));
        let tmp = tempfile::Builder::new()
            .permissions(mode)
            .tempfile_in(self.dir())?;
        // Creation is masked by the umask; an existing mode is restored exactly.
        if let Some(perms) = existing {
            tmp.as_file().set_permissions(perms)?;
        }
        Ok(tmp)
    }

    #[cfg(not(unix))]
    fn temp_file(&self) -> io::Result<NamedTempFile> {
        NamedTempFile::new_in(self.dir())
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Option<BlockStore>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(Some(BlockStore::new()));
        }
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, blocks: &BlockStore) -> Result<(), StoreError> {
        // Written next to the target so the rename stays on one filesystem.
        let tmp = self.temp_file()?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, blocks).map_err(StoreError::Encode)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}
