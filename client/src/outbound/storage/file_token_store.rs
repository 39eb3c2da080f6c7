//! File-backed [`TokenStore`].
//!
//! Both slots live in one JSON document, `tokens.json`, inside the configured
//! token directory. Writes go to a staging file that is then renamed over the
//! document, so readers never observe a half-written file.

use std::collections::BTreeMap;
use std::io;
use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use tracing::{debug, warn};

use crate::domain::AccessToken;
use crate::domain::ports::{TokenSlot, TokenStore, TokenStoreError};

/// Name of the token document inside the token directory.
pub const TOKEN_FILE_NAME: &str = "tokens.json";
const STAGING_FILE_NAME: &str = ".tokens.json.tmp";

type TokenDocument = BTreeMap<String, String>;

/// Token slots persisted as JSON in a capability-scoped directory.
pub struct FileTokenStore {
    dir: Dir,
    root: Utf8PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: &Utf8Path) -> Result<Self, TokenStoreError> {
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|err| io_error(root, &err))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| io_error(root, &err))?;
        Ok(Self {
            dir,
            root: root.to_owned(),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the token document.
    pub fn document_path(&self) -> Utf8PathBuf {
        self.root.join(TOKEN_FILE_NAME)
    }

    fn read_document(&self) -> Result<TokenDocument, TokenStoreError> {
        let contents = match self.dir.read_to_string(TOKEN_FILE_NAME) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(TokenDocument::new()),
            Err(err) => return Err(io_error(&self.document_path(), &err)),
        };
        if contents.trim().is_empty() {
            return Ok(TokenDocument::new());
        }
        serde_json::from_str(&contents).map_err(|err| {
            TokenStoreError::corrupt(format!("{}: {err}", self.document_path()))
        })
    }

    fn write_document(&self, document: &TokenDocument) -> Result<(), TokenStoreError> {
        let payload = serde_json::to_vec_pretty(document)
            .map_err(|err| TokenStoreError::io(format!("failed to encode tokens: {err}")))?;
        self.dir
            .write(STAGING_FILE_NAME, payload)
            .map_err(|err| io_error(&self.root.join(STAGING_FILE_NAME), &err))?;
        self.dir
            .rename(STAGING_FILE_NAME, &self.dir, TOKEN_FILE_NAME)
            .map_err(|err| io_error(&self.document_path(), &err))
    }

    fn update(&self, apply: impl FnOnce(&mut TokenDocument)) -> Result<(), TokenStoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut document = match self.read_document() {
            Ok(document) => document,
            Err(TokenStoreError::Corrupt { message }) => {
                warn!(%message, "replacing unreadable token document");
                TokenDocument::new()
            }
            Err(err) => return Err(err),
        };
        apply(&mut document);
        self.write_document(&document)
    }
}

fn io_error(path: &Utf8Path, err: &io::Error) -> TokenStoreError {
    TokenStoreError::io(format!("{path}: {err}"))
}

impl TokenStore for FileTokenStore {
    fn load(&self, slot: TokenSlot) -> Result<Option<AccessToken>, TokenStoreError> {
        let document = self.read_document()?;
        Ok(document.get(slot.key()).map(|raw| AccessToken::new(raw.as_str())))
    }

    fn save(&self, slot: TokenSlot, token: &AccessToken) -> Result<(), TokenStoreError> {
        self.update(|document| {
            document.insert(slot.key().to_owned(), token.expose().to_owned());
        })?;
        debug!(%slot, path = %self.document_path(), "token stored");
        Ok(())
    }

    fn clear(&self, slot: TokenSlot) -> Result<(), TokenStoreError> {
        self.update(|document| {
            document.remove(slot.key());
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Workspace {
        _temp: TempDir,
        root: Utf8PathBuf,
    }

    #[fixture]
    fn workspace() -> Workspace {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().join("nested").join("tokens"))
            .expect("utf-8 temp path");
        Workspace { _temp: temp, root }
    }

    fn read_raw(root: &Utf8Path) -> String {
        let dir = Dir::open_ambient_dir(root, ambient_authority()).expect("open dir");
        dir.read_to_string(TOKEN_FILE_NAME).expect("read document")
    }

    #[rstest]
    fn missing_document_reads_as_empty(workspace: Workspace) {
        let store = FileTokenStore::open(&workspace.root).expect("open store");
        assert_eq!(store.load(TokenSlot::Access).expect("load"), None);
    }

    #[rstest]
    fn slots_persist_across_instances(workspace: Workspace) {
        let store = FileTokenStore::open(&workspace.root).expect("open store");
        store
            .save(TokenSlot::Access, &AccessToken::new("a-1"))
            .expect("save access");
        store
            .save(TokenSlot::Refresh, &AccessToken::new("r-1"))
            .expect("save refresh");
        drop(store);

        let reopened = FileTokenStore::open(&workspace.root).expect("reopen store");
        assert_eq!(
            reopened.load(TokenSlot::Access).expect("load"),
            Some(AccessToken::new("a-1"))
        );
        assert_eq!(
            reopened.load(TokenSlot::Refresh).expect("load"),
            Some(AccessToken::new("r-1"))
        );
        let raw = read_raw(&workspace.root);
        assert!(raw.contains("\"access_token\""));
        assert!(raw.contains("\"refresh_token\""));
    }

    #[rstest]
    fn clear_removes_only_its_slot(workspace: Workspace) {
        let store = FileTokenStore::open(&workspace.root).expect("open store");
        store
            .save(TokenSlot::Access, &AccessToken::new("a-1"))
            .expect("save access");
        store
            .save(TokenSlot::Refresh, &AccessToken::new("r-1"))
            .expect("save refresh");

        store.clear(TokenSlot::Access).expect("clear access");
        store.clear(TokenSlot::Access).expect("clearing twice is fine");

        assert_eq!(store.load(TokenSlot::Access).expect("load"), None);
        assert!(store.load(TokenSlot::Refresh).expect("load").is_some());
        let dir = Dir::open_ambient_dir(&workspace.root, ambient_authority()).expect("open dir");
        assert!(!dir.exists(STAGING_FILE_NAME));
    }

    #[rstest]
    fn corrupt_documents_are_reported(workspace: Workspace) {
        let store = FileTokenStore::open(&workspace.root).expect("open store");
        store
            .dir
            .write(TOKEN_FILE_NAME, b"{not json")
            .expect("write garbage");

        let err = store.load(TokenSlot::Access).expect_err("must fail");
        assert!(matches!(err, TokenStoreError::Corrupt { .. }));
    }

    #[rstest]
    fn writes_replace_a_corrupt_document(workspace: Workspace) {
        let store = FileTokenStore::open(&workspace.root).expect("open store");
        store
            .dir
            .write(TOKEN_FILE_NAME, b"{not json")
            .expect("write garbage");

        store
            .save(TokenSlot::Access, &AccessToken::new("a-2"))
            .expect("save over garbage");
        let reopened = FileTokenStore::open(&workspace.root).expect("reopen store");
        assert_eq!(
            reopened.load(TokenSlot::Access).expect("load"),
            Some(AccessToken::new("a-2"))
        );

        store
            .dir
            .write(TOKEN_FILE_NAME, b"{not json")
            .expect("write garbage");
        store.clear(TokenSlot::Access).expect("clear over garbage");
        assert_eq!(store.load(TokenSlot::Access).expect("load"), None);
    }
}
