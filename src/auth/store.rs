use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::AuthError;
use super::token::Credentials;

/// File name of the persisted credential file inside the store directory.
pub const CREDENTIAL_FILE: &str = "credentials.toml";

const CREDENTIAL_FILE_VERSION: u32 = 1;

/// Durable holder of the current access and refresh token.
///
/// Pure storage: implementations never validate token structure. Reads
/// never fail; an unreadable backing store reads as empty, which degrades
/// to logged-out behaviour.
pub trait CredentialStore: Send + Sync {
    /// Snapshot of both tokens.
    fn load(&self) -> Credentials;

    /// Overwrite both tokens.
    fn save(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError>;

    /// Overwrite only the access token, keeping the refresh token.
    fn update_access_token(&self, access_token: &str) -> Result<(), AuthError>;

    /// Remove both tokens. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<(), AuthError>;

    fn access_token(&self) -> Option<String> {
        self.load().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.load().refresh_token
    }
}

/// Configuration for file-backed credential storage.
#[derive(Debug, Clone)]
pub struct CredentialStoreConfig {
    pub base_dir: PathBuf,
}

impl CredentialStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_fitplan_dir()
    }
}

/// File-backed credential store using a TOML file.
///
/// The file holds two named entries, `access_token` and `refresh_token`,
/// and is written with owner-only permissions on unix.
///
/// # Example
/// ```no_run
/// use fitplan::auth::{CredentialStore, FileCredentialStore};
///
/// let store = FileCredentialStore::new_default();
/// store.save("access", "refresh")?;
/// assert_eq!(store.access_token().as_deref(), Some("access"));
/// # Ok::<(), fitplan::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(config: CredentialStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_fitplan_dir(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.base_dir.join(CREDENTIAL_FILE)
    }

    fn read(&self) -> Result<Credentials, AuthError> {
        let raw = match fs::read_to_string(self.path()) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Credentials::default())
            }
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: CredentialFile = toml::from_str(&raw)?;
        Ok(file.credentials)
    }

    fn write(&self, credentials: Credentials) -> Result<(), AuthError> {
        let path = self.path();
        ensure_parent(&path)?;
        let file = CredentialFile {
            version: CREDENTIAL_FILE_VERSION,
            saved_at: Utc::now(),
            credentials,
        };
        let serialized = toml::to_string(&file)?;
        let mut handle = owner_only_file(&path)?;
        handle.write_all(serialized.as_bytes())?;
        // Tighten files created before the mode was set at open time.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Credentials {
        match self.read() {
            Ok(credentials) => credentials,
            Err(err) => {
                warn!(path = %self.path().display(), error = %err, "Credential file unreadable, treating as empty");
                Credentials::default()
            }
        }
    }

    fn save(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError> {
        self.write(Credentials::new(access_token, refresh_token))
    }

    fn update_access_token(&self, access_token: &str) -> Result<(), AuthError> {
        let mut credentials = self.load();
        credentials.access_token = Some(access_token.to_string());
        self.write(credentials)
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

/// Process-local credential store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given tokens.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Mutex::new(credentials),
        }
    }

    fn with_lock<R>(&self, f: impl FnOnce(&mut Credentials) -> R) -> R {
        let mut guard = self
            .credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Credentials {
        self.with_lock(|c| c.clone())
    }

    fn save(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError> {
        self.with_lock(|c| *c = Credentials::new(access_token, refresh_token));
        Ok(())
    }

    fn update_access_token(&self, access_token: &str) -> Result<(), AuthError> {
        self.with_lock(|c| c.access_token = Some(access_token.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        self.with_lock(|c| *c = Credentials::default());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(flatten)]
    credentials: Credentials,
}

fn ensure_parent(path: &Path) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Open `path` for writing, truncating it; new files are created 0600 on unix.
fn owner_only_file(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

fn default_fitplan_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".fitplan"))
        .unwrap_or_else(|| PathBuf::from(".fitplan"))
}
