use boda_shared::models::UsuarioPublico;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::error::{ClientError, Result};

/// What the client remembers between requests: the bearer token and, for
/// dashboard users, the cached user record. Guest sessions carry no user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub usuario: Option<UsuarioPublico>,
}

impl Session {
    pub fn guest(token: &str) -> Self {
        Self {
            token: token.to_string(),
            usuario: None,
        }
    }

    pub fn boda_id(&self) -> Option<&str> {
        self.usuario.as_ref().and_then(|u| u.boda_id.as_deref())
    }
}

/// Persistence behind the identity provider.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Keeps the session as a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::Session(e.to_string())),
        };
        match serde_json::from_slice(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_vec_pretty(session)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| ClientError::Session(e.to_string()))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(e.to_string())),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self
            .session
            .lock()
            .map_err(|_| ClientError::Session("session lock poisoned".into()))?
            .clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self
            .session
            .lock()
            .map_err(|_| ClientError::Session("session lock poisoned".into()))? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .session
            .lock()
            .map_err(|_| ClientError::Session("session lock poisoned".into()))? = None;
        Ok(())
    }
}

/// Single owner of the client identity. Every request reads the token from
/// here, and views subscribe to changes instead of reading storage themselves.
#[derive(Clone)]
pub struct IdentityProvider {
    store: Arc<dyn SessionStore>,
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl IdentityProvider {
    /// Loads whatever session the store already holds.
    pub fn new(store: Arc<dyn SessionStore>) -> Result<Self> {
        let initial = store.load()?;
        debug!("Identity provider started, session present: {}", initial.is_some());
        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            store,
            tx: Arc::new(tx),
        })
    }

    pub fn in_memory() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            store: Arc::new(MemorySessionStore::default()),
            tx: Arc::new(tx),
        }
    }

    pub fn get(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn set(&self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        self.tx.send_replace(Some(session));
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()?;
        self.tx.send_replace(None);
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boda_shared::models::Rol;

    fn usuario() -> UsuarioPublico {
        UsuarioPublico {
            id: "u-1".to_string(),
            nombre: "Ana".to_string(),
            tipo_usuario: Rol::Novio,
            boda_id: Some("boda-1".to_string()),
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = std::env::temp_dir().join(format!("boda-session-{}.json", uuid::Uuid::new_v4()));
        let store = FileSessionStore::new(&path);
        assert_eq!(store.load().unwrap(), None);

        let session = Session {
            token: "t".to_string(),
            usuario: Some(usuario()),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[tokio::test]
    async fn test_subscribers_see_set_and_clear() {
        let identity = IdentityProvider::in_memory();
        let mut rx = identity.subscribe();

        identity
            .set(Session {
                token: "t-1".to_string(),
                usuario: Some(usuario()),
            })
            .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().and_then(|s| s.boda_id()), Some("boda-1"));
        assert_eq!(identity.token().as_deref(), Some("t-1"));

        identity.clear().unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn test_provider_restores_persisted_session() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::default());
        store.save(&Session::guest("guest-token")).unwrap();

        let identity = IdentityProvider::new(store).unwrap();
        assert_eq!(identity.token().as_deref(), Some("guest-token"));
    }
}
