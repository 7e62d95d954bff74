use std::sync::atomic::{AtomicUsize, Ordering};

/// Opaque source of the strings every remote call needs: an API key,
/// the catalog (playlist) identifier and the channel identifier.
///
/// How the values are stored or revealed is the caller's business; the
/// client only asks, per request, for a key that is currently usable.
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> String;
    fn playlist_id(&self) -> String;
    fn channel_id(&self) -> String;
}

/// Round-robin provider over one or more API keys, for spreading quota
/// across several keys.
pub struct RotatingKeys {
    keys: Vec<String>,
    cursor: AtomicUsize,
    playlist_id: String,
    channel_id: String,
}

impl RotatingKeys {
    pub fn new(
        key: impl Into<String>,
        playlist_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self::with_keys(vec![key.into()], playlist_id, channel_id)
    }

    pub fn with_keys(
        keys: Vec<String>,
        playlist_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        let keys = keys.into_iter().filter(|key| !key.is_empty()).collect();
        Self {
            keys,
            cursor: AtomicUsize::new(0),
            playlist_id: playlist_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

impl CredentialProvider for RotatingKeys {
    fn api_key(&self) -> String {
        if self.keys.is_empty() {
            return String::new();
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        self.keys[index].clone()
    }

    fn playlist_id(&self) -> String {
        self.playlist_id.clone()
    }

    fn channel_id(&self) -> String {
        self.channel_id.clone()
    }
}
