//! Administrative API auth-token table (§4.3, §6): `logonConnection`
//! returns an `authToken` + permissions bitmask; every later call on that
//! connection is gated on the bits the token carries.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct TokenEntry {
    pub connection_id: u32,
    pub permissions: u32,
}

/// `authToken -> (connectionId, permissions)`, refreshed on each
/// successful `logonConnection` and cleared on `logoffConnection`.
#[derive(Default)]
pub struct SessionTable {
    tokens: Mutex<HashMap<String, TokenEntry>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: String, connection_id: u32, permissions: u32) {
        self.tokens.lock().unwrap().insert(token, TokenEntry { connection_id, permissions });
    }

    pub fn lookup(&self, token: &str) -> Option<TokenEntry> {
        self.tokens.lock().unwrap().get(token).cloned()
    }

    pub fn remove(&self, token: &str) {
        self.tokens.lock().unwrap().remove(token);
    }

    /// Returns `Ok(())` if `token` carries every bit in `required`;
    /// `Err(AdminError)` otherwise (unknown token, or missing bits).
    pub fn authorize(&self, token: &str, required: u32) -> Result<TokenEntry, crate::error::AdminError> {
        let entry = self.lookup(token).ok_or(crate::error::AdminError::UnknownToken)?;
        if crate::permission::allows(entry.permissions, required) {
            Ok(entry)
        } else {
            Err(crate::error::AdminError::PermissionDenied(required))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission;

    #[test]
    fn authorize_succeeds_when_bits_present() {
        let table = SessionTable::new();
        table.insert("tok".into(), 1, permission::PRESET_USER);
        assert!(table.authorize("tok", permission::QUERY_INFORMATION).is_ok());
    }

    #[test]
    fn authorize_fails_on_missing_bit() {
        let table = SessionTable::new();
        table.insert("tok".into(), 1, permission::PRESET_GUEST);
        assert!(table.authorize("tok", permission::QUERY_INFORMATION).is_err());
    }

    #[test]
    fn authorize_fails_on_unknown_token() {
        let table = SessionTable::new();
        assert!(table.authorize("nope", 0).is_err());
    }

    #[test]
    fn logoff_clears_the_token() {
        let table = SessionTable::new();
        table.insert("tok".into(), 1, permission::FULL);
        table.remove("tok");
        assert!(table.lookup("tok").is_none());
    }
}
