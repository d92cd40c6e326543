//! 管理权限与防伪令牌
//!
//! 管理端写操作需要两道检查：
//! 1. 能力检查 (capability): `Authorization: Bearer <ADMIN_TOKEN>`
//! 2. 防伪令牌 (nonce): `X-Admin-Nonce`, 按 action 签发
//!
//! 宿主平台可以用自己的 [`HostAuthority`] 实现替换 [`TokenAuthority`]。

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Nonce 有效窗口 (12 小时一档，接受当前档和上一档)
const NONCE_TICK_MS: i64 = 12 * 60 * 60 * 1000;
/// Nonce 长度 (截断后的 MAC 字节数)
const NONCE_BYTES: usize = 12;
/// 从 NONCE_SECRET 派生签名密钥时使用的标签
const NONCE_KEY_LABEL: &[u8] = b"bundle-server/nonce-key";

/// Actions a nonce can be issued for
pub const NONCE_ACTIONS: &[&str] = &[GET_RULE, SAVE_RULE, DELETE_RULE];
pub const GET_RULE: &str = "get_rule";
pub const SAVE_RULE: &str = "save_rule";
pub const DELETE_RULE: &str = "delete_rule";

pub trait HostAuthority: Send + Sync {
    /// Capability check for the bearer credential
    fn can_manage(&self, bearer: &str) -> bool;

    /// Issue a request-forgery token for an action
    fn issue_nonce(&self, action: &str) -> String;

    fn verify_nonce(&self, action: &str, nonce: &str) -> bool;
}

/// Shared-secret authority: one admin token, HMAC-SHA256 nonces
///
/// The nonce key is derived from `nonce_secret`, so it never equals the
/// bearer credential even when both come from the same configured value.
pub struct TokenAuthority {
    /// MAC of the admin token under the nonce key, None when no token is set
    admin_token_mac: Option<Vec<u8>>,
    /// HMAC keyed with the derived nonce key, cloned per use
    keyed: HmacSha256,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("admin_token", &"***")
            .field("nonce_key", &"***")
            .finish()
    }
}

impl TokenAuthority {
    pub fn new(
        admin_token: impl Into<String>,
        nonce_secret: impl Into<String>,
    ) -> Result<Self, InvalidLength> {
        let admin_token = admin_token.into();
        let nonce_key = mac_bytes(nonce_secret.into().as_bytes(), NONCE_KEY_LABEL)?;
        let admin_token_mac = if admin_token.is_empty() {
            None
        } else {
            Some(mac_bytes(&nonce_key, admin_token.as_bytes())?)
        };
        Ok(Self {
            admin_token_mac,
            keyed: HmacSha256::new_from_slice(&nonce_key)?,
        })
    }

    fn nonce_mac(&self, action: &str, tick: i64) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(format!("{action}:{tick}").as_bytes());
        mac
    }

    fn current_tick() -> i64 {
        shared::util::now_millis() / NONCE_TICK_MS
    }
}

fn mac_bytes(key: &[u8], message: &[u8]) -> Result<Vec<u8>, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

impl HostAuthority for TokenAuthority {
    fn can_manage(&self, bearer: &str) -> bool {
        let Some(expected) = &self.admin_token_mac else {
            return false;
        };
        let mut mac = self.keyed.clone();
        mac.update(bearer.as_bytes());
        mac.verify_slice(expected).is_ok()
    }

    fn issue_nonce(&self, action: &str) -> String {
        let tag = self
            .nonce_mac(action, Self::current_tick())
            .finalize()
            .into_bytes();
        hex::encode(&tag[..NONCE_BYTES])
    }

    fn verify_nonce(&self, action: &str, nonce: &str) -> bool {
        let Ok(tag) = hex::decode(nonce) else {
            return false;
        };
        if tag.len() != NONCE_BYTES {
            return false;
        }
        let tick = Self::current_tick();
        [tick, tick - 1].iter().any(|t| {
            self.nonce_mac(action, *t)
                .verify_truncated_left(&tag)
                .is_ok()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_check() {
        let auth = TokenAuthority::new("s3cret", "nonce-key").unwrap();
        assert!(auth.can_manage("s3cret"));
        assert!(!auth.can_manage("s3cre"));
        assert!(!auth.can_manage(""));
    }

    #[test]
    fn test_empty_admin_token_never_matches() {
        let auth = TokenAuthority::new("", "nonce-key").unwrap();
        assert!(!auth.can_manage(""));
    }

    #[test]
    fn test_nonce_bound_to_action() {
        let auth = TokenAuthority::new("s3cret", "nonce-key").unwrap();
        let nonce = auth.issue_nonce(SAVE_RULE);

        assert!(auth.verify_nonce(SAVE_RULE, &nonce));
        assert!(!auth.verify_nonce(DELETE_RULE, &nonce));
        assert!(!auth.verify_nonce(SAVE_RULE, "deadbeef"));
    }

    #[test]
    fn test_nonce_bound_to_secret() {
        let a = TokenAuthority::new("s3cret", "key-a").unwrap();
        let b = TokenAuthority::new("s3cret", "key-b").unwrap();
        assert!(!b.verify_nonce(SAVE_RULE, &a.issue_nonce(SAVE_RULE)));
    }

    #[test]
    fn test_nonce_is_hmac_over_action_and_tick() {
        let auth = TokenAuthority::new("s3cret", "nonce-key").unwrap();
        let tick = TokenAuthority::current_tick();

        let key = mac_bytes(b"nonce-key", NONCE_KEY_LABEL).unwrap();
        let expected = mac_bytes(&key, format!("{SAVE_RULE}:{tick}").as_bytes()).unwrap();
        assert_eq!(auth.issue_nonce(SAVE_RULE), hex::encode(&expected[..NONCE_BYTES]));

        // 上一档仍然有效，再往前一档失效
        let previous = mac_bytes(&key, format!("{SAVE_RULE}:{}", tick - 1).as_bytes()).unwrap();
        assert!(auth.verify_nonce(SAVE_RULE, &hex::encode(&previous[..NONCE_BYTES])));
        let stale = mac_bytes(&key, format!("{SAVE_RULE}:{}", tick - 2).as_bytes()).unwrap();
        assert!(!auth.verify_nonce(SAVE_RULE, &hex::encode(&stale[..NONCE_BYTES])));
    }

    #[test]
    fn test_truncated_or_malformed_nonce_rejected() {
        let auth = TokenAuthority::new("s3cret", "nonce-key").unwrap();
        let nonce = auth.issue_nonce(DELETE_RULE);

        assert!(!auth.verify_nonce(DELETE_RULE, &nonce[..2]));
        assert!(!auth.verify_nonce(DELETE_RULE, ""));
        assert!(!auth.verify_nonce(DELETE_RULE, "not-hex"));
        assert!(!auth.verify_nonce(DELETE_RULE, &format!("{nonce}00")));
    }

    #[test]
    fn test_nonce_key_differs_from_shared_secret() {
        // ADMIN_TOKEN 同时作为 NONCE_SECRET 时，签名密钥仍是派生值
        let auth = TokenAuthority::new("shared", "shared").unwrap();
        let tick = TokenAuthority::current_tick();
        let raw = mac_bytes(b"shared", format!("{SAVE_RULE}:{tick}").as_bytes()).unwrap();

        assert!(!auth.verify_nonce(SAVE_RULE, &hex::encode(&raw[..NONCE_BYTES])));
        assert!(auth.can_manage("shared"));
    }
}
