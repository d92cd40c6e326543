//! 认证模块 - 管理端能力检查与防伪令牌

mod authority;
mod middleware;

pub use authority::{
    DELETE_RULE, GET_RULE, HostAuthority, NONCE_ACTIONS, SAVE_RULE, TokenAuthority,
};
pub use middleware::{AdminContext, NONCE_HEADER, require_admin, require_nonce};
