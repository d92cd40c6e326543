//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`bundle_rules`] - 组合价规则管理接口 (管理端)
//! - [`catalog`] - 商品目录接口 (读公开，写需管理权限)
//! - [`cart`] - 店面购物车接口
//! - [`admin`] - 防伪令牌签发 (管理端)
//!
//! 路由组装见 [`crate::routes`]。

pub mod admin;
pub mod bundle_rules;
pub mod cart;
pub mod catalog;
pub mod health;
