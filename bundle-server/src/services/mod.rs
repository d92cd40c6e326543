//! 服务层
//!
//! - [`CatalogService`] - 商品目录 (商品 + 分类树) 内存缓存

pub mod catalog_service;

pub use catalog_service::CatalogService;
