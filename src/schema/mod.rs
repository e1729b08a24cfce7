// ==========================================
// 学前托育运营系统 - Schema 层
// ==========================================
// 职责: 实体导入配置的定义与注册
// ==========================================

pub mod import_config;
pub mod registry;
pub mod rules;

pub use import_config::{FieldTransformer, FieldValidator, ImportConfiguration};
pub use registry::SchemaRegistry;
