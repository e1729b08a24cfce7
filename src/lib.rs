// ==========================================
// 学前托育运营系统 - 核心库
// ==========================================
// 技术栈: Rust + serde + tracing
// 系统定位: 批量数据导入引擎 (解析/映射/校验/修订/提交)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据集与类型
pub mod domain;

// Schema 层 - 实体导入配置
pub mod schema;

// 导入层 - 批量导入流水线
pub mod importer;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntityKind, Severity, WarningKind};

// 领域数据结构
pub use domain::{
    BatchMeta, ColumnMapping, DuplicateInfo, ExistingRecord, ParsedDataset, TransformedRow,
    UploadResult, ValidationError, ValidationWarning,
};

// Schema 层
pub use schema::{FieldTransformer, FieldValidator, ImportConfiguration, SchemaRegistry};

// 导入引擎
pub use importer::{
    generate_template, tokenize, CustomValidator, ImportError, ImportOrchestrator, ImportResult,
    ImportSession, UploadSink,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学前托育运营系统";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
