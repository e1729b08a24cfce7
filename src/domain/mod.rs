// ==========================================
// 学前托育运营系统 - 领域层
// ==========================================
// 职责: 导入引擎的实体与类型定义
// ==========================================

pub mod dataset;
pub mod types;

pub use dataset::{
    BatchMeta, ColumnMapping, DuplicateInfo, ExistingRecord, ParsedDataset, TransformedRow,
    UploadResult, ValidationError, ValidationWarning,
};
pub use types::{EntityKind, Severity, WarningKind};
