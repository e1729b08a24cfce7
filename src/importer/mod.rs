// ==========================================
// 学前托育运营系统 - 批量导入引擎
// ==========================================
// 职责: 解析 → 映射 → 校验 → 修订 → 转换 → 提交的完整导入流水线
// 红线: 引擎不做文件 I/O、不落库,一切外部交互经由协作方 trait
// ==========================================

pub mod auto_mapper;
pub mod error;
pub mod importer_trait;
pub mod orchestrator;
pub mod row_validator;
pub mod session;
pub mod template;
pub mod tokenizer;
pub mod transform;

pub use auto_mapper::auto_map;
pub use error::{ImportError, ImportResult};
pub use importer_trait::{CustomValidator, UploadSink};
pub use orchestrator::ImportOrchestrator;
pub use row_validator::{RowValidator, ValidationOutcome};
pub use session::ImportSession;
pub use template::generate_template;
pub use tokenizer::{tokenize, Tokenized};
pub use transform::transform_row;
