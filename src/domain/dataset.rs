// ==========================================
// 学前托育运营系统 - 导入领域模型
// ==========================================
// 职责: 导入会话的数据结构(数据集/映射/校验条目/上传结果)
// 红线: valid_rows 是派生值,只能通过 recompute_valid_rows 更新
// ==========================================

use crate::domain::types::{EntityKind, Severity, WarningKind};
use crate::schema::{FieldTransformer, FieldValidator};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// 转换后的提交行（字段名 → 类型化值）
pub type TransformedRow = HashMap<String, serde_json::Value>;

// ==========================================
// ValidationError - 行列级校验条目
// ==========================================
// 用途: 行号为 1 起始,列为目标字段名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: usize,         // 1 起始行号
    pub column: String,     // 目标字段名
    pub message: String,    // 面向用户的提示
    pub severity: Severity, // error 阻断该行 / warning 不阻断
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>, // 触发校验失败的原始值
}

// ==========================================
// ValidationWarning - 行级警告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub row: usize, // 1 起始行号
    pub message: String,
    #[serde(rename = "type")]
    pub kind: WarningKind,
}

// ==========================================
// DuplicateInfo - 疑似重复记录
// ==========================================
// 红线: 仅提示,不阻断提交
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateInfo {
    pub row: usize,           // 1 起始行号
    pub match_field: String,  // 命中的组合键（多字段以 + 连接）
    pub existing_id: String,  // 命中的已有记录 ID
}

// ==========================================
// ExistingRecord - 已有记录（查重比对用）
// ==========================================
// 用途: 由调用方预取,引擎只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingRecord {
    pub id: String,
    pub fields: HashMap<String, String>,
}

impl ExistingRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

// ==========================================
// ColumnMapping - 源列到目标字段的绑定
// ==========================================
// 不可序列化: 持有校验器/转换器的共享引用
// 红线: 每个源列至多一条映射,每个目标字段至多一条映射
#[derive(Clone)]
pub struct ColumnMapping {
    pub source_column: String, // 必须存在于 headers
    pub target_field: String,  // 必须存在于 required ∪ optional
    pub required: bool,        // = 目标字段 ∈ required_fields
    pub validate: Option<Arc<dyn FieldValidator>>,
    pub transform: Option<Arc<dyn FieldTransformer>>,
}

impl fmt::Debug for ColumnMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnMapping")
            .field("source_column", &self.source_column)
            .field("target_field", &self.target_field)
            .field("required", &self.required)
            .field("validate", &self.validate.is_some())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl PartialEq for ColumnMapping {
    /// 按绑定关系比较（校验器/转换器跟随目标字段,不参与比较）
    fn eq(&self, other: &Self) -> bool {
        self.source_column == other.source_column
            && self.target_field == other.target_field
            && self.required == other.required
    }
}

// ==========================================
// ParsedDataset - 导入会话工作数据集
// ==========================================
// 生命周期: 解析时创建,修订循环中原地修改,重置或提交成功后丢弃
#[derive(Debug, Clone, Default)]
pub struct ParsedDataset {
    pub headers: Vec<String>,                // 唯一,已归一化为 lower_snake_case
    pub rows: Vec<HashMap<String, String>>,  // 原始字符串行,未映射
    pub total_rows: usize,
    pub valid_rows: usize, // 派生值: 无 error 级条目的行数
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub duplicates: Vec<DuplicateInfo>,
}

impl ParsedDataset {
    /// 重算 valid_rows（errors 变化后必须调用）
    ///
    /// # 口径
    /// - valid_rows = total_rows - 含至少一条 error 级条目的行数（按行去重）
    pub fn recompute_valid_rows(&mut self) {
        let error_rows: HashSet<usize> = self
            .errors
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .map(|e| e.row)
            .collect();
        self.valid_rows = self.total_rows.saturating_sub(error_rows.len());
    }

    /// 该行（0 起始下标）当前是否有 error 级条目
    pub fn row_has_error(&self, index: usize) -> bool {
        self.errors
            .iter()
            .any(|e| e.row == index + 1 && e.severity == Severity::Error)
    }
}

// ==========================================
// BatchMeta - 提交批次元信息
// ==========================================
// 用途: 随提交批次一并传给外部持久化协作方
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMeta {
    pub batch_id: uuid::Uuid,
    pub entity: EntityKind,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub skipped_rows: usize,  // 因 error 级条目被排除的行数
    pub warning_count: usize, // 含疑似重复在内的警告数
}

// ==========================================
// UploadResult - 外部协作方返回的上传结果
// ==========================================
// 红线: 引擎不产生此结构,只原样转交
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub processed_count: usize,
    pub error_count: usize,
    pub skipped_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_entry(row: usize, severity: Severity) -> ValidationError {
        ValidationError {
            row,
            column: "first_name".to_string(),
            message: "first name is required".to_string(),
            severity,
            value: None,
        }
    }

    #[test]
    fn test_recompute_valid_rows_distinct_by_row() {
        let mut dataset = ParsedDataset {
            total_rows: 3,
            // 同一行的两条 error 只算一行
            errors: vec![
                error_entry(1, Severity::Error),
                error_entry(1, Severity::Error),
                error_entry(3, Severity::Warning),
            ],
            ..Default::default()
        };
        dataset.recompute_valid_rows();
        assert_eq!(dataset.valid_rows, 2);
    }

    #[test]
    fn test_row_has_error_ignores_warnings() {
        let mut dataset = ParsedDataset {
            total_rows: 2,
            errors: vec![error_entry(2, Severity::Warning)],
            ..Default::default()
        };
        dataset.recompute_valid_rows();
        assert!(!dataset.row_has_error(1));
        assert_eq!(dataset.valid_rows, 2);
    }
}
