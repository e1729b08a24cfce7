// ==========================================
// 学前托育运营系统 - 提交前行转换
// ==========================================
// 职责: 原始字符串行 → 类型化提交行(仅含已映射字段)
// 红线: 纯函数,不修改输入,转换失败由转换器自行兜底,不得 panic
// ==========================================

use crate::domain::dataset::{ColumnMapping, TransformedRow};
use serde_json::Value;
use std::collections::HashMap;

/// 按映射转换单行
///
/// # 口径
/// - 输出仅含映射过的目标字段,未映射源列被丢弃
/// - 非空单元格且字段声明了转换器时取转换值,否则原样封装为字符串
/// - 空单元格保留为空字符串,由协作方决定取舍
pub fn transform_row(row: &HashMap<String, String>, mappings: &[ColumnMapping]) -> TransformedRow {
    mappings
        .iter()
        .map(|mapping| {
            let raw = row
                .get(&mapping.source_column)
                .map(String::as_str)
                .unwrap_or("");
            let value = match &mapping.transform {
                Some(transformer) if !raw.trim().is_empty() => transformer.transform(raw.trim()),
                _ => Value::String(raw.to_string()),
            };
            (mapping.target_field.clone(), value)
        })
        .collect()
}
