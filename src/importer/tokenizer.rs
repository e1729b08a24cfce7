// ==========================================
// 学前托育运营系统 - 分隔文本切分器
// ==========================================
// 职责: 原始文本 → 表头 + 数据行(行号对齐的字符串映射)
// 口径: 按 '\n' 分行,按 ',' 分列,不处理引号转义(有损,已知约定);
//       短行补空串,长行截断,绝不因参差行报错
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use std::collections::{HashMap, HashSet};

// ==========================================
// Tokenized - 切分结果
// ==========================================
#[derive(Debug, Clone)]
pub struct Tokenized {
    pub headers: Vec<String>, // 唯一,已归一化为 lower_snake_case
    pub rows: Vec<HashMap<String, String>>,
}

/// 切分分隔文本
///
/// # 口径
/// - 空白行(含纯空格行)全部丢弃
/// - 第一条非空行为表头行
/// - 表头单元格: 去首尾空白 + 小写 + 内部空白段折叠为单个下划线
/// - 归一化后重名的表头追加 _2/_3… 后缀保证唯一
///
/// # 失败
/// - 无任何非空行时返回 EmptyInput
pub fn tokenize(content: &str) -> ImportResult<Tokenized> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let header_line = lines.next().ok_or(ImportError::EmptyInput)?;
    let headers = normalize_headers(header_line);

    let rows = lines
        .map(|line| {
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    // 短行补空串,长行多余列被自然截断
                    let value = values.get(idx).copied().unwrap_or("");
                    (header.clone(), value.to_string())
                })
                .collect()
        })
        .collect();

    Ok(Tokenized { headers, rows })
}

/// 归一化表头行并去重
fn normalize_headers(header_line: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    header_line
        .split(',')
        .map(|cell| {
            let base = normalize_header_cell(cell);
            let name = if seen.contains(&base) {
                let mut n = 2;
                while seen.contains(&format!("{}_{}", base, n)) {
                    n += 1;
                }
                format!("{}_{}", base, n)
            } else {
                base
            };
            seen.insert(name.clone());
            name
        })
        .collect()
}

/// 单个表头单元格归一化: "Parent Email" → "parent_email"
fn normalize_header_cell(cell: &str) -> String {
    cell.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
