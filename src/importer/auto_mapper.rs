// ==========================================
// 学前托育运营系统 - 列自动映射器
// ==========================================
// 职责: 源表头 → 目标字段的分层启发式匹配
// 口径: 必填字段优先(声明顺序),每个表头至多被认领一次;
//       四层匹配依次尝试,首个命中即生效
// 红线: 相同 (headers, schema) 输入必须产出完全相同的映射
// ==========================================

use crate::domain::dataset::ColumnMapping;
use crate::schema::ImportConfiguration;
use std::collections::HashSet;

/// 自动映射源表头到配置字段
///
/// # 匹配层级
/// 1. 精确: 表头 == 字段名
/// 2. 归一化: 双方去除 '_'/'-'/空白并小写后相等
/// 3. 子串: 表头包含字段(去下划线),或字段包含表头(归一化)
/// 4. 首字母缩写: 字段按下划线取首字母 == 归一化表头（如 date_of_birth ↔ dob）
///
/// # 说明
/// - 无匹配的字段不产出映射,此阶段不报错(提交前由必填映射门禁拦截)
pub fn auto_map(headers: &[String], config: &ImportConfiguration) -> Vec<ColumnMapping> {
    let mut mappings = Vec::new();
    let mut claimed: HashSet<&str> = HashSet::new();

    for field in config.all_fields() {
        let Some(header) = find_match(headers, &claimed, field) else {
            continue;
        };

        claimed.insert(header);
        mappings.push(ColumnMapping {
            source_column: header.to_string(),
            target_field: field.clone(),
            required: config.is_required(field),
            validate: config.validator(field),
            transform: config.transformer(field),
        });
    }

    mappings
}

/// 为单个字段寻找未被认领的表头,按层级顺序返回首个命中
fn find_match<'a>(
    headers: &'a [String],
    claimed: &HashSet<&str>,
    field: &str,
) -> Option<&'a str> {
    let unclaimed = |h: &&String| !claimed.contains(h.as_str());

    // 第 1 层: 精确匹配
    if let Some(h) = headers.iter().filter(unclaimed).find(|h| h.as_str() == field) {
        return Some(h);
    }

    // 第 2 层: 归一化匹配
    let field_stripped = strip_separators(field);
    if let Some(h) = headers
        .iter()
        .filter(unclaimed)
        .find(|h| strip_separators(h) == field_stripped)
    {
        return Some(h);
    }

    // 第 3 层: 子串匹配(双向;剥离后为空的表头不参与匹配)
    let field_no_underscore = field.to_lowercase().replace('_', "");
    if let Some(h) = headers.iter().filter(unclaimed).find(|h| {
        let header_stripped = strip_separators(h);
        !header_stripped.is_empty()
            && (h.to_lowercase().contains(&field_no_underscore)
                || field.to_lowercase().contains(&header_stripped))
    }) {
        return Some(h);
    }

    // 第 4 层: 首字母缩写匹配(仅多词字段,如 date_of_birth → dob)
    if let Some(initials) = field_initials(field) {
        if let Some(h) = headers
            .iter()
            .filter(unclaimed)
            .find(|h| strip_separators(h) == initials)
        {
            return Some(h);
        }
    }

    None
}

/// 去除 '_'/'-'/空白并小写
fn strip_separators(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// 多词字段的首字母缩写（单词字段返回 None,避免单字母误认领）
fn field_initials(field: &str) -> Option<String> {
    let parts: Vec<&str> = field.split('_').filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return None;
    }
    Some(
        parts
            .iter()
            .filter_map(|p| p.chars().next())
            .collect::<String>()
            .to_lowercase(),
    )
}
