// ==========================================
// 学前托育运营系统 - 领域类型定义
// ==========================================
// 职责: 导入引擎共享的枚举类型
// 红线: 不包含业务逻辑,只定义类型与序列化口径
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 实体类型 (Entity Kind)
// ==========================================
// 用途: Schema Registry 的键,每种实体对应一套导入配置
// 序列化格式: snake_case (与前端上传类型一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Students,   // 学生档案
    Activities, // 课程活动
    Progress,   // 成长进度
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Students => "students",
            EntityKind::Activities => "activities",
            EntityKind::Progress => "progress",
        }
    }

    /// 从外部键解析实体类型（调用方按实体键选择配置）
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "students" => Some(EntityKind::Students),
            "activities" => Some(EntityKind::Activities),
            "progress" => Some(EntityKind::Progress),
            _ => None,
        }
    }
}

// ==========================================
// 校验严重级别 (Severity)
// ==========================================
// 红线: Error 阻断该行提交,Warning 不阻断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,   // 阻断该行
    Warning, // 仅提示
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

// ==========================================
// 警告类别 (Warning Kind)
// ==========================================
// 用途: 行级警告的分类标签,重复记录永远是 Warning 而非 Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Duplicate, // 疑似重复记录
    Format,    // 格式问题
    Optional,  // 可选字段缺失
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::Duplicate => write!(f, "duplicate"),
            WarningKind::Format => write!(f, "format"),
            WarningKind::Optional => write!(f, "optional"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_from_key() {
        assert_eq!(EntityKind::from_key("students"), Some(EntityKind::Students));
        assert_eq!(EntityKind::from_key(" Progress "), Some(EntityKind::Progress));
        assert_eq!(EntityKind::from_key("photos"), None);
    }

    #[test]
    fn test_severity_serde_lowercase() {
        let json = serde_json::to_string(&Severity::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }
}
