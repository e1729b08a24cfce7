// ==========================================
// 学前托育运营系统 - 导入配置
// ==========================================
// 职责: 定义单个实体类型的导入配置(字段/校验/转换/查重键/样例)
// 红线: 配置不可变,每个导入会话加载一次,引擎只读
// ==========================================

use crate::domain::types::EntityKind;
use crate::importer::error::ImportError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ==========================================
// FieldValidator Trait
// ==========================================
// 用途: 单字段校验能力接口,按字段名由 Schema Registry 返回
// 实现者: schema::rules 下的具名规则
pub trait FieldValidator: Send + Sync {
    /// 校验单个原始单元格值（调用方保证非空才调用）
    fn is_valid(&self, value: &str) -> bool;
}

// ==========================================
// FieldTransformer Trait
// ==========================================
// 用途: 提交前将原始字符串转换为类型化值
// 红线: 纯函数,失败时原样透传,不得 panic
pub trait FieldTransformer: Send + Sync {
    fn transform(&self, value: &str) -> Value;
}

// ==========================================
// ImportConfiguration - 实体导入配置
// ==========================================
// 生命周期: 构建后不可变,通过 Arc 在会话间共享
pub struct ImportConfiguration {
    pub entity: EntityKind,
    pub title: String,       // 展示名（应用层使用）
    pub description: String, // 展示说明（应用层使用）
    required_fields: Vec<String>,
    optional_fields: Vec<String>,
    duplicate_check_fields: Vec<String>,
    validators: HashMap<String, Arc<dyn FieldValidator>>,
    transformers: HashMap<String, Arc<dyn FieldTransformer>>,
    sample_rows: Vec<HashMap<String, String>>,
}

impl fmt::Debug for ImportConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportConfiguration")
            .field("entity", &self.entity)
            .field("required_fields", &self.required_fields)
            .field("optional_fields", &self.optional_fields)
            .field("duplicate_check_fields", &self.duplicate_check_fields)
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .field("transformers", &self.transformers.keys().collect::<Vec<_>>())
            .field("sample_rows", &self.sample_rows.len())
            .finish()
    }
}

impl ImportConfiguration {
    /// 创建导入配置
    ///
    /// # 不变量
    /// - required_fields ∩ optional_fields = ∅,违反时返回 InvalidConfiguration
    pub fn new(
        entity: EntityKind,
        title: impl Into<String>,
        description: impl Into<String>,
        required_fields: Vec<&str>,
        optional_fields: Vec<&str>,
        duplicate_check_fields: Vec<&str>,
    ) -> Result<Self, ImportError> {
        let required: Vec<String> = required_fields.iter().map(|s| s.to_string()).collect();
        let optional: Vec<String> = optional_fields.iter().map(|s| s.to_string()).collect();

        if let Some(overlap) = required.iter().find(|f| optional.contains(f)) {
            return Err(ImportError::InvalidConfiguration {
                entity: entity.to_string(),
                message: format!("字段同时声明为必填与可选: {}", overlap),
            });
        }

        Ok(Self {
            entity,
            title: title.into(),
            description: description.into(),
            required_fields: required,
            optional_fields: optional,
            duplicate_check_fields: duplicate_check_fields
                .iter()
                .map(|s| s.to_string())
                .collect(),
            validators: HashMap::new(),
            transformers: HashMap::new(),
            sample_rows: Vec::new(),
        })
    }

    pub fn with_validator(
        mut self,
        field: impl Into<String>,
        validator: Arc<dyn FieldValidator>,
    ) -> Self {
        self.validators.insert(field.into(), validator);
        self
    }

    pub fn with_transformer(
        mut self,
        field: impl Into<String>,
        transformer: Arc<dyn FieldTransformer>,
    ) -> Self {
        self.transformers.insert(field.into(), transformer);
        self
    }

    pub fn with_sample_row(mut self, row: Vec<(&str, &str)>) -> Self {
        self.sample_rows.push(
            row.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    // ===== 只读访问 =====

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn optional_fields(&self) -> &[String] {
        &self.optional_fields
    }

    pub fn duplicate_check_fields(&self) -> &[String] {
        &self.duplicate_check_fields
    }

    pub fn sample_rows(&self) -> &[HashMap<String, String>] {
        &self.sample_rows
    }

    /// 全部字段,必填在前(声明顺序),可选在后(声明顺序)
    pub fn all_fields(&self) -> impl Iterator<Item = &String> {
        self.required_fields.iter().chain(self.optional_fields.iter())
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required_fields.iter().any(|f| f == field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.all_fields().any(|f| f == field)
    }

    pub fn validator(&self, field: &str) -> Option<Arc<dyn FieldValidator>> {
        self.validators.get(field).cloned()
    }

    pub fn transformer(&self, field: &str) -> Option<Arc<dyn FieldTransformer>> {
        self.transformers.get(field).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_optional_overlap_rejected() {
        let result = ImportConfiguration::new(
            EntityKind::Students,
            "学生档案",
            "测试",
            vec!["first_name", "class_id"],
            vec!["class_id"],
            vec![],
        );
        assert!(matches!(
            result,
            Err(ImportError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_all_fields_order_required_first() {
        let config = ImportConfiguration::new(
            EntityKind::Students,
            "学生档案",
            "测试",
            vec!["first_name", "last_name"],
            vec!["parent_email"],
            vec![],
        )
        .unwrap();

        let fields: Vec<&str> = config.all_fields().map(|s| s.as_str()).collect();
        assert_eq!(fields, vec!["first_name", "last_name", "parent_email"]);
        assert!(config.is_required("first_name"));
        assert!(!config.is_required("parent_email"));
    }
}
