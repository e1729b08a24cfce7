// ==========================================
// 学前托育运营系统 - Schema Registry
// ==========================================
// 职责: 按实体类型提供导入配置(内置三种实体,支持注册自定义配置)
// 红线: 配置通过数据驱动的规则对象扩展,不使用 switch 分支
// ==========================================

use crate::domain::types::EntityKind;
use crate::importer::error::ImportError;
use crate::schema::import_config::ImportConfiguration;
use crate::schema::rules::{
    AgeRangeValidator, DigitsOnlyTransformer, EmailValidator, FloatOrZeroTransformer,
    IntRangeValidator, IntTransformer, IsoDateTransformer, NumberRangeValidator, OneOfValidator,
    PhoneValidator,
};
use chrono::{Local, Months, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;

// ==========================================
// SchemaRegistry
// ==========================================
// 生命周期: 进程内构建一次,按会话只读共享
pub struct SchemaRegistry {
    configs: HashMap<EntityKind, Arc<ImportConfiguration>>,
}

impl SchemaRegistry {
    /// 空注册表（仅自定义配置场景）
    pub fn new() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// 内置配置注册表,年龄等相对日期规则以当日为基准
    pub fn builtin() -> Result<Self, ImportError> {
        Self::builtin_with_reference_date(Local::now().date_naive())
    }

    /// 内置配置注册表,显式注入基准日期（测试与回放场景）
    pub fn builtin_with_reference_date(reference_date: NaiveDate) -> Result<Self, ImportError> {
        let mut registry = Self::new();
        registry.register(students_config(reference_date)?);
        registry.register(activities_config()?);
        registry.register(progress_config()?);
        Ok(registry)
    }

    /// 注册配置（同实体类型覆盖旧配置）
    pub fn register(&mut self, config: ImportConfiguration) {
        self.configs.insert(config.entity, Arc::new(config));
    }

    pub fn get(&self, entity: EntityKind) -> Option<Arc<ImportConfiguration>> {
        self.configs.get(&entity).cloned()
    }

    /// 按外部实体键查找（调用方传入字符串键的入口）
    pub fn get_by_key(&self, key: &str) -> Option<Arc<ImportConfiguration>> {
        EntityKind::from_key(key).and_then(|kind| self.get(kind))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 内置配置: 学生档案
// ==========================================
fn students_config(reference_date: NaiveDate) -> Result<ImportConfiguration, ImportError> {
    // 样例出生日期按基准日期倒推 3 岁,保证模板样例恒通过年龄校验
    let sample_dob = reference_date
        .checked_sub_months(Months::new(36))
        .unwrap_or(reference_date)
        .format("%Y-%m-%d")
        .to_string();

    Ok(ImportConfiguration::new(
        EntityKind::Students,
        "Student Enrollment",
        "批量录入学生档案",
        vec!["first_name", "last_name", "date_of_birth", "class_id"],
        vec![
            "parent_email",
            "parent_phone",
            "medical_notes",
            "allergies",
            "emergency_contact",
        ],
        vec!["first_name", "last_name", "date_of_birth"],
    )?
    .with_validator(
        "date_of_birth",
        Arc::new(AgeRangeValidator::new(2.0, 6.0, reference_date)),
    )
    .with_validator("parent_email", Arc::new(EmailValidator))
    .with_validator("parent_phone", Arc::new(PhoneValidator::new(10)))
    .with_transformer("date_of_birth", Arc::new(IsoDateTransformer))
    .with_transformer("parent_phone", Arc::new(DigitsOnlyTransformer))
    .with_sample_row(vec![
        ("first_name", "John"),
        ("last_name", "Doe"),
        ("date_of_birth", sample_dob.as_str()),
        ("class_id", "class-1"),
        ("parent_email", "john.parent@email.com"),
        ("parent_phone", "+1234567890"),
    ]))
}

// ==========================================
// 内置配置: 课程活动
// ==========================================
fn activities_config() -> Result<ImportConfiguration, ImportError> {
    Ok(ImportConfiguration::new(
        EntityKind::Activities,
        "Curriculum Activities",
        "导入课程活动与排期",
        vec![
            "title",
            "activity_type",
            "duration_minutes",
            "week_number",
            "day_number",
        ],
        vec![
            "description",
            "materials",
            "objectives",
            "kmap_move",
            "kmap_think",
            "kmap_endure",
        ],
        vec!["title", "week_number", "day_number"],
    )?
    .with_validator("duration_minutes", Arc::new(IntRangeValidator::new(1, 180)))
    .with_validator("week_number", Arc::new(IntRangeValidator::new(1, 52)))
    .with_validator("day_number", Arc::new(IntRangeValidator::new(1, 7)))
    .with_validator(
        "activity_type",
        Arc::new(OneOfValidator::new(vec![
            "circle_time",
            "outdoor_play",
            "story_time",
            "art_craft",
            "music_movement",
        ])),
    )
    .with_transformer("duration_minutes", Arc::new(IntTransformer))
    .with_transformer("week_number", Arc::new(IntTransformer))
    .with_transformer("day_number", Arc::new(IntTransformer))
    .with_transformer("kmap_move", Arc::new(FloatOrZeroTransformer))
    .with_transformer("kmap_think", Arc::new(FloatOrZeroTransformer))
    .with_transformer("kmap_endure", Arc::new(FloatOrZeroTransformer))
    .with_sample_row(vec![
        ("title", "Color Sorting"),
        ("activity_type", "circle_time"),
        ("duration_minutes", "30"),
        ("week_number", "1"),
        ("day_number", "1"),
        ("description", "分组颜色认知游戏"),
        ("kmap_move", "0.5"),
        ("kmap_think", "2.0"),
        ("kmap_endure", "1.0"),
    ]))
}

// ==========================================
// 内置配置: 成长进度
// ==========================================
fn progress_config() -> Result<ImportConfiguration, ImportError> {
    Ok(ImportConfiguration::new(
        EntityKind::Progress,
        "Progress Updates",
        "批量更新学生成长进度",
        vec!["child_id", "activity_id", "date", "status"],
        vec![
            "quality_score",
            "engagement_level",
            "teacher_notes",
            "kmap_move",
            "kmap_think",
            "kmap_endure",
        ],
        vec!["child_id", "activity_id", "date"],
    )?
    .with_validator(
        "status",
        Arc::new(OneOfValidator::new(vec![
            "completed",
            "partial",
            "skipped",
            "absent",
        ])),
    )
    .with_validator("quality_score", Arc::new(NumberRangeValidator::new(1.0, 5.0)))
    .with_validator(
        "engagement_level",
        Arc::new(OneOfValidator::new(vec!["low", "medium", "high"])),
    )
    .with_transformer("quality_score", Arc::new(IntTransformer))
    .with_transformer("kmap_move", Arc::new(FloatOrZeroTransformer))
    .with_transformer("kmap_think", Arc::new(FloatOrZeroTransformer))
    .with_transformer("kmap_endure", Arc::new(FloatOrZeroTransformer))
    .with_sample_row(vec![
        ("child_id", "child-1"),
        ("activity_id", "act-1"),
        ("date", "2024-03-01"),
        ("status", "completed"),
        ("quality_score", "4"),
        ("engagement_level", "high"),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    #[test]
    fn test_builtin_contains_three_entities() {
        let registry = SchemaRegistry::builtin_with_reference_date(reference_date()).unwrap();
        assert!(registry.get(EntityKind::Students).is_some());
        assert!(registry.get(EntityKind::Activities).is_some());
        assert!(registry.get(EntityKind::Progress).is_some());
    }

    #[test]
    fn test_get_by_key() {
        let registry = SchemaRegistry::builtin_with_reference_date(reference_date()).unwrap();
        assert!(registry.get_by_key("students").is_some());
        assert!(registry.get_by_key("photos").is_none());
    }

    #[test]
    fn test_students_sample_passes_own_validators() {
        let registry = SchemaRegistry::builtin_with_reference_date(reference_date()).unwrap();
        let config = registry.get(EntityKind::Students).unwrap();

        let sample = &config.sample_rows()[0];
        for (field, value) in sample {
            if let Some(validator) = config.validator(field) {
                assert!(validator.is_valid(value), "样例字段 {} 未通过校验", field);
            }
        }
    }

    #[test]
    fn test_register_custom_overrides() {
        let mut registry = SchemaRegistry::builtin_with_reference_date(reference_date()).unwrap();
        let custom = ImportConfiguration::new(
            EntityKind::Students,
            "Custom",
            "自定义",
            vec!["first_name"],
            vec![],
            vec![],
        )
        .unwrap();
        registry.register(custom);

        let config = registry.get(EntityKind::Students).unwrap();
        assert_eq!(config.required_fields(), &["first_name".to_string()]);
    }
}
