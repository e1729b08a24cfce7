// ==========================================
// 学前托育运营系统 - 行校验器
// ==========================================
// 职责: 必填/字段规则/查重/自定义校验,产出行列级条目
// 红线: 只校验已映射字段;重复记录永远是警告,不阻断提交
// ==========================================

use crate::domain::dataset::{ColumnMapping, DuplicateInfo, ExistingRecord, ValidationError, ValidationWarning};
use crate::domain::types::{Severity, WarningKind};
use crate::importer::importer_trait::CustomValidator;
use std::collections::HashMap;

// ==========================================
// ValidationOutcome - 单次校验产出
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub duplicates: Vec<DuplicateInfo>,
}

impl ValidationOutcome {
    fn append(&mut self, mut other: ValidationOutcome) {
        self.errors.append(&mut other.errors);
        self.warnings.append(&mut other.warnings);
        self.duplicates.append(&mut other.duplicates);
    }
}

// ==========================================
// RowValidator
// ==========================================
// 生命周期: 借用会话状态按需构建,本身无状态
pub struct RowValidator<'a> {
    mappings: &'a [ColumnMapping],
    duplicate_check_fields: &'a [String],
    existing_records: &'a [ExistingRecord],
    custom: Option<&'a dyn CustomValidator>,
}

impl<'a> RowValidator<'a> {
    pub fn new(
        mappings: &'a [ColumnMapping],
        duplicate_check_fields: &'a [String],
        existing_records: &'a [ExistingRecord],
        custom: Option<&'a dyn CustomValidator>,
    ) -> Self {
        Self {
            mappings,
            duplicate_check_fields,
            existing_records,
            custom,
        }
    }

    /// 全量校验（解析完成或映射变更后）
    pub fn validate_all(&self, rows: &[HashMap<String, String>]) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();
        for (index, row) in rows.iter().enumerate() {
            outcome.append(self.validate_row(row, index));
        }
        outcome
    }

    /// 校验单行（index 为 0 起始下标,产出条目行号为 index+1）
    ///
    /// # 校验顺序
    /// 1. 必填映射字段为空 → error "<字段> is required"
    /// 2. 非空单元格未通过字段校验器 → error "Invalid <字段>"
    /// 3. 组合键全部命中已有记录(忽略大小写) → duplicate 警告,不阻断
    /// 4. 自定义校验输出原样并入
    pub fn validate_row(&self, row: &HashMap<String, String>, index: usize) -> ValidationOutcome {
        let row_number = index + 1;
        let mut outcome = ValidationOutcome::default();

        for mapping in self.mappings {
            let cell = row
                .get(&mapping.source_column)
                .map(|v| v.trim())
                .unwrap_or("");

            if mapping.required && cell.is_empty() {
                outcome.errors.push(ValidationError {
                    row: row_number,
                    column: mapping.target_field.clone(),
                    message: format!("{} is required", humanize(&mapping.target_field)),
                    severity: Severity::Error,
                    value: None,
                });
            }

            if let Some(validator) = &mapping.validate {
                if !cell.is_empty() && !validator.is_valid(cell) {
                    outcome.errors.push(ValidationError {
                        row: row_number,
                        column: mapping.target_field.clone(),
                        message: format!("Invalid {}", humanize(&mapping.target_field)),
                        severity: Severity::Error,
                        value: Some(cell.to_string()),
                    });
                }
            }
        }

        if let Some((matched, key)) = self.find_duplicate(row) {
            outcome.warnings.push(ValidationWarning {
                row: row_number,
                message: "Possible duplicate record".to_string(),
                kind: WarningKind::Duplicate,
            });
            outcome.duplicates.push(DuplicateInfo {
                row: row_number,
                match_field: key,
                existing_id: matched.id.clone(),
            });
        }

        if let Some(custom) = self.custom {
            outcome.errors.extend(custom.validate(row, index));
        }

        outcome
    }

    /// 查重: 组合键每个字段都与某条已有记录一致(忽略大小写)才算命中
    fn find_duplicate(&self, row: &HashMap<String, String>) -> Option<(&ExistingRecord, String)> {
        if self.duplicate_check_fields.is_empty() {
            return None;
        }

        let matched = self.existing_records.iter().find(|existing| {
            self.duplicate_check_fields.iter().all(|field| {
                let row_value = self.resolve_cell(row, field);
                let existing_value = existing.fields.get(field).map(String::as_str).unwrap_or("");
                row_value.trim().eq_ignore_ascii_case(existing_value.trim())
            })
        })?;

        Some((matched, self.duplicate_check_fields.join("+")))
    }

    /// 按目标字段取原始单元格: 已映射走映射源列,未映射回退原始键
    fn resolve_cell<'r>(&self, row: &'r HashMap<String, String>, field: &str) -> &'r str {
        let source = self
            .mappings
            .iter()
            .find(|m| m.target_field == field)
            .map(|m| m.source_column.as_str())
            .unwrap_or(field);
        row.get(source).map(String::as_str).unwrap_or("")
    }
}

/// 字段名转用户可读形式: first_name → "first name"
fn humanize(field: &str) -> String {
    field.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldValidator;
    use std::sync::Arc;

    struct NeverValid;
    impl FieldValidator for NeverValid {
        fn is_valid(&self, _value: &str) -> bool {
            false
        }
    }

    fn mapping(source: &str, target: &str, required: bool) -> ColumnMapping {
        ColumnMapping {
            source_column: source.to_string(),
            target_field: target.to_string(),
            required,
            validate: None,
            transform: None,
        }
    }

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_required_field_empty_is_error() {
        let mappings = vec![mapping("first_name", "first_name", true)];
        let validator = RowValidator::new(&mappings, &[], &[], None);

        let outcome = validator.validate_row(&row(&[("first_name", "   ")]), 0);

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 1);
        assert_eq!(outcome.errors[0].column, "first_name");
        assert_eq!(outcome.errors[0].message, "first name is required");
        assert_eq!(outcome.errors[0].severity, Severity::Error);
    }

    #[test]
    fn test_field_validator_skipped_when_empty() {
        let mut m = mapping("dob", "date_of_birth", false);
        m.validate = Some(Arc::new(NeverValid));
        let mappings = vec![m];
        let validator = RowValidator::new(&mappings, &[], &[], None);

        // 空值不触发字段校验器
        let outcome = validator.validate_row(&row(&[("dob", "")]), 0);
        assert!(outcome.errors.is_empty());

        let outcome = validator.validate_row(&row(&[("dob", "xxx")]), 0);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].message, "Invalid date of birth");
        assert_eq!(outcome.errors[0].value.as_deref(), Some("xxx"));
    }

    #[test]
    fn test_duplicate_requires_all_key_fields() {
        let mappings = vec![
            mapping("first_name", "first_name", true),
            mapping("last_name", "last_name", true),
        ];
        let dup_fields = vec!["first_name".to_string(), "last_name".to_string()];
        let existing = vec![ExistingRecord::new("stu-1")
            .with_field("first_name", "John")
            .with_field("last_name", "Doe")];
        let validator = RowValidator::new(&mappings, &dup_fields, &existing, None);

        // 大小写不敏感,全键命中
        let outcome = validator.validate_row(&row(&[("first_name", "JOHN"), ("last_name", "doe")]), 2);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::Duplicate);
        assert_eq!(outcome.duplicates[0].row, 3);
        assert_eq!(outcome.duplicates[0].existing_id, "stu-1");
        assert_eq!(outcome.duplicates[0].match_field, "first_name+last_name");
        // 查重不产生 error
        assert!(outcome.errors.is_empty());

        // 仅部分命中: 不算重复
        let outcome = validator.validate_row(&row(&[("first_name", "John"), ("last_name", "Smith")]), 0);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_resolves_through_mapping() {
        // 源列名与目标字段不同,查重必须经映射取值
        let mappings = vec![mapping("fname", "first_name", true)];
        let dup_fields = vec!["first_name".to_string()];
        let existing = vec![ExistingRecord::new("stu-2").with_field("first_name", "Amy")];
        let validator = RowValidator::new(&mappings, &dup_fields, &existing, None);

        let outcome = validator.validate_row(&row(&[("fname", "Amy")]), 0);
        assert_eq!(outcome.duplicates.len(), 1);
    }

    #[test]
    fn test_custom_validator_appended_as_is() {
        struct NotesLimit;
        impl CustomValidator for NotesLimit {
            fn validate(
                &self,
                row: &HashMap<String, String>,
                index: usize,
            ) -> Vec<ValidationError> {
                let too_long = row.get("notes").map(|v| v.len() > 5).unwrap_or(false);
                if too_long {
                    vec![ValidationError {
                        row: index + 1,
                        column: "notes".to_string(),
                        message: "notes too long".to_string(),
                        severity: Severity::Warning,
                        value: None,
                    }]
                } else {
                    vec![]
                }
            }
        }

        let mappings = vec![];
        let validator = RowValidator::new(&mappings, &[], &[], Some(&NotesLimit));
        let outcome = validator.validate_row(&row(&[("notes", "too long note")]), 4);

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 5);
        assert_eq!(outcome.errors[0].severity, Severity::Warning);
    }

    #[test]
    fn test_validate_all_accumulates_rows() {
        let mappings = vec![mapping("name", "name", true)];
        let validator = RowValidator::new(&mappings, &[], &[], None);

        let rows = vec![row(&[("name", "Amy")]), row(&[("name", "")])];
        let outcome = validator.validate_all(&rows);

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 2);
    }
}
