// ==========================================
// 学前托育运营系统 - 内置校验与转换规则
// ==========================================
// 职责: 字段级校验器/转换器的具名实现
// 红线: 全部为纯函数,转换失败时原样透传,不得 panic
// ==========================================

use crate::schema::import_config::{FieldTransformer, FieldValidator};
use chrono::NaiveDate;
use serde_json::Value;

/// 宽松日期解析: 依次尝试常见书写格式
///
/// # 支持格式
/// - 2020-01-15 (ISO)
/// - 2020/01/15
/// - 01/15/2020 (月/日/年)
pub(crate) fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    NaiveDate::parse_from_str(v, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(v, "%Y/%m/%d"))
        .or_else(|_| NaiveDate::parse_from_str(v, "%m/%d/%Y"))
        .ok()
}

// ==========================================
// AgeRangeValidator - 出生日期年龄范围
// ==========================================
// 用途: students.date_of_birth,入托年龄必须在 [min, max] 岁之间
// 说明: 基准日期注入以保证可测试性,生产构建时取当日
pub struct AgeRangeValidator {
    min_years: f64,
    max_years: f64,
    reference_date: NaiveDate,
}

impl AgeRangeValidator {
    pub fn new(min_years: f64, max_years: f64, reference_date: NaiveDate) -> Self {
        Self {
            min_years,
            max_years,
            reference_date,
        }
    }
}

impl FieldValidator for AgeRangeValidator {
    fn is_valid(&self, value: &str) -> bool {
        let Some(birth_date) = parse_flexible_date(value) else {
            return false;
        };
        let age_years = (self.reference_date - birth_date).num_days() as f64 / 365.25;
        age_years >= self.min_years && age_years <= self.max_years
    }
}

// ==========================================
// EmailValidator - 邮箱格式
// ==========================================
// 口径: local@domain,两侧非空,域名含 '.',整体无空白
pub struct EmailValidator;

impl FieldValidator for EmailValidator {
    fn is_valid(&self, value: &str) -> bool {
        let v = value.trim();
        if v.chars().any(char::is_whitespace) {
            return false;
        }
        let mut parts = v.splitn(2, '@');
        let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
            return false;
        };
        !local.is_empty()
            && !domain.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    }
}

// ==========================================
// PhoneValidator - 电话号码
// ==========================================
// 口径: 去除非数字字符后至少 min_digits 位
pub struct PhoneValidator {
    min_digits: usize,
}

impl PhoneValidator {
    pub fn new(min_digits: usize) -> Self {
        Self { min_digits }
    }
}

impl FieldValidator for PhoneValidator {
    fn is_valid(&self, value: &str) -> bool {
        value.chars().filter(|c| c.is_ascii_digit()).count() >= self.min_digits
    }
}

// ==========================================
// IntRangeValidator - 整数范围
// ==========================================
pub struct IntRangeValidator {
    min: i64,
    max: i64,
}

impl IntRangeValidator {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl FieldValidator for IntRangeValidator {
    fn is_valid(&self, value: &str) -> bool {
        match value.trim().parse::<i64>() {
            Ok(n) => n >= self.min && n <= self.max,
            Err(_) => false,
        }
    }
}

// ==========================================
// NumberRangeValidator - 数值范围（允许小数）
// ==========================================
pub struct NumberRangeValidator {
    min: f64,
    max: f64,
}

impl NumberRangeValidator {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl FieldValidator for NumberRangeValidator {
    fn is_valid(&self, value: &str) -> bool {
        match value.trim().parse::<f64>() {
            Ok(n) => n >= self.min && n <= self.max,
            Err(_) => false,
        }
    }
}

// ==========================================
// OneOfValidator - 枚举取值
// ==========================================
// 用途: activity_type / status / engagement_level 等固定取值字段
pub struct OneOfValidator {
    allowed: Vec<&'static str>,
}

impl OneOfValidator {
    pub fn new(allowed: Vec<&'static str>) -> Self {
        Self { allowed }
    }
}

impl FieldValidator for OneOfValidator {
    fn is_valid(&self, value: &str) -> bool {
        self.allowed.contains(&value.trim())
    }
}

// ==========================================
// IsoDateTransformer - 日期归一化
// ==========================================
// 输出: ISO 格式字符串 YYYY-MM-DD,解析失败时原样透传
pub struct IsoDateTransformer;

impl FieldTransformer for IsoDateTransformer {
    fn transform(&self, value: &str) -> Value {
        match parse_flexible_date(value) {
            Some(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            None => Value::String(value.to_string()),
        }
    }
}

// ==========================================
// DigitsOnlyTransformer - 仅保留数字
// ==========================================
// 用途: parent_phone 归一化（"+1 (234) 567-890" → "1234567890"）
pub struct DigitsOnlyTransformer;

impl FieldTransformer for DigitsOnlyTransformer {
    fn transform(&self, value: &str) -> Value {
        Value::String(value.chars().filter(|c| c.is_ascii_digit()).collect())
    }
}

// ==========================================
// IntTransformer - 整数化
// ==========================================
// 解析失败时原样透传（由校验器负责拦截非法值）
pub struct IntTransformer;

impl FieldTransformer for IntTransformer {
    fn transform(&self, value: &str) -> Value {
        match value.trim().parse::<i64>() {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(value.to_string()),
        }
    }
}

// ==========================================
// FloatOrZeroTransformer - 浮点化,缺省为 0
// ==========================================
// 用途: kmap_move/kmap_think/kmap_endure 维度分值
pub struct FloatOrZeroTransformer;

impl FieldTransformer for FloatOrZeroTransformer {
    fn transform(&self, value: &str) -> Value {
        let parsed = value.trim().parse::<f64>().unwrap_or(0.0);
        serde_json::Number::from_f64(parsed)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_range_validator() {
        let reference = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let validator = AgeRangeValidator::new(2.0, 6.0, reference);

        assert!(validator.is_valid("2020-01-15")); // 约 3.4 岁
        assert!(!validator.is_valid("2022-12-01")); // 不足 2 岁
        assert!(!validator.is_valid("2015-01-01")); // 超过 6 岁
        assert!(!validator.is_valid("not-a-date"));
    }

    #[test]
    fn test_email_validator() {
        let validator = EmailValidator;
        assert!(validator.is_valid("john.parent@email.com"));
        assert!(!validator.is_valid("john.parent"));
        assert!(!validator.is_valid("john @email.com"));
        assert!(!validator.is_valid("john@email"));
        assert!(!validator.is_valid("@email.com"));
    }

    #[test]
    fn test_phone_validator_strips_formatting() {
        let validator = PhoneValidator::new(10);
        assert!(validator.is_valid("+1 (234) 567-8901"));
        assert!(!validator.is_valid("123-456"));
    }

    #[test]
    fn test_int_range_validator() {
        let validator = IntRangeValidator::new(1, 180);
        assert!(validator.is_valid("30"));
        assert!(validator.is_valid(" 180 "));
        assert!(!validator.is_valid("0"));
        assert!(!validator.is_valid("181"));
        assert!(!validator.is_valid("abc"));
    }

    #[test]
    fn test_one_of_validator() {
        let validator = OneOfValidator::new(vec!["completed", "partial", "skipped", "absent"]);
        assert!(validator.is_valid("completed"));
        assert!(!validator.is_valid("done"));
    }

    #[test]
    fn test_iso_date_transformer_normalizes() {
        let t = IsoDateTransformer;
        assert_eq!(t.transform("01/15/2020"), Value::String("2020-01-15".into()));
        assert_eq!(t.transform("2020-01-15"), Value::String("2020-01-15".into()));
        // 解析失败: 原样透传
        assert_eq!(t.transform("n/a"), Value::String("n/a".into()));
    }

    #[test]
    fn test_digits_only_transformer() {
        let t = DigitsOnlyTransformer;
        assert_eq!(
            t.transform("+1 (234) 567-8901"),
            Value::String("12345678901".into())
        );
    }

    #[test]
    fn test_float_or_zero_transformer() {
        let t = FloatOrZeroTransformer;
        assert_eq!(t.transform("0.5"), serde_json::json!(0.5));
        assert_eq!(t.transform("garbage"), serde_json::json!(0.0));
    }
}
