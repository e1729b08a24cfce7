// ==========================================
// 学前托育运营系统 - 导入会话
// ==========================================
// 职责: 持有单次导入的可编辑状态(数据集/映射/校验条目)并维护一致性
// 口径: 单元格编辑只重校验该行,映射变更与加载全量重校验;
//       行号(1 起始)与条目行号任何时刻保持对齐
// 红线: 数据集替换是原子的,加载失败不得破坏既有会话状态
// ==========================================

use crate::domain::dataset::{ColumnMapping, ExistingRecord, ParsedDataset};
use crate::importer::auto_mapper::auto_map;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::CustomValidator;
use crate::importer::row_validator::RowValidator;
use crate::importer::tokenizer::tokenize;
use crate::schema::ImportConfiguration;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

// ==========================================
// ImportSession
// ==========================================
// 生命周期: 选定实体类型时创建,提交成功或重置后数据集清空,可复用
pub struct ImportSession {
    config: Arc<ImportConfiguration>,
    dataset: Option<ParsedDataset>,
    mappings: Vec<ColumnMapping>,
    existing_records: Vec<ExistingRecord>,
    custom_validator: Option<Box<dyn CustomValidator>>,
}

impl ImportSession {
    pub fn new(config: Arc<ImportConfiguration>) -> Self {
        Self {
            config,
            dataset: None,
            mappings: Vec::new(),
            existing_records: Vec::new(),
            custom_validator: None,
        }
    }

    /// 注入查重比对用的已有记录（通常在 load 前由调用方预取）
    pub fn with_existing_records(mut self, records: Vec<ExistingRecord>) -> Self {
        self.existing_records = records;
        self
    }

    /// 注入行级附加校验
    pub fn with_custom_validator(mut self, validator: Box<dyn CustomValidator>) -> Self {
        self.custom_validator = Some(validator);
        self
    }

    // ===== 加载 =====

    /// 解析文本并建立工作数据集: 切分 → 自动映射 → 全量校验
    ///
    /// # 口径
    /// - 新数据集完整构建后才替换旧数据集,解析失败保留原状态
    /// - 每次加载重新自动映射,丢弃此前的手动映射调整
    pub fn load(&mut self, content: &str) -> ImportResult<&ParsedDataset> {
        let tokenized = tokenize(content)?;
        let mappings = auto_map(&tokenized.headers, &self.config);

        let mut dataset = ParsedDataset {
            total_rows: tokenized.rows.len(),
            headers: tokenized.headers,
            rows: tokenized.rows,
            ..Default::default()
        };
        self.run_full_validation(&mut dataset, &mappings);

        info!(
            entity = %self.config.entity,
            total_rows = dataset.total_rows,
            valid_rows = dataset.valid_rows,
            mapped_columns = mappings.len(),
            "导入数据集解析完成"
        );

        self.mappings = mappings;
        Ok(self.dataset.insert(dataset))
    }

    // ===== 修订循环 =====

    /// 编辑单元格并重校验该行,其余行的条目原样保留
    pub fn edit_cell(&mut self, row: usize, source_column: &str, value: &str) -> ImportResult<()> {
        let dataset = self.dataset.as_mut().ok_or(ImportError::NoDataset)?;

        if row == 0 || row > dataset.total_rows {
            return Err(ImportError::RowIndexOutOfRange {
                row,
                total: dataset.total_rows,
            });
        }
        if !dataset.headers.iter().any(|h| h == source_column) {
            return Err(ImportError::UnknownSourceColumn {
                column: source_column.to_string(),
            });
        }

        let index = row - 1;
        dataset.rows[index].insert(source_column.to_string(), value.to_string());

        // 丢弃该行旧条目
        dataset.errors.retain(|e| e.row != row);
        dataset.warnings.retain(|w| w.row != row);
        dataset.duplicates.retain(|d| d.row != row);

        // 仅重校验该行
        let validator = RowValidator::new(
            &self.mappings,
            self.config.duplicate_check_fields(),
            &self.existing_records,
            self.custom_validator.as_deref(),
        );
        let outcome = validator.validate_row(&dataset.rows[index], index);
        dataset.errors.extend(outcome.errors);
        dataset.warnings.extend(outcome.warnings);
        dataset.duplicates.extend(outcome.duplicates);
        dataset.recompute_valid_rows();

        debug!(row, column = source_column, "单元格编辑完成并重校验");
        Ok(())
    }

    /// 追加一条新行,追加后不触发校验(进入下一次编辑或全量校验时再评估)
    ///
    /// # 口径
    /// - 已映射的源列按首条样例行预填,无样例或未映射的列为空串
    pub fn add_row(&mut self) -> ImportResult<usize> {
        let mappings = &self.mappings;
        let sample = self.config.sample_rows().first();
        let dataset = self.dataset.as_mut().ok_or(ImportError::NoDataset)?;

        let row: HashMap<String, String> = dataset
            .headers
            .iter()
            .map(|header| {
                let prefill = mappings
                    .iter()
                    .find(|m| &m.source_column == header)
                    .and_then(|m| sample.and_then(|s| s.get(&m.target_field)))
                    .cloned()
                    .unwrap_or_default();
                (header.clone(), prefill)
            })
            .collect();

        dataset.rows.push(row);
        dataset.total_rows += 1;
        dataset.recompute_valid_rows();
        Ok(dataset.total_rows)
    }

    /// 删除若干行(1 起始行号),幸存行重新连续编号,条目行号同步平移
    pub fn delete_rows(&mut self, rows: &BTreeSet<usize>) -> ImportResult<()> {
        let dataset = self.dataset.as_mut().ok_or(ImportError::NoDataset)?;

        if let Some(&bad) = rows.iter().find(|&&r| r == 0 || r > dataset.total_rows) {
            return Err(ImportError::RowIndexOutOfRange {
                row: bad,
                total: dataset.total_rows,
            });
        }

        // 旧行号 → 新行号(幸存行按原序连续编号)
        let mut renumber: HashMap<usize, usize> = HashMap::new();
        let mut next = 1;
        for old in 1..=dataset.total_rows {
            if !rows.contains(&old) {
                renumber.insert(old, next);
                next += 1;
            }
        }

        let mut index = 0;
        dataset.rows.retain(|_| {
            index += 1;
            !rows.contains(&index)
        });
        dataset.total_rows = dataset.rows.len();

        dataset.errors.retain_mut(|e| match renumber.get(&e.row) {
            Some(&n) => {
                e.row = n;
                true
            }
            None => false,
        });
        dataset.warnings.retain_mut(|w| match renumber.get(&w.row) {
            Some(&n) => {
                w.row = n;
                true
            }
            None => false,
        });
        dataset.duplicates.retain_mut(|d| match renumber.get(&d.row) {
            Some(&n) => {
                d.row = n;
                true
            }
            None => false,
        });
        dataset.recompute_valid_rows();

        debug!(deleted = rows.len(), remaining = dataset.total_rows, "批量删除行");
        Ok(())
    }

    /// 调整列映射并全量重校验
    ///
    /// # 参数
    /// - target: Some(字段) 建立绑定,None 解除该源列的绑定
    ///
    /// # 口径
    /// - 同一源列/同一目标字段至多一条映射,旧绑定被自动解除
    pub fn remap_column(&mut self, source_column: &str, target: Option<&str>) -> ImportResult<()> {
        let dataset = self.dataset.as_ref().ok_or(ImportError::NoDataset)?;
        if !dataset.headers.iter().any(|h| h == source_column) {
            return Err(ImportError::UnknownSourceColumn {
                column: source_column.to_string(),
            });
        }

        if let Some(field) = target {
            if !self.config.has_field(field) {
                return Err(ImportError::UnknownTargetField {
                    field: field.to_string(),
                });
            }
        }

        self.mappings.retain(|m| m.source_column != source_column);

        if let Some(field) = target {
            // 目标字段若已被其他源列认领,解除旧绑定
            self.mappings.retain(|m| m.target_field != field);
            self.mappings.push(ColumnMapping {
                source_column: source_column.to_string(),
                target_field: field.to_string(),
                required: self.config.is_required(field),
                validate: self.config.validator(field),
                transform: self.config.transformer(field),
            });
        }

        self.revalidate();
        info!(
            source_column,
            target = target.unwrap_or("<unmapped>"),
            "列映射已调整"
        );
        Ok(())
    }

    /// 丢弃数据集与映射,回到未加载状态
    pub fn reset(&mut self) {
        self.dataset = None;
        self.mappings.clear();
    }

    /// 全量重校验当前数据集(映射或查重数据变化后)
    pub fn revalidate(&mut self) {
        let Some(mut dataset) = self.dataset.take() else {
            return;
        };
        self.run_full_validation(&mut dataset, &self.mappings);
        self.dataset = Some(dataset);
    }

    fn run_full_validation(&self, dataset: &mut ParsedDataset, mappings: &[ColumnMapping]) {
        let validator = RowValidator::new(
            mappings,
            self.config.duplicate_check_fields(),
            &self.existing_records,
            self.custom_validator.as_deref(),
        );
        let outcome = validator.validate_all(&dataset.rows);
        dataset.errors = outcome.errors;
        dataset.warnings = outcome.warnings;
        dataset.duplicates = outcome.duplicates;
        dataset.recompute_valid_rows();
    }

    // ===== 只读访问 =====

    pub fn config(&self) -> &ImportConfiguration {
        &self.config
    }

    pub fn dataset(&self) -> Option<&ParsedDataset> {
        self.dataset.as_ref()
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        &self.mappings
    }

    /// 当前无 error 级条目的行数(未加载时为 0)
    pub fn valid_rows(&self) -> usize {
        self.dataset.as_ref().map(|d| d.valid_rows).unwrap_or(0)
    }

    /// 尚未映射的必填字段(声明顺序)
    pub fn unmapped_required_fields(&self) -> Vec<String> {
        self.config
            .required_fields()
            .iter()
            .filter(|field| !self.mappings.iter().any(|m| &m.target_field == *field))
            .cloned()
            .collect()
    }

    /// 提交前置条件: 有数据集、有有效行、必填字段全部映射
    pub fn can_submit(&self) -> bool {
        self.dataset.is_some()
            && self.valid_rows() > 0
            && self.unmapped_required_fields().is_empty()
    }
}
