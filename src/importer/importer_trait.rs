// ==========================================
// 学前托育运营系统 - 导入协作方 Trait
// ==========================================
// 职责: 定义导入引擎的外部协作接口（不包含实现）
// 红线: 引擎不落库、不触网,持久化与查重数据全部经由协作方注入
// ==========================================

use crate::domain::dataset::{BatchMeta, TransformedRow, UploadResult, ValidationError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;

// ==========================================
// UploadSink Trait
// ==========================================
// 用途: 接收清洗后的提交批次并返回逐行处理结果
// 实现者: 应用层的持久化后端适配器
#[async_trait]
pub trait UploadSink: Send + Sync {
    /// 提交清洗后的批次
    ///
    /// # 参数
    /// - rows: 已转换的提交行（仅含无 error 级条目的行）
    /// - meta: 批次元信息（批次 ID / 实体类型 / 行数统计）
    ///
    /// # 返回
    /// - Ok(UploadResult): 协作方的逐批处理结果,success=false 也经此返回
    /// - Err: 协作方拒绝（传输失败等）,数据集保留供重试
    async fn submit(
        &self,
        rows: Vec<TransformedRow>,
        meta: &BatchMeta,
    ) -> Result<UploadResult, Box<dyn Error + Send + Sync>>;
}

// ==========================================
// CustomValidator Trait
// ==========================================
// 用途: 调用方注入的行级附加校验,输出原样并入校验条目
// 说明: 严重级别由实现方自定（error 阻断该行,warning 不阻断）
pub trait CustomValidator: Send + Sync {
    /// 校验单行（index 为 0 起始下标,产出条目的 row 应为 index+1）
    fn validate(&self, row: &HashMap<String, String>, index: usize) -> Vec<ValidationError>;
}
