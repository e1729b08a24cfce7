// ==========================================
// 学前托育运营系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 行列级数据问题是 ValidationError 数据,不走本错误通道;
//       重复记录永远是警告,不出现在此处
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 解析错误 =====
    #[error("输入内容为空: 没有可导入的数据行")]
    EmptyInput,

    // ===== 配置错误 =====
    #[error("导入配置非法 (实体 {entity}): {message}")]
    InvalidConfiguration { entity: String, message: String },

    // ===== 映射错误 =====
    #[error("必填字段未映射: {}", fields.join(", "))]
    MissingRequiredMapping { fields: Vec<String> },

    #[error("目标字段不存在于导入配置: {field}")]
    UnknownTargetField { field: String },

    #[error("源列不存在于当前数据集: {column}")]
    UnknownSourceColumn { column: String },

    // ===== 会话状态错误 =====
    #[error("行号越界: 第 {row} 行（共 {total} 行）")]
    RowIndexOutOfRange { row: usize, total: usize },

    #[error("当前会话没有已解析的数据集")]
    NoDataset,

    #[error("没有可提交的有效行")]
    NoValidRows,

    #[error("已有提交在进行中,请等待其完成")]
    SubmissionInFlight,

    // ===== 上传错误 =====
    #[error("上传失败: {0}")]
    UploadFailed(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
