// ==========================================
// 学前托育运营系统 - 导入编排器
// ==========================================
// 职责: 会话状态门禁 → 行转换 → 批次提交 → 结果落会话
// 口径: 提交排除含 error 级条目的行;同一编排器同一时刻至多一次提交
// 红线: 协作方返回后才允许触碰会话状态(全有或全无);
//       提交失败或 success=false 时数据集原样保留供修订重试
// ==========================================

use crate::domain::dataset::{BatchMeta, TransformedRow, UploadResult};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::session::ImportSession;
use crate::importer::transform::transform_row;
use crate::importer::importer_trait::UploadSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

// ==========================================
// ImportOrchestrator
// ==========================================
pub struct ImportOrchestrator<U: UploadSink> {
    session: ImportSession,
    uploader: Arc<U>,
    // &mut self 已串行化正常调用路径;本标志覆盖提交 future 未正常析构的情形:
    // 被丢弃时由守卫复位,被泄漏时保持置位,后续提交得到 SubmissionInFlight。
    // is_submitting 供应用层查询状态。
    in_flight: AtomicBool,
}

/// 提交标志守卫: 无论提交正常返回还是被取消,都复位 in_flight
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<U: UploadSink> ImportOrchestrator<U> {
    pub fn new(session: ImportSession, uploader: Arc<U>) -> Self {
        Self {
            session,
            uploader,
            in_flight: AtomicBool::new(false),
        }
    }

    /// 提交当前数据集的有效行
    ///
    /// # 门禁（依次检查,先到先报）
    /// 1. 无数据集 → NoDataset
    /// 2. 必填字段未全部映射 → MissingRequiredMapping
    /// 3. 有效行数为 0 → NoValidRows
    /// 4. 已有提交在途 → SubmissionInFlight
    ///
    /// # 口径
    /// - Err 仅表示协作方拒绝(传输失败等),success=false 的业务结果经 Ok 返回
    /// - 仅协作方返回 success=true 时清空数据集,其余情况会话原样保留
    /// - 提交 future 中途被丢弃时不触碰会话状态,in_flight 随守卫复位
    pub async fn submit(&mut self) -> ImportResult<UploadResult> {
        let dataset = self.session.dataset().ok_or(ImportError::NoDataset)?;

        let unmapped = self.session.unmapped_required_fields();
        if !unmapped.is_empty() {
            return Err(ImportError::MissingRequiredMapping { fields: unmapped });
        }
        if dataset.valid_rows == 0 {
            return Err(ImportError::NoValidRows);
        }
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(ImportError::SubmissionInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        // 转换全部无 error 行,有 error 行整体排除
        let rows: Vec<TransformedRow> = dataset
            .rows
            .iter()
            .enumerate()
            .filter(|(index, _)| !dataset.row_has_error(*index))
            .map(|(_, row)| transform_row(row, self.session.mappings()))
            .collect();

        let meta = BatchMeta {
            batch_id: Uuid::new_v4(),
            entity: self.session.config().entity,
            total_rows: dataset.total_rows,
            valid_rows: dataset.valid_rows,
            skipped_rows: dataset.total_rows - rows.len(),
            warning_count: dataset.warnings.len(),
        };

        info!(
            batch_id = %meta.batch_id,
            entity = %meta.entity,
            submitted_rows = rows.len(),
            skipped_rows = meta.skipped_rows,
            "开始提交导入批次"
        );

        let result = self
            .uploader
            .submit(rows, &meta)
            .await
            .map_err(|e| ImportError::UploadFailed(e.to_string()))?;

        // 协作方已返回,此后才触碰会话状态
        if result.success {
            info!(
                batch_id = %meta.batch_id,
                processed = result.processed_count,
                "批次提交成功,清空会话数据集"
            );
            self.session.reset();
        } else {
            warn!(
                batch_id = %meta.batch_id,
                errors = result.error_count,
                "协作方报告批次未全部成功,数据集保留供修订重试"
            );
        }

        Ok(result)
    }

    /// 当前是否有提交在途（提交期间应用层应禁用修订操作）
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    // ===== 会话透传 =====

    pub fn session(&self) -> &ImportSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ImportSession {
        &mut self.session
    }

    pub fn load(&mut self, content: &str) -> ImportResult<()> {
        self.session.load(content)?;
        Ok(())
    }
}
