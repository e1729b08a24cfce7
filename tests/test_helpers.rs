// ==========================================
// 学前托育运营系统 - 集成测试辅助
// ==========================================
// 用途: 共享的注册表构建/样例文本/Mock 上传协作方
// ==========================================

#![allow(dead_code)]

use preschool_ops::domain::dataset::{BatchMeta, TransformedRow, UploadResult};
use preschool_ops::domain::types::EntityKind;
use preschool_ops::importer::importer_trait::UploadSink;
use preschool_ops::importer::session::ImportSession;
use preschool_ops::schema::SchemaRegistry;
use chrono::NaiveDate;
use std::error::Error;
use std::sync::Arc;
use std::sync::Mutex;

/// 测试统一基准日期（年龄类校验可复现）
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 1).expect("合法日期")
}

pub fn builtin_registry() -> SchemaRegistry {
    preschool_ops::logging::init_test();
    SchemaRegistry::builtin_with_reference_date(reference_date()).expect("内置配置合法")
}

pub fn session_for(entity: EntityKind) -> ImportSession {
    let registry = builtin_registry();
    let config = registry.get(entity).expect("内置实体存在");
    ImportSession::new(config)
}

// ===== 样例文本 =====

pub const STUDENTS_CSV: &str = "\
First Name,Last Name,DOB,Class
John,Doe,2020-01-15,class-1
Amy,Lee,2020-05-01,class-2
";

pub const STUDENTS_CSV_WITH_BAD_ROW: &str = "\
First Name,Last Name,DOB,Class
John,Doe,2020-01-15,class-1
,Doe,2020-01-15,class-1
";

// ==========================================
// MockUploadSink - 记录提交批次的测试协作方
// ==========================================
pub struct MockUploadSink {
    pub submissions: Mutex<Vec<(Vec<TransformedRow>, BatchMeta)>>,
    pub response: Mutex<MockResponse>,
}

pub enum MockResponse {
    Success,
    BusinessFailure,
    TransportError(String),
}

impl MockUploadSink {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            submissions: Mutex::new(Vec::new()),
            response: Mutex::new(MockResponse::Success),
        })
    }

    pub fn failing_business() -> Arc<Self> {
        Arc::new(Self {
            submissions: Mutex::new(Vec::new()),
            response: Mutex::new(MockResponse::BusinessFailure),
        })
    }

    pub fn failing_transport(message: &str) -> Arc<Self> {
        Arc::new(Self {
            submissions: Mutex::new(Vec::new()),
            response: Mutex::new(MockResponse::TransportError(message.to_string())),
        })
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().expect("锁未中毒").len()
    }

    pub fn last_submission(&self) -> (Vec<TransformedRow>, BatchMeta) {
        self.submissions
            .lock()
            .expect("锁未中毒")
            .last()
            .cloned()
            .expect("至少一次提交")
    }
}

#[async_trait::async_trait]
impl UploadSink for MockUploadSink {
    async fn submit(
        &self,
        rows: Vec<TransformedRow>,
        meta: &BatchMeta,
    ) -> Result<UploadResult, Box<dyn Error + Send + Sync>> {
        let row_count = rows.len();
        self.submissions
            .lock()
            .expect("锁未中毒")
            .push((rows, meta.clone()));

        match &*self.response.lock().expect("锁未中毒") {
            MockResponse::Success => Ok(UploadResult {
                success: true,
                processed_count: row_count,
                error_count: 0,
                skipped_count: meta.skipped_rows,
                errors: None,
                warnings: None,
            }),
            MockResponse::BusinessFailure => Ok(UploadResult {
                success: false,
                processed_count: 0,
                error_count: row_count,
                skipped_count: 0,
                errors: None,
                warnings: Some(vec!["backend rejected batch".to_string()]),
            }),
            MockResponse::TransportError(message) => Err(message.clone().into()),
        }
    }
}
