// ==========================================
// 学前托育运营系统 - 导入模板生成
// ==========================================
// 职责: 按实体配置生成带样例行的 CSV 模板文本
// 口径: 列序 = 必填(声明顺序) + 可选(声明顺序);
//       样例行按表头投影,缺失字段补空串
// ==========================================

use crate::importer::error::ImportResult;
use crate::schema::ImportConfiguration;
use anyhow::Context;

/// 生成导入模板(逗号分隔, '\n' 结尾)
///
/// # 红线
/// - 模板必须能被 tokenize 无损读回并通过该实体的全部校验
pub fn generate_template(config: &ImportConfiguration) -> ImportResult<String> {
    let headers: Vec<&str> = config.all_fields().map(String::as_str).collect();

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&headers).context("写入模板表头失败")?;

    for sample in config.sample_rows() {
        let record: Vec<&str> = headers
            .iter()
            .map(|field| sample.get(*field).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(&record).context("写入模板样例行失败")?;
    }

    let bytes = writer.into_inner().context("刷新模板缓冲失败")?;
    let template = String::from_utf8(bytes).context("模板内容不是合法 UTF-8")?;
    Ok(template)
}
