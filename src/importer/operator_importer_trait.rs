// ==========================================
// 安保服务管理系统 - 操作员导入 Trait
// ==========================================
// 职责: 定义操作员导入接口（不包含实现）
// ==========================================

use crate::domain::operator::ImportResult;
use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

// ==========================================
// OperatorImporter Trait
// ==========================================
// 用途: 操作员导入主接口
// 实现者: OperatorImporterImpl
#[async_trait]
pub trait OperatorImporter: Send + Sync {
    /// 从表格文件导入操作员数据（按扩展名自动选择解析器）
    ///
    /// # 参数
    /// - file_path: 文件路径（.xlsx/.xls/.csv）
    ///
    /// # 返回
    /// - Ok(ImportResult): 导入结果（包含批次信息、DQ 报告、汇总统计）
    /// - Err: 文件读取错误、数据库错误等
    ///
    /// # 导入流程
    /// 1. 文件读取与解析
    /// 2. 字段映射与必填校验（硬失败行进入冲突队列）
    /// 3. 联系方式清洗（TRIM/NULL 标准化/电话与邮箱规范化）
    /// 4. DQ 校验（Warning/Info,不拒绝行）
    /// 5. 客户引用校验（未知引用按配置降级为 None）
    /// 6. 重复检测（同批次内 + 跨批次）
    /// 7. 落库（事务化）+ 批次记录 + DQ 报告生成
    async fn import_from_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> Result<ImportResult, Box<dyn Error>>;

    /// 从 CSV 文件导入操作员数据
    ///
    /// # 参数
    /// - file_path: CSV 文件路径（.csv）
    ///
    /// # 返回
    /// - Ok(ImportResult): 导入结果
    /// - Err: 文件读取错误、数据库错误等
    async fn import_from_csv<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> Result<ImportResult, Box<dyn Error>>;

    /// 批量导入多个文件（并发执行）
    ///
    /// # 参数
    /// - file_paths: 文件路径列表
    ///
    /// # 返回
    /// - Ok(Vec<Result<ImportResult, String>>): 每个文件的导入结果
    ///
    /// # 说明
    /// - 每个文件的导入是独立的，互不影响
    /// - 如果某个文件导入失败，不影响其他文件
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Result<Vec<Result<ImportResult, String>>, Box<dyn Error>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录（HashMap<列名, 值>）
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(Vec<HashMap<String, String>>): 行记录列表
    /// - Err: 文件读取错误、格式错误
    fn parse_to_raw_rows(
        &self,
        file_path: &Path,
    ) -> Result<Vec<std::collections::HashMap<String, String>>, Box<dyn Error>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口（阶段 1）
// 实现者: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 将原始行记录映射为 OperatorRecord
    ///
    /// # 参数
    /// - row: 原始行记录（HashMap<列名, 值>）
    /// - row_number: 行号（用于 DQ 报告）
    ///
    /// # 返回
    /// - Ok(OperatorRecord): 映射后的规范化记录
    ///   （nome/cognome 保证非空,cliente_id 保证合法 UUID 或 None）
    /// - Err: 必填字段缺失（整行硬失败）
    fn map_to_operator(
        &self,
        row: std::collections::HashMap<String, String>,
        row_number: usize,
    ) -> Result<crate::domain::operator::OperatorRecord, Box<dyn Error>>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 数据清洗接口（阶段 2）
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 清洗文本字段（TRIM + 可选 UPPER）
    ///
    /// # 参数
    /// - value: 原始文本
    /// - uppercase: 是否转大写
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    /// 标准化 NULL 值（空字符串/空白 → None）
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 规范化电话号码（保留前导 '+'，去除排版字符，仅留数字）
    ///
    /// # 返回
    /// - Some(String): 规范化后的号码
    /// - None: 空值或不含任何数字
    fn clean_telefono(&self, value: Option<String>) -> Option<String>;

    /// 规范化邮箱（TRIM + 小写）
    fn clean_email(&self, value: Option<String>) -> Option<String>;
}

// ==========================================
// DqValidator Trait
// ==========================================
// 用途: 数据质量校验接口（不拒绝行,只记录）
// 实现者: DqValidator
pub trait DqValidator: Send + Sync {
    /// 校验联系方式质量
    ///
    /// # 参数
    /// - record: 待校验记录
    ///
    /// # 返回
    /// - Vec<DqViolation>: 违规记录列表（Warning/Info）
    fn validate_contacts(
        &self,
        record: &crate::domain::operator::OperatorRecord,
    ) -> Vec<crate::domain::operator::DqViolation>;

    /// 校验客户引用（UUID 合法但客户表中不存在）
    ///
    /// # 参数
    /// - records: 待校验记录列表
    /// - known_clients: 客户表中已存在的 cliente_id 列表
    ///
    /// # 返回
    /// - Vec<DqViolation>: 违规记录列表（Warning）
    fn validate_client_refs(
        &self,
        records: &[crate::domain::operator::OperatorRecord],
        known_clients: &[uuid::Uuid],
    ) -> Vec<crate::domain::operator::DqViolation>;

    /// 生成 DQ 报告
    ///
    /// # 参数
    /// - batch_id: 批次 ID
    /// - violations: 违规记录列表
    fn generate_dq_report(
        &self,
        batch_id: String,
        violations: Vec<crate::domain::operator::DqViolation>,
    ) -> crate::domain::operator::DqReport;
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// 用途: 冲突处理接口
// 实现者: ConflictHandler
pub trait ConflictHandler: Send + Sync {
    /// 检测同批次内重复操作员（姓名去重键）
    ///
    /// # 返回
    /// - Vec<(行号, 标签)>: 重复记录列表
    fn detect_duplicates(
        &self,
        records: &[crate::domain::operator::OperatorRecord],
    ) -> Vec<(usize, String)>;

    /// 检测跨批次重复操作员
    ///
    /// # 参数
    /// - records: 待检测记录列表
    /// - existing_keys: 数据库中已存在的姓名去重键列表
    ///
    /// # 返回
    /// - Vec<(行号, 标签)>: 跨批次重复记录列表
    fn detect_cross_batch_duplicates(
        &self,
        records: &[crate::domain::operator::OperatorRecord],
        existing_keys: &[String],
    ) -> Vec<(usize, String)>;
}
