// ==========================================
// 安保服务管理系统 - 操作员领域模型
// ==========================================
// 用途: 导入层写入,管理界面只读
// 红线: OperatorRecord 仅由字段映射器构造,
//       保证 nome/cognome 非空、cliente_id 为合法 UUID 或 None
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// OperatorRecord - 导入中间结构体（规范化行）
// ==========================================
// 用途: 导入管道中间产物（文件解析 → 字段映射 → 此结构）
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorRecord {
    // ===== 必填身份字段（映射器保证非空）=====
    pub nome: String,    // 名
    pub cognome: String, // 姓

    // ===== 客户关联（合法 UUID 或 None，绝不保留畸形值）=====
    pub cliente_id: Option<Uuid>,

    // ===== 联系方式（自由文本，互相独立）=====
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub note: Option<String>,

    // 元信息
    pub row_number: usize, // 原始文件行号（用于 DQ 报告）
}

impl OperatorRecord {
    /// 展示标签（"Nome Cognome"）
    pub fn label(&self) -> String {
        format!("{} {}", self.nome, self.cognome)
    }

    /// 去重键（姓名小写拼接，用于同批次/跨批次重复检测）
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}",
            self.nome.trim().to_lowercase(),
            self.cognome.trim().to_lowercase()
        )
    }
}

// ==========================================
// Operatore - 操作员主数据（落库实体）
// ==========================================
// 对齐: db.rs operatori 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operatore {
    pub operatore_id: String, // 操作员唯一标识（UUID）

    pub nome: String,
    pub cognome: String,
    pub cliente_id: Option<Uuid>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub note: Option<String>,

    // ===== 审计字段 =====
    pub import_batch_id: Option<String>, // 来源导入批次（人工录入为 None）
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// ImportBatch - 导入批次
// ==========================================
// 用途: 记录导入批次元信息
// 对齐: db.rs import_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,                   // 批次 ID（UUID）
    pub file_name: Option<String>,          // 源文件名
    pub file_path: Option<String>,          // 源文件路径
    pub total_rows: i32,                    // 总行数
    pub success_rows: i32,                  // 成功导入行数
    pub blocked_rows: i32,                  // 阻断行数（必填字段缺失等硬失败）
    pub warning_rows: i32,                  // 警告行数（DQ WARNING）
    pub conflict_rows: i32,                 // 冲突行数
    pub imported_at: Option<DateTime<Utc>>, // 导入时间
    pub imported_by: Option<String>,        // 导入人
    pub elapsed_ms: Option<i32>,            // 导入耗时（毫秒）
    pub dq_report_json: Option<String>,     // DQ 报告 JSON
}

// ==========================================
// ImportConflict - 导入冲突记录
// ==========================================
// 用途: 记录必填缺失/重复操作员等，进入人工队列
// 对齐: db.rs import_conflict 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConflict {
    pub conflict_id: String,           // 冲突记录 ID（UUID）
    pub batch_id: String,              // 关联批次 ID
    pub row_number: usize,             // 原始文件行号
    pub operator_label: Option<String>, // 操作员标签（如果可解析）
    pub conflict_type: ConflictType,   // 冲突类型
    pub raw_data: String,              // 原始行数据（JSON）
    pub reason: String,                // 冲突原因
    pub resolved: bool,                // 是否已处理
    pub created_at: DateTime<Utc>,     // 创建时间
}

// ==========================================
// ConflictType - 冲突类型枚举
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictType {
    RequiredFieldMissing, // 必填字段缺失（Nome/Cognome）
    DuplicateOperator,    // 重复操作员（同批次或跨批次）
    UnknownClient,        // 客户引用不存在
    DataTypeError,        // 数据类型错误
}

// ==========================================
// DqViolation - 数据质量违规记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,              // 原始文件行号
    pub operator_label: Option<String>, // 操作员标签（如果可解析）
    pub level: DqLevel,                 // 违规级别
    pub field: String,                  // 违规字段
    pub message: String,                // 违规描述
}

// ==========================================
// DqLevel - 数据质量级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DqLevel {
    Error,    // 错误（阻断该行）
    Warning,  // 警告（允许导入）
    Info,     // 提示（仅记录）
    Conflict, // 冲突（进入冲突队列）
}

// ==========================================
// DqReport - 数据质量报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqReport {
    pub batch_id: String,             // 批次 ID
    pub summary: DqSummary,           // 汇总统计
    pub violations: Vec<DqViolation>, // 违规明细
}

// ==========================================
// DqSummary - 数据质量汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize, // 总行数
    pub success: usize,    // 成功导入
    pub blocked: usize,    // 阻断（ERROR）
    pub warning: usize,    // 警告（WARNING）
    pub conflict: usize,   // 冲突（CONFLICT）
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
// 用途: 导入接口返回值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub batch: ImportBatch,                // 批次信息
    pub summary: DqSummary,                // 汇总统计
    pub violations: Vec<DqViolation>,      // 违规明细
    pub elapsed_time: std::time::Duration, // 导入耗时
}
