// ==========================================
// 安保服务管理系统 - 数据质量校验器实现
// ==========================================
// 职责: Warning/Info 级数据质量检查 + DQ 报告生成
// 红线: DQ 校验只记录、不拒绝行（行拒绝权仅属于字段映射器）
// ==========================================

use crate::domain::operator::{DqLevel, DqReport, DqSummary, DqViolation, OperatorRecord};
use crate::importer::operator_importer_trait::DqValidator as DqValidatorTrait;
use std::collections::HashSet;
use uuid::Uuid;

pub struct DqValidator {
    min_telefono_digits: usize, // 电话号码最少位数
}

impl DqValidator {
    pub fn new(min_telefono_digits: usize) -> Self {
        Self {
            min_telefono_digits,
        }
    }
}

impl DqValidatorTrait for DqValidator {
    /// 校验联系方式质量
    fn validate_contacts(&self, record: &OperatorRecord) -> Vec<DqViolation> {
        let mut violations = Vec::new();

        // email 形态检查（只警告,不做完整格式校验）
        if let Some(email) = &record.email {
            if !email.contains('@') {
                violations.push(DqViolation {
                    row_number: record.row_number,
                    operator_label: Some(record.label()),
                    level: DqLevel::Warning,
                    field: "email".to_string(),
                    message: format!("email 缺少 '@': {}", email),
                });
            }
        }

        // telefono 位数检查
        if let Some(telefono) = &record.telefono {
            let digits = telefono.chars().filter(|c| c.is_ascii_digit()).count();
            if digits < self.min_telefono_digits {
                violations.push(DqViolation {
                    row_number: record.row_number,
                    operator_label: Some(record.label()),
                    level: DqLevel::Warning,
                    field: "telefono".to_string(),
                    message: format!(
                        "电话位数不足 ({} < {}): {}",
                        digits, self.min_telefono_digits, telefono
                    ),
                });
            }
        }

        // 联系方式完全缺失（INFO 级别）
        if record.telefono.is_none() && record.email.is_none() && record.note.is_none() {
            violations.push(DqViolation {
                row_number: record.row_number,
                operator_label: Some(record.label()),
                level: DqLevel::Info,
                field: "telefono,email,note".to_string(),
                message: "联系方式字段全部缺失".to_string(),
            });
        }

        violations
    }

    /// 校验客户引用（UUID 语法合法但客户表中不存在）
    fn validate_client_refs(
        &self,
        records: &[OperatorRecord],
        known_clients: &[Uuid],
    ) -> Vec<DqViolation> {
        let known: HashSet<&Uuid> = known_clients.iter().collect();
        let mut violations = Vec::new();

        for record in records {
            if let Some(cliente_id) = &record.cliente_id {
                if !known.contains(cliente_id) {
                    violations.push(DqViolation {
                        row_number: record.row_number,
                        operator_label: Some(record.label()),
                        level: DqLevel::Warning,
                        field: "cliente_id".to_string(),
                        message: format!("客户引用不存在: {}", cliente_id),
                    });
                }
            }
        }

        violations
    }

    /// 生成 DQ 报告
    fn generate_dq_report(&self, batch_id: String, violations: Vec<DqViolation>) -> DqReport {
        // 统计各级别数量
        let error_count = violations
            .iter()
            .filter(|v| matches!(v.level, DqLevel::Error))
            .count();
        let warning_count = violations
            .iter()
            .filter(|v| matches!(v.level, DqLevel::Warning))
            .count();
        let conflict_count = violations
            .iter()
            .filter(|v| matches!(v.level, DqLevel::Conflict))
            .count();

        DqReport {
            batch_id,
            summary: DqSummary {
                total_rows: 0, // 外部填充
                success: 0,    // 外部填充
                blocked: error_count,
                warning: warning_count,
                conflict: conflict_count,
            },
            violations,
        }
    }
}
