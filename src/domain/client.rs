// ==========================================
// 安保服务管理系统 - 客户领域模型
// ==========================================
// 用途: 客户与服务点主数据,导入层只用于引用校验
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Cliente - 客户主数据
// ==========================================
// 对齐: db.rs clienti 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cliente {
    pub cliente_id: Uuid,        // 客户唯一标识
    pub ragione_sociale: String, // 公司名称
    pub indirizzo: Option<String>,
    pub citta: Option<String>,
    pub telefono: Option<String>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// PuntoServizio - 服务点
// ==========================================
// 用途: 客户下属的受保护地点,干预日志关联于此
// 对齐: db.rs punti_servizio 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuntoServizio {
    pub punto_servizio_id: Uuid, // 服务点唯一标识
    pub cliente_id: Uuid,        // 所属客户（FK）
    pub nome: String,            // 服务点名称
    pub indirizzo: Option<String>,
    pub note: Option<String>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
