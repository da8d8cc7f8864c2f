// ==========================================
// 安保服务管理系统 - 警情干预领域模型
// ==========================================
// 用途: 警情登记与响应延迟记录
// 说明: 表单字段名与登记界面一致（意大利语业务字段）
// ==========================================

use crate::domain::form::FormState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// 表单字段名
// ==========================================
// 延迟派生引擎监听的字段集合即取自此表
pub mod form_fields {
    /// 登记时间（绝对时间戳，必填）
    pub const DATA_REGISTRAZIONE: &str = "data_registrazione";
    /// 干预开始时间（"HH:MM"，与登记日期组合使用）
    pub const ORARIO_INTERVENTO: &str = "orario_intervento";
    /// 干预开始绝对时间戳（存在时优先于 HH:MM）
    pub const DATA_ORA_INTERVENTO: &str = "data_ora_intervento";
    /// 合同约定响应时限（分钟）
    pub const TEMPO_INTERVENTO: &str = "tempo_intervento";
    /// 派生输出: 响应延迟（分钟，仅由引擎写入）
    pub const RITARDO: &str = "ritardo";
}

// ==========================================
// Intervento - 警情干预日志
// ==========================================
// 对齐: db.rs interventi 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervento {
    pub intervento_id: String, // 干预记录唯一标识（UUID）

    // ===== 关联 =====
    pub cliente_id: Option<Uuid>,
    pub punto_servizio_id: Option<Uuid>,

    // ===== 时间字段（与表单字段一一对应）=====
    pub data_registrazione: DateTime<Utc>,
    pub orario_intervento: Option<String>, // "HH:MM"
    pub data_ora_intervento: Option<DateTime<Utc>>,
    pub tempo_intervento_minuti: Option<i64>,
    pub ritardo_minuti: Option<i64>, // 引擎派生值

    pub note: Option<String>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Intervento {
    /// 从表单快照提取干预记录
    ///
    /// # 返回
    /// - Some(Intervento): data_registrazione 存在
    /// - None: 登记时间缺失（表单尚不完整，不可落库）
    pub fn from_form(
        form: &dyn FormState,
        cliente_id: Option<Uuid>,
        punto_servizio_id: Option<Uuid>,
    ) -> Option<Self> {
        let data_registrazione = form
            .get(form_fields::DATA_REGISTRAZIONE)?
            .as_timestamp()?;

        let now = Utc::now();
        Some(Self {
            intervento_id: Uuid::new_v4().to_string(),
            cliente_id,
            punto_servizio_id,
            data_registrazione,
            orario_intervento: form
                .get(form_fields::ORARIO_INTERVENTO)
                .and_then(|v| v.as_text().map(str::to_string)),
            data_ora_intervento: form
                .get(form_fields::DATA_ORA_INTERVENTO)
                .and_then(|v| v.as_timestamp()),
            tempo_intervento_minuti: form
                .get(form_fields::TEMPO_INTERVENTO)
                .and_then(|v| v.as_number())
                .map(|n| n.round() as i64),
            ritardo_minuti: form
                .get(form_fields::RITARDO)
                .and_then(|v| v.as_number())
                .map(|n| n.round() as i64),
            note: None,
            created_at: now,
            updated_at: now,
        })
    }
}
