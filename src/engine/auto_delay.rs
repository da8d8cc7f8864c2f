// ==========================================
// 安保服务管理系统 - 延迟自动派生引擎
// ==========================================
// 职责: 监听表单时间字段,自动重算 ritardo 并条件写回
// 红线: 任何输入缺失/不可解析 → 静默放弃,不改动表单状态
//       （录入过程中的半填表单是常态,不是错误）
// ==========================================

use crate::domain::form::{FieldValue, FormState, SetOptions};
use crate::domain::intervention::form_fields::{
    DATA_ORA_INTERVENTO, DATA_REGISTRAZIONE, ORARIO_INTERVENTO, RITARDO, TEMPO_INTERVENTO,
};
use crate::engine::delay::DelayEngine;
use tracing::debug;

/// 触发重算的监听字段集合
///
/// 宿主表单框架应在其中任一字段变更时调用 [`AutoDelayEngine::evaluate`]；
/// 重复调用是安全的（值级幂等）。
pub const WATCHED_FIELDS: [&str; 4] = [
    DATA_REGISTRAZIONE,
    ORARIO_INTERVENTO,
    DATA_ORA_INTERVENTO,
    TEMPO_INTERVENTO,
];

pub struct AutoDelayEngine;

impl AutoDelayEngine {
    /// 重算 ritardo 并条件写回
    ///
    /// # 流程
    /// 1. 读取四个监听字段
    /// 2. 登记时间缺失 / 两种开始时间表示都缺失 / 时限缺失 → 放弃
    /// 3. 解析有效开始时刻（绝对时间戳优先,否则登记日期 + HH:MM 叠加）
    /// 4. elapsed = 毫秒差换算分钟,四舍五入,下限 0
    /// 5. 时限不可解析为数字 → 放弃
    /// 6. ritardo = max(0, elapsed - 时限)
    /// 7. 仅当新值与当前存储值不同才写回,并打上校验/脏标记
    pub fn evaluate(&self, form: &mut dyn FormState) {
        let Some(data_registrazione) = form
            .get(DATA_REGISTRAZIONE)
            .and_then(|v| v.as_timestamp())
        else {
            return;
        };

        let data_ora_intervento = form
            .get(DATA_ORA_INTERVENTO)
            .and_then(|v| v.as_timestamp());
        let orario_intervento = form
            .get(ORARIO_INTERVENTO)
            .and_then(|v| v.as_text().map(str::to_string));

        // 两种开始时间表示任一存在即可
        if data_ora_intervento.is_none() && orario_intervento.is_none() {
            return;
        }

        let Some(tempo_raw) = form.get(TEMPO_INTERVENTO) else {
            return;
        };

        let effective_start = DelayEngine::resolve_effective_start(
            data_registrazione,
            data_ora_intervento,
            orario_intervento.as_deref(),
        );
        let elapsed = DelayEngine::elapsed_minutes(data_registrazione, effective_start);

        // 时限可能以文本形式到达,不可解析时静默放弃
        let Some(tempo_intervento) = tempo_raw.as_number() else {
            return;
        };

        let ritardo = DelayEngine::delay_minutes(elapsed, tempo_intervento);

        // 值级幂等: 与当前存储值相同则不写回、不打脏标记
        let current = form.get(RITARDO).and_then(|v| v.as_number());
        if current == Some(ritardo as f64) {
            return;
        }

        debug!(
            elapsed_minutes = elapsed,
            ritardo_minuti = ritardo,
            "ritardo 重算完成,写回表单"
        );
        form.set(
            RITARDO,
            FieldValue::Number(ritardo as f64),
            SetOptions {
                validate: true,
                mark_dirty: true,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::InMemoryFormState;
    use chrono::{TimeZone, Utc};

    fn base_form() -> InMemoryFormState {
        let reg = Utc.with_ymd_and_hms(2024, 7, 10, 8, 0, 0).unwrap();
        InMemoryFormState::new()
            .with_value(DATA_REGISTRAZIONE, FieldValue::Timestamp(reg))
            .with_value(ORARIO_INTERVENTO, FieldValue::Text("08:30".to_string()))
            .with_value(TEMPO_INTERVENTO, FieldValue::Number(15.0))
    }

    #[test]
    fn test_evaluate_computes_delay() {
        let mut form = base_form();
        AutoDelayEngine.evaluate(&mut form);

        assert_eq!(form.get(RITARDO), Some(FieldValue::Number(15.0)));
        assert!(form.is_dirty(RITARDO));
        assert!(form.is_validated(RITARDO));
    }

    #[test]
    fn test_evaluate_full_timestamp_before_registration_clamps() {
        let early = Utc.with_ymd_and_hms(2024, 7, 10, 7, 50, 0).unwrap();
        let mut form = base_form().with_value(DATA_ORA_INTERVENTO, FieldValue::Timestamp(early));
        AutoDelayEngine.evaluate(&mut form);

        assert_eq!(form.get(RITARDO), Some(FieldValue::Number(0.0)));
    }

    #[test]
    fn test_evaluate_missing_registration_aborts() {
        let mut form = InMemoryFormState::new()
            .with_value(ORARIO_INTERVENTO, FieldValue::Text("08:30".to_string()))
            .with_value(TEMPO_INTERVENTO, FieldValue::Number(15.0));
        AutoDelayEngine.evaluate(&mut form);

        assert_eq!(form.get(RITARDO), None);
        assert!(!form.is_dirty(RITARDO));
    }

    #[test]
    fn test_evaluate_missing_both_starts_aborts() {
        let reg = Utc.with_ymd_and_hms(2024, 7, 10, 8, 0, 0).unwrap();
        let mut form = InMemoryFormState::new()
            .with_value(DATA_REGISTRAZIONE, FieldValue::Timestamp(reg))
            .with_value(TEMPO_INTERVENTO, FieldValue::Number(15.0));
        AutoDelayEngine.evaluate(&mut form);

        assert_eq!(form.get(RITARDO), None);
    }

    #[test]
    fn test_evaluate_unparseable_tempo_aborts() {
        let mut form = base_form();
        form.set(
            TEMPO_INTERVENTO,
            FieldValue::Text("quindici".to_string()),
            SetOptions::default(),
        );
        AutoDelayEngine.evaluate(&mut form);

        assert_eq!(form.get(RITARDO), None);
    }

    #[test]
    fn test_evaluate_idempotent_on_equal_value() {
        // 预置与计算结果相同的 ritardo（文本形式）→ 不写回、不打脏标记
        let mut form = base_form().with_value(RITARDO, FieldValue::Text("15".to_string()));
        AutoDelayEngine.evaluate(&mut form);

        assert!(!form.is_dirty(RITARDO));
        // 原值未被覆盖
        assert_eq!(form.get(RITARDO), Some(FieldValue::Text("15".to_string())));
    }

    #[test]
    fn test_evaluate_rewrites_on_changed_value() {
        let mut form = base_form().with_value(RITARDO, FieldValue::Number(3.0));
        AutoDelayEngine.evaluate(&mut form);

        assert_eq!(form.get(RITARDO), Some(FieldValue::Number(15.0)));
        assert!(form.is_dirty(RITARDO));
    }

    #[test]
    fn test_evaluate_tempo_as_text_parses() {
        let mut form = base_form();
        form.set(
            TEMPO_INTERVENTO,
            FieldValue::Text("15".to_string()),
            SetOptions::default(),
        );
        AutoDelayEngine.evaluate(&mut form);

        assert_eq!(form.get(RITARDO), Some(FieldValue::Number(15.0)));
    }
}
