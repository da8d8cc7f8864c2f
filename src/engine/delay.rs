// ==========================================
// 安保服务管理系统 - 响应延迟派生规则
// ==========================================
// 职责: effective_start / elapsed_minutes / ritardo 派生
// ==========================================

use chrono::{DateTime, NaiveTime, Utc};

pub struct DelayEngine;

impl DelayEngine {
    /// 解析 "HH:MM" 字符串
    ///
    /// # 规则
    /// - 以 ":" 分割为两半,两半都必须解析为整数
    /// - 任一半解析失败或超出 NaiveTime 合法范围 → None
    pub fn parse_orario(orario: &str) -> Option<NaiveTime> {
        let mut parts = orario.trim().splitn(2, ':');
        let hour: u32 = parts.next()?.trim().parse().ok()?;
        let minute: u32 = parts.next()?.trim().parse().ok()?;
        NaiveTime::from_hms_opt(hour, minute, 0)
    }

    /// 解析有效干预开始时刻
    ///
    /// # 规则
    /// 1. 绝对时间戳存在 → 直接使用
    /// 2. 否则取登记时间的日历日期,叠加 "HH:MM" 的时分
    /// 3. "HH:MM" 不可解析 → 跳过叠加,使用当日零点
    pub fn resolve_effective_start(
        data_registrazione: DateTime<Utc>,
        data_ora_intervento: Option<DateTime<Utc>>,
        orario_intervento: Option<&str>,
    ) -> DateTime<Utc> {
        if let Some(full) = data_ora_intervento {
            return full;
        }

        let date = data_registrazione.date_naive();
        let time = orario_intervento
            .and_then(Self::parse_orario)
            .unwrap_or(NaiveTime::MIN);

        DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(time), Utc)
    }

    /// 计算实际响应耗时（分钟）
    ///
    /// # 规则
    /// - (有效开始时刻 - 登记时刻) 毫秒差换算为分钟,四舍五入
    /// - 下限截断为 0（干预不可能早于登记,负值视为 0）
    pub fn elapsed_minutes(
        data_registrazione: DateTime<Utc>,
        effective_start: DateTime<Utc>,
    ) -> i64 {
        let elapsed_ms = (effective_start - data_registrazione).num_milliseconds();
        let minutes = (elapsed_ms as f64 / 60_000.0).round() as i64;
        minutes.max(0)
    }

    /// 计算响应延迟（分钟）
    ///
    /// # 规则
    /// - ritardo = max(0, elapsed - tempo_intervento)
    /// - 延迟是超出合同时限的部分,绝不为负
    pub fn delay_minutes(elapsed: i64, tempo_intervento: f64) -> i64 {
        ((elapsed as f64) - tempo_intervento).max(0.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 10, h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_orario() {
        assert_eq!(
            DelayEngine::parse_orario("08:30"),
            NaiveTime::from_hms_opt(8, 30, 0)
        );
        assert_eq!(
            DelayEngine::parse_orario(" 8:05 "),
            NaiveTime::from_hms_opt(8, 5, 0)
        );

        // 任一半非数字 → None
        assert_eq!(DelayEngine::parse_orario("ab:30"), None);
        assert_eq!(DelayEngine::parse_orario("08:xx"), None);
        assert_eq!(DelayEngine::parse_orario("0830"), None);

        // 超出合法范围 → None
        assert_eq!(DelayEngine::parse_orario("25:99"), None);
    }

    #[test]
    fn test_resolve_effective_start_full_timestamp_wins() {
        let full = ts(9, 15);
        let resolved =
            DelayEngine::resolve_effective_start(ts(8, 0), Some(full), Some("23:59"));
        assert_eq!(resolved, full);
    }

    #[test]
    fn test_resolve_effective_start_overlay() {
        let resolved = DelayEngine::resolve_effective_start(ts(8, 0), None, Some("08:30"));
        assert_eq!(resolved, ts(8, 30));
    }

    #[test]
    fn test_resolve_effective_start_overlay_skipped() {
        // 不可解析的 HH:MM → 当日零点
        let resolved = DelayEngine::resolve_effective_start(ts(8, 0), None, Some("bad"));
        assert_eq!(resolved, ts(0, 0));
    }

    #[test]
    fn test_elapsed_minutes_rounds() {
        assert_eq!(DelayEngine::elapsed_minutes(ts(8, 0), ts(8, 30)), 30);

        // 29.5 分钟 → 四舍五入为 30
        let start = ts(8, 0) + chrono::Duration::seconds(29 * 60 + 30);
        assert_eq!(DelayEngine::elapsed_minutes(ts(8, 0), start), 30);
    }

    #[test]
    fn test_elapsed_minutes_clamped_at_zero() {
        // 开始早于登记 → 0
        assert_eq!(DelayEngine::elapsed_minutes(ts(8, 0), ts(7, 50)), 0);
    }

    #[test]
    fn test_delay_minutes() {
        assert_eq!(DelayEngine::delay_minutes(30, 15.0), 15);
        assert_eq!(DelayEngine::delay_minutes(10, 15.0), 0);
        assert_eq!(DelayEngine::delay_minutes(0, 15.0), 0);
    }
}
