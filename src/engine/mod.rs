// ==========================================
// 安保服务管理系统 - 引擎层
// ==========================================
// 职责: 派生计算规则,不拼 SQL,不做持久化
// 红线: 引擎对表单的唯一副作用是 ritardo 字段的条件写回
// ==========================================

pub mod auto_delay;
pub mod delay;

// 重导出核心引擎
pub use auto_delay::{AutoDelayEngine, WATCHED_FIELDS};
pub use delay::DelayEngine;
