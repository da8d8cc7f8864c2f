// ==========================================
// 安保服务管理系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 未知客户引用是否降级为 None
    ///
    /// # 返回
    /// - true: UUID 合法但客户表中不存在时,写库前置空（记录 Warning）
    /// - false: 保留引用,由外键约束在落库时拦截
    ///
    /// # 默认值
    /// - true
    async fn get_null_unknown_client_refs(&self) -> Result<bool, Box<dyn Error>>;

    /// 获取电话号码最少位数（DQ 警告阈值）
    ///
    /// # 默认值
    /// - 6
    async fn get_min_telefono_digits(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取单次导入行数上限
    ///
    /// # 默认值
    /// - 10000
    async fn get_max_import_rows(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取导入批次保留天数
    ///
    /// # 返回
    /// - i32: 保留天数（超期批次可清理）
    ///
    /// # 默认值
    /// - 90
    async fn get_batch_retention_days(&self) -> Result<i32, Box<dyn Error>>;
}
