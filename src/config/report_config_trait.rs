// ==========================================
// 出勤登记系统 - 报表配置读取 Trait
// ==========================================
// 职责: 定义报表/导出所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::{MemberType, PercentageBasis};
use crate::exporter::writer::ExportFormat;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ReportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ReportConfigReader: Send + Sync {
    /// 出勤率口径
    ///
    /// # 默认值
    /// - TOTAL_DAYS
    async fn get_percentage_basis(&self) -> RepositoryResult<PercentageBasis>;

    /// 中心报表名册筛选的会员类型
    ///
    /// # 默认值
    /// - NAMDAN
    async fn get_roster_member_type(&self) -> RepositoryResult<MemberType>;

    /// 导出列宽上限
    ///
    /// # 默认值
    /// - 50
    async fn get_max_column_width(&self) -> RepositoryResult<usize>;

    /// 是否导出矩阵 sheet
    ///
    /// # 默认值
    /// - true
    async fn get_include_matrix(&self) -> RepositoryResult<bool>;

    /// 导出格式
    ///
    /// # 默认值
    /// - XLSX
    async fn get_export_format(&self) -> RepositoryResult<ExportFormat>;

    /// 用户消息语言
    ///
    /// # 默认值
    /// - en
    async fn get_locale(&self) -> RepositoryResult<String>;
}
