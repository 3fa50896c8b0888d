// ==========================================
// 出勤登记系统 - API层错误类型
// ==========================================
// 职责: 调用方可见的封闭错误集合, 转换下层错误为可操作的提示
// 说明: "已登记跳过" 与 "无有效计划" 是业务结果, 不在此列
// ==========================================

use crate::engine::error::EngineError;
use crate::exporter::error::ExportError;
use crate::i18n::{t, t_with_args};
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 校验错误 (不触发任何 I/O)
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("无效日期区间: from={from} 晚于 to={to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    // ==========================================
    // 存储错误 (不自动重试)
    // ==========================================
    #[error("存储访问失败: {0}")]
    PersistenceError(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("没有可导出的数据")]
    NothingToExport,

    #[error("导出失败: {0}")]
    ExportFailed(String),

    // ==========================================
    // 请求被取代
    // ==========================================
    #[error("请求已被新的请求取代")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 面向用户的提示
    ///
    /// 校验类错误给出具体原因; 存储类错误只给通用提示, 操作可由用户重试
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ValidationError(reason) => {
                t_with_args("error.validation", &[("reason", reason.as_str())])
            }
            ApiError::InvalidRange { from, to } => t_with_args(
                "error.invalid_range",
                &[
                    ("from", from.format("%d/%m/%Y").to_string().as_str()),
                    ("to", to.format("%d/%m/%Y").to_string().as_str()),
                ],
            ),
            ApiError::PersistenceError(_) => t("error.persistence"),
            ApiError::NothingToExport => t("error.nothing_to_export"),
            ApiError::ExportFailed(_) => t("error.export_failed"),
            ApiError::Cancelled => t("error.cancelled"),
            ApiError::Other(_) => t("error.internal"),
        }
    }

    /// 用户可直接重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::PersistenceError(_) | ApiError::ExportFailed(_) | ApiError::Cancelled
        )
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        ApiError::ValidationError(reason.into())
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Other(err) => ApiError::Other(err),
            // 引用不存在的会员/作用域
            RepositoryError::ForeignKeyViolation(msg) => ApiError::ValidationError(msg),
            other => ApiError::PersistenceError(other.to_string()),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidRange { from, to } => ApiError::InvalidRange { from, to },
            EngineError::InvalidTransition { flow, action } => {
                ApiError::ValidationError(format!("{} 流程不支持 {}", flow, action))
            }
            EngineError::Cancelled => ApiError::Cancelled,
            EngineError::Repository(e) => e.into(),
        }
    }
}

// ==========================================
// 从 ExportError 转换
// ==========================================
impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NothingToExport => ApiError::NothingToExport,
            other => ApiError::ExportFailed(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

/// 日期区间校验 (缺失或倒置)
pub(crate) fn require_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> ApiResult<(NaiveDate, NaiveDate)> {
    let from = from.ok_or_else(|| ApiError::validation("缺少起始日期"))?;
    let to = to.ok_or_else(|| ApiError::validation("缺少截止日期"))?;
    if to < from {
        return Err(ApiError::InvalidRange { from, to });
    }
    Ok((from, to))
}

/// id 校验
pub(crate) fn require_id(field: &str, id: i64) -> ApiResult<i64> {
    if id <= 0 {
        return Err(ApiError::validation(format!("{} 无效: {}", field, id)));
    }
    Ok(id)
}
