// ==========================================
// 出勤登记系统 - 引擎层错误类型
// ==========================================

use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("无效日期区间: from={from} 晚于 to={to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("无效的状态转换: flow={flow} action={action}")]
    InvalidTransition { flow: String, action: String },

    #[error("请求已被新的请求取代")]
    Cancelled,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type EngineResult<T> = Result<T, EngineError>;
