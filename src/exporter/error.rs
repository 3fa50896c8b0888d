// ==========================================
// 出勤登记系统 - 导出模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导出模块错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("没有可导出的数据")]
    NothingToExport,

    #[error("导出格式不支持: {0}（仅支持 XLSX/CSV）")]
    UnsupportedFormat(String),

    #[error("文件写入失败: {0}")]
    FileWriteError(String),

    #[error("Excel 写入失败: {0}")]
    XlsxWriteError(String),

    #[error("CSV 写入失败: {0}")]
    CsvWriteError(String),

    #[error("列数超出 Excel 上限: 第 {0} 列")]
    TooManyColumns(usize),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::FileWriteError(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::XlsxWriteError(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::CsvWriteError(err.to_string())
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
