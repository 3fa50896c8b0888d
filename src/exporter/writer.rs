// ==========================================
// 出勤登记系统 - 工作簿写出
// ==========================================
// 支持: Excel (.xlsx) / CSV (每个 sheet 一个文件)
// ==========================================

use crate::exporter::error::{ExportError, ExportResult};
use crate::exporter::workbook::{sanitize_file_part, CellValue, Workbook};
use csv::WriterBuilder;
use rust_xlsxwriter::Format;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Xlsx => write!(f, "XLSX"),
            ExportFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "XLSX" => Ok(ExportFormat::Xlsx),
            "CSV" => Ok(ExportFormat::Csv),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

// ==========================================
// WorkbookWriter Trait
// ==========================================
pub trait WorkbookWriter: Send + Sync {
    fn format(&self) -> ExportFormat;

    /// 将工作簿写入 dir 下, 文件名以 stem 开头
    ///
    /// # 返回
    /// - 写出的全部文件路径
    fn write(&self, workbook: &Workbook, dir: &Path, stem: &str) -> ExportResult<Vec<PathBuf>>;
}

// ==========================================
// XlsxWorkbookWriter
// ==========================================

/// Excel 列号 (0 起), 超出 u16 时报错而不是回绕
fn column_index(col: usize) -> ExportResult<u16> {
    u16::try_from(col).map_err(|_| ExportError::TooManyColumns(col))
}

pub struct XlsxWorkbookWriter {
    max_column_width: usize,
}

impl XlsxWorkbookWriter {
    pub fn new(max_column_width: usize) -> Self {
        Self { max_column_width }
    }
}

impl WorkbookWriter for XlsxWorkbookWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn write(&self, workbook: &Workbook, dir: &Path, stem: &str) -> ExportResult<Vec<PathBuf>> {
        let path = dir.join(format!("{}.{}", stem, self.format().extension()));
        let header_format = Format::new().set_bold();
        let mut book = rust_xlsxwriter::Workbook::new();

        for sheet in &workbook.sheets {
            let worksheet = book.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            for (col, header) in sheet.headers.iter().enumerate() {
                worksheet.write_string_with_format(0, column_index(col)?, header, &header_format)?;
            }
            for (row_idx, row) in sheet.rows.iter().enumerate() {
                let row_no = (row_idx + 1) as u32;
                for (col, cell) in row.iter().enumerate() {
                    let col = column_index(col)?;
                    match cell {
                        CellValue::Text(s) => worksheet.write_string(row_no, col, s)?,
                        CellValue::Number(n) => worksheet.write_number(row_no, col, *n)?,
                    };
                }
            }
            for (col, width) in sheet.column_widths(self.max_column_width).iter().enumerate() {
                worksheet.set_column_width(column_index(col)?, *width as f64)?;
            }
        }

        book.save(&path)?;
        Ok(vec![path])
    }
}

// ==========================================
// CsvWorkbookWriter
// ==========================================
pub struct CsvWorkbookWriter;

impl WorkbookWriter for CsvWorkbookWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn write(&self, workbook: &Workbook, dir: &Path, stem: &str) -> ExportResult<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(workbook.sheets.len());
        for sheet in &workbook.sheets {
            let path = dir.join(format!(
                "{}_{}.{}",
                stem,
                sanitize_file_part(&sheet.name),
                self.format().extension()
            ));
            let mut writer = WriterBuilder::new().from_path(&path)?;
            writer.write_record(&sheet.headers)?;
            for row in &sheet.rows {
                writer.write_record(row.iter().map(|cell| cell.to_string()))?;
            }
            writer.flush()?;
            paths.push(path);
        }
        Ok(paths)
    }
}

/// 按格式构造写出器
pub fn writer_for(format: ExportFormat, max_column_width: usize) -> Box<dyn WorkbookWriter> {
    match format {
        ExportFormat::Xlsx => Box::new(XlsxWorkbookWriter::new(max_column_width)),
        ExportFormat::Csv => Box::new(CsvWorkbookWriter),
    }
}
