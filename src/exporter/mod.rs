// ==========================================
// 出勤登记系统 - 导出层
// ==========================================
// 职责: 报表/计划出勤 -> 内存工作簿 -> 文件 (xlsx / csv)
// ==========================================

pub mod error;
pub mod plan_export;
pub mod report_exporter;
pub mod workbook;
pub mod writer;

pub use error::{ExportError, ExportResult};
pub use plan_export::PlanAttendanceExporter;
pub use report_exporter::{ExportArtifact, ReportExporter, MATRIX_SHEET, SUMMARY_SHEET};
pub use workbook::{CellValue, Sheet, Workbook};
pub use writer::{writer_for, CsvWorkbookWriter, ExportFormat, WorkbookWriter, XlsxWorkbookWriter};
