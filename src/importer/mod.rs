// ==========================================
// 教室容量分配系统 - 导入层
// ==========================================
// 职责: 外部教室目录导入
// 支持: CSV
// ==========================================

pub mod catalog_importer;
pub mod error;
pub mod file_parser;

pub use catalog_importer::CatalogImporter;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, FileParser, RawRecord};
