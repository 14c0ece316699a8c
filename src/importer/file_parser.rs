// ==========================================
// 教室容量分配系统 - 文件解析器
// ==========================================
// 支持: CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 原始行记录（列名 -> 值）
pub type RawRecord = HashMap<String, String>;

// ==========================================
// Trait: FileParser
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录
    ///
    /// # 返回
    /// - Ok(Vec<RawRecord>): 行记录列表（已跳过空行）
    /// - Err: 文件不存在、格式不支持、CSV 解析失败
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从任意读取源解析（表头小写化）
    pub fn parse_reader<R: Read>(&self, source: R) -> ImportResult<Vec<RawRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(source);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(row_map);
        }

        Ok(records)
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        if let Some(ext) = file_path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(file_path)?;
        self.parse_reader(file)
    }
}
