// ==========================================
// 教室容量分配系统 - 教室目录导入器
// ==========================================
// 职责: CSV -> RoomCatalog
// 列: id, name, category, capacity [, occupancy]
// 红线: 任一行失败则整体失败，不产生半份目录
// ==========================================

use crate::domain::catalog::RoomCatalog;
use crate::domain::room::Room;
use crate::domain::types::RoomCategory;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, FileParser, RawRecord};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument};

pub struct CatalogImporter {
    parser: Box<dyn FileParser>,
}

impl Default for CatalogImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogImporter {
    pub fn new() -> Self {
        Self {
            parser: Box::new(CsvParser),
        }
    }

    pub fn with_parser(parser: Box<dyn FileParser>) -> Self {
        Self { parser }
    }

    /// 从文件导入目录
    ///
    /// # 错误
    /// - 文件/格式错误、字段缺失、类型转换失败、编号重复、空目录
    #[instrument(skip(self), fields(path = %file_path.display()))]
    pub fn import_file(&self, file_path: &Path) -> ImportResult<RoomCatalog> {
        let records = self.parser.parse_to_raw_records(file_path)?;
        let catalog = Self::build_catalog(&records)?;
        info!(rooms = catalog.len(), "教室目录导入完成");
        Ok(catalog)
    }

    /// 从读取源导入（CSV 文本）
    pub fn import_reader<R: Read>(&self, source: R) -> ImportResult<RoomCatalog> {
        let records = CsvParser.parse_reader(source)?;
        Self::build_catalog(&records)
    }

    /// 行记录 -> 目录（保持文件顺序）
    pub fn build_catalog(records: &[RawRecord]) -> ImportResult<RoomCatalog> {
        if records.is_empty() {
            return Err(ImportError::EmptyCatalog("文件中没有教室记录".to_string()));
        }

        let mut seen = HashSet::with_capacity(records.len());
        let mut rooms = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            let room = map_row(row, record)?;
            if !seen.insert(room.id()) {
                return Err(ImportError::DuplicateRoomId {
                    row,
                    room_id: room.id(),
                });
            }
            rooms.push(room);
        }

        RoomCatalog::new(rooms).map_err(|e| ImportError::Other(anyhow::anyhow!(e)))
    }
}

fn required<'a>(row: usize, record: &'a RawRecord, field: &str) -> ImportResult<&'a str> {
    match record.get(field).map(|v| v.as_str()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ImportError::MissingField {
            row,
            field: field.to_string(),
        }),
    }
}

fn parse_u32(row: usize, field: &str, value: &str) -> ImportResult<u32> {
    value
        .parse::<u32>()
        .map_err(|e| ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("{} ({})", e, value),
        })
}

fn map_row(row: usize, record: &RawRecord) -> ImportResult<Room> {
    let id = parse_u32(row, "id", required(row, record, "id")?)?;
    let name = required(row, record, "name")?;
    let category_raw = required(row, record, "category")?;
    let category =
        RoomCategory::from_str(category_raw).ok_or_else(|| ImportError::TypeConversionError {
            row,
            field: "category".to_string(),
            message: format!("未知类别: {}", category_raw),
        })?;
    let capacity = parse_u32(row, "capacity", required(row, record, "capacity")?)?;
    let occupancy = match record.get("occupancy").map(|v| v.as_str()) {
        Some(v) if !v.is_empty() => parse_u32(row, "occupancy", v)?,
        _ => 0,
    };

    Room::with_occupancy(id, name, category, capacity, occupancy).map_err(|e| {
        ImportError::TypeConversionError {
            row,
            field: "capacity".to_string(),
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_keeps_file_order() {
        let csv = "id,name,category,capacity,occupancy\n\
                   3,G-11 CSE C,Classroom,72,10\n\
                   1,G-8 CSE A,Classroom,72,\n\
                   9,G-10 Seminar Hall 1,seminar_hall,90,5\n";
        let catalog = CatalogImporter::new().import_reader(csv.as_bytes()).unwrap();

        let ids: Vec<u32> = catalog.rooms().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![3, 1, 9]);
        assert_eq!(catalog.get(1).unwrap().occupancy(), 0);
        assert_eq!(catalog.get(9).unwrap().category(), RoomCategory::SeminarHall);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let csv = "id,name,category,capacity\n1,Broken,Lab,0\n";
        let err = CatalogImporter::new().import_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::TypeConversionError { row: 1, .. }));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let csv = "id,name,category,capacity\n1,A,Lab,10\n1,B,Lab,10\n";
        let err = CatalogImporter::new().import_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::DuplicateRoomId { row: 2, room_id: 1 }));
    }

    #[test]
    fn test_missing_name() {
        let csv = "id,name,category,capacity\n1,,Lab,10\n";
        let err = CatalogImporter::new().import_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_empty_file() {
        let err = CatalogImporter::new()
            .import_reader("id,name,category,capacity\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ImportError::EmptyCatalog(_)));
    }

    #[test]
    fn test_over_capacity_row_is_kept() {
        let csv = "id,name,category,capacity,occupancy\n1,A,Classroom,72,80\n";
        let catalog = CatalogImporter::new().import_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.capacity_anomalies(), vec![1]);
    }
}
