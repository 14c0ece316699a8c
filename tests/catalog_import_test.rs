// ==========================================
// 教室目录导入集成测试
// ==========================================

use class_optima::domain::{RoomCategory, RoomStatus};
use class_optima::importer::{CatalogImporter, ImportError};
use std::io::Write;
use std::path::Path;

fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_import_original_nine_rooms() {
    let file = write_csv(&[
        "id,name,category,capacity,occupancy",
        "1,G-8 CSE A,Classroom,72,30",
        "2,G-9 CSE B,Classroom,72,72",
        "3,G-11 CSE C,Classroom,72,0",
        "4,G-12 CSE D,Classroom,72,0",
        "5,G-15 CSE E,Classroom,72,0",
        "6,G-16 CSE F,Classroom,72,0",
        "7,G-7 AI Nexus Lab,Lab,72,0",
        "8,G-13/14 Combined Lab,Lab,134,0",
        "9,G-10 Seminar Hall 1,Seminar Hall,90,0",
    ]);

    let catalog = CatalogImporter::new().import_file(file.path()).unwrap();
    assert_eq!(catalog.len(), 9);
    assert_eq!(catalog.get(2).unwrap().status(), RoomStatus::Occupied);
    assert_eq!(catalog.get(9).unwrap().category(), RoomCategory::SeminarHall);
    assert_eq!(catalog.total_free_space(), 728 - 30 - 72);
}

#[test]
fn test_header_case_and_column_order_do_not_matter() {
    let file = write_csv(&["Capacity,Category,Name,ID", "40,lab,Chem Lab,3"]);

    let catalog = CatalogImporter::new().import_file(file.path()).unwrap();
    let room = catalog.get(3).unwrap();
    assert_eq!(room.capacity(), 40);
    assert_eq!(room.name(), "Chem Lab");
}

#[test]
fn test_non_numeric_capacity_reports_row() {
    let file = write_csv(&[
        "id,name,category,capacity",
        "1,A,Classroom,72",
        "2,B,Classroom,seventy",
    ]);

    let err = CatalogImporter::new().import_file(file.path()).unwrap_err();
    match err {
        ImportError::TypeConversionError { row, field, .. } => {
            assert_eq!(row, 2);
            assert_eq!(field, "capacity");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_file() {
    let err = CatalogImporter::new()
        .import_file(Path::new("/definitely/not/here.csv"))
        .unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}
