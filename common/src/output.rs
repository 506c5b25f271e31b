//! 出力ファイル生成
//!
//! 書き戻し → バイト列化 → ファイル名決定 までをまとめる。
//! ダウンロードや保存は呼び出し側（CLI / Web）が行う。

use crate::error::{Error, Result};
use crate::mapper::{output_filename, write_back, Workbook};
use crate::types::InspectionData;

/// xlsx のMIMEタイプ
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// 生成済みファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// 集約データのファイル名
pub fn filename_for(data: &InspectionData) -> String {
    output_filename(
        data.header_info.robot_model(),
        data.header_info.serial_number(),
        data.verdict,
    )
}

/// 元ブックに書き戻してファイルを生成
///
/// ブックはその場で書き換える。同じデータで再実行しても結果は変わらない。
pub fn generate_file<W: Workbook>(
    data: &InspectionData,
    workbook: Option<&mut W>,
) -> Result<GeneratedFile> {
    let workbook = workbook.ok_or(Error::MissingWorkbook)?;
    write_back(data, Some(&mut *workbook))?;

    let bytes = workbook.encode()?;
    let file_name = filename_for(data);
    tracing::info!("Generated {} ({} bytes)", file_name, bytes.len());

    Ok(GeneratedFile {
        file_name,
        mime_type: XLSX_MIME,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{parse_workbook, Worksheet};
    use crate::memory::{MemorySheet, MemoryWorkbook};
    use crate::types::{ItemStatus, Verdict};

    fn parsed() -> (InspectionData, MemoryWorkbook) {
        let mut sheet = MemorySheet::new("PDI");
        sheet.put("B4", "SN/01".into());
        sheet.put("D3", "IRB 6700".into());
        sheet.put("B8", "Check bolts".into());
        let parsed = parse_workbook(MemoryWorkbook::with_sheet(sheet)).unwrap();
        (InspectionData::new(parsed.header_info, parsed.items), parsed.workbook)
    }

    #[test]
    fn test_generate_file() {
        let (mut data, mut workbook) = parsed();
        data.items[0].status = ItemStatus::Pass;
        data.inspector_initials = "JD".into();
        data.verdict = Some(Verdict::Pass);

        let file = generate_file(&data, Some(&mut workbook)).unwrap();

        assert_eq!(file.file_name, "IRB 6700 PDI - SN01 - Pass.xlsx");
        assert_eq!(file.mime_type, XLSX_MIME);
        assert!(!file.bytes.is_empty());
        let sheet = workbook.worksheet().unwrap();
        assert_eq!(sheet.get_value("C8".parse().unwrap()).to_text(), "Y");
    }

    #[test]
    fn test_generate_file_without_workbook() {
        let (data, _) = parsed();
        let result = generate_file::<MemoryWorkbook>(&data, None);
        assert!(matches!(result, Err(Error::MissingWorkbook)));
    }

    #[test]
    fn test_filename_pending_verdict() {
        let (data, _) = parsed();
        assert_eq!(filename_for(&data), "IRB 6700 PDI - SN01 - Pending.xlsx");
    }
}
