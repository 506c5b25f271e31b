//! 空テンプレート生成
//!
//! 固定レイアウト（ヘッダー8セル、B8〜B44の検査項目、C/D/E列の記入欄）に
//! 沿った白紙のPDIシートを rust_xlsxwriter で作る。動作確認やテスト用。

use crate::error::{Error, Result};
use crate::layout::{CellRef, HEADER_FIELDS, ITEM_FIRST_ROW, ITEM_LAST_ROW};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

/// テンプレートのシート名
pub const SAMPLE_SHEET_NAME: &str = "PDI";

/// 検査項目（`None` は区切りの空行）
pub const SAMPLE_ITEMS: &[Option<&str>] = &[
    Some("Shipping crate and packaging undamaged"),
    Some("Serial plate matches order documentation"),
    Some("Manipulator paint and covers free of damage"),
    Some("Base mounting bolts present and torqued"),
    Some("Cable harness routing and clamps secure"),
    None,
    Some("Axis 1 rotates full range without noise"),
    Some("Axis 2 rotates full range without noise"),
    Some("Axis 3 rotates full range without noise"),
    Some("Axis 4 rotates full range without noise"),
    Some("Axis 5 rotates full range without noise"),
    Some("Axis 6 rotates full range without noise"),
    Some("Brake release verified on all axes"),
    None,
    Some("Gearbox oil levels correct, no leaks"),
    Some("Counterbalance cylinder pressure within spec"),
    Some("Tool flange clean and undamaged"),
    Some("Calibration marks aligned at sync position"),
    None,
    Some("Controller cabinet interior clean and dry"),
    Some("Teach pendant powers up and enabling device works"),
    Some("Emergency stop circuit tested"),
    Some("Safety I/O and door interlock tested"),
    Some("Software version recorded"),
    Some("Motor and SMB battery status OK"),
    None,
    Some("Manipulator and controller cables undamaged"),
    Some("Connectors locked and labelled"),
    Some("Accessories and spare parts kit complete"),
    Some("Manuals and declaration of conformity included"),
    Some("Final photos taken and filed"),
];

fn encode_err(e: rust_xlsxwriter::XlsxError) -> Error {
    Error::Encode(e.to_string())
}

/// 白紙テンプレートのバイト列
pub fn sample_template_bytes() -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SAMPLE_SHEET_NAME).map_err(encode_err)?;

    let title_format = Format::new().set_bold().set_font_size(14.0);
    let label_format = Format::new()
        .set_bold()
        .set_font_size(10.0)
        .set_align(FormatAlign::Right)
        .set_align(FormatAlign::VerticalCenter);
    let input_format = Format::new()
        .set_border_bottom(FormatBorder::Thin)
        .set_align(FormatAlign::VerticalCenter);
    let column_header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9E1F2))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let item_format = Format::new()
        .set_text_wrap()
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);
    let check_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    sheet.set_column_width(0, 16).map_err(encode_err)?;
    sheet.set_column_width(1, 52).map_err(encode_err)?;
    sheet.set_column_width(2, 16).map_err(encode_err)?;
    sheet.set_column_width(3, 40).map_err(encode_err)?;
    sheet.set_column_width(4, 10).map_err(encode_err)?;

    sheet
        .write_string_with_format(0, 0, "Robot Pre-Delivery Inspection (PDI) Checklist", &title_format)
        .map_err(encode_err)?;

    // ヘッダー: ラベルは値セルの左隣
    for def in HEADER_FIELDS.iter() {
        let cell: CellRef = def.address.parse()?;
        let (row, col) = cell.zero_based();
        let label = format!("{}:", def.label);
        sheet
            .write_string_with_format(row, (col - 1) as u16, &label, &label_format)
            .map_err(encode_err)?;
        sheet.write_blank(row, col as u16, &input_format).map_err(encode_err)?;
    }

    let header_row = ITEM_FIRST_ROW - 2;
    for (col, title) in ["No.", "Inspection Item", "Y / X", "Notes", "Initials"].iter().enumerate() {
        sheet
            .write_string_with_format(header_row, col as u16, *title, &column_header_format)
            .map_err(encode_err)?;
    }

    let mut number = 0;
    for row in ITEM_FIRST_ROW..=ITEM_LAST_ROW {
        let row0 = row - 1;
        let item = SAMPLE_ITEMS.get((row - ITEM_FIRST_ROW) as usize).copied().flatten();
        if let Some(text) = item {
            number += 1;
            sheet
                .write_number_with_format(row0, 0, number as f64, &check_format)
                .map_err(encode_err)?;
            sheet.write_string_with_format(row0, 1, text, &item_format).map_err(encode_err)?;
        } else {
            sheet.write_blank(row0, 0, &check_format).map_err(encode_err)?;
            sheet.write_blank(row0, 1, &item_format).map_err(encode_err)?;
        }
        sheet.write_blank(row0, 2, &check_format).map_err(encode_err)?;
        sheet.write_blank(row0, 3, &item_format).map_err(encode_err)?;
        sheet.write_blank(row0, 4, &check_format).map_err(encode_err)?;
    }

    workbook.save_to_buffer().map_err(encode_err)
}

/// テンプレート中の検査項目数
pub fn sample_item_count() -> usize {
    SAMPLE_ITEMS.iter().filter(|item| item.is_some()).count()
}
