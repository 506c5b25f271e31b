//! xlsx ブック
//!
//! 読み込みは calamine、書き出しは元のzipパーツを保持したまま
//! 先頭シートのXMLだけを差し替える。書式・結合・列幅・画像などは
//! 元ファイルのバイト列がそのまま残る。
//!
//! ```text
//! bytes ─┬─ zip → parts[] ──────────────┐
//!        └─ calamine → values            ├─ encode → bytes
//!            set_value → edits ─ patch ──┘
//! ```

mod patch;

use crate::error::{Error, Result};
use crate::layout::CellRef;
use crate::mapper::{CellValue, Workbook, Worksheet};
use calamine::{open_workbook_from_rs, CellType, Data, Range, Reader, Xlsx};
use patch::{attr_value, patch_sheet_xml, remove_empty_elements, xml_err};
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const CALC_CHAIN_PART: &str = "xl/calcChain.xml";

/// zip内の1パーツ
#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// xlsxの先頭ワークシート
#[derive(Debug, Clone)]
pub struct XlsxSheet {
    name: String,
    /// zip内のパス（`xl/worksheets/sheet1.xml` など）
    path: String,
    values: HashMap<CellRef, CellValue>,
    edits: BTreeMap<CellRef, String>,
}

impl XlsxSheet {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 未保存の書き込み数
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }
}

impl Worksheet for XlsxSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_value(&self, cell: CellRef) -> CellValue {
        if let Some(text) = self.edits.get(&cell) {
            return CellValue::Text(text.clone());
        }
        self.values.get(&cell).cloned().unwrap_or(CellValue::Empty)
    }

    fn set_value(&mut self, cell: CellRef, value: &str) {
        self.edits.insert(cell, value.to_string());
    }
}

/// 元ファイルを保持したxlsxブック
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    parts: Vec<Part>,
    sheet: XlsxSheet,
}

impl XlsxWorkbook {
    /// xlsxのバイト列から読み込む
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let parts = read_parts(bytes)?;

        let workbook_xml = find_part(&parts, WORKBOOK_PART)
            .ok_or_else(|| Error::Workbook(format!("{} not found", WORKBOOK_PART)))?;
        let rels_xml = find_part(&parts, WORKBOOK_RELS_PART)
            .ok_or_else(|| Error::Workbook(format!("{} not found", WORKBOOK_RELS_PART)))?;
        let (name, path) = first_worksheet(workbook_xml, rels_xml)?.ok_or(Error::NoWorksheet)?;
        if find_part(&parts, &path).is_none() {
            return Err(Error::Workbook(format!("{} not found", path)));
        }

        let values = read_values(bytes, &name)?;
        tracing::debug!("Worksheet '{}' ({}): {} cells", name, path, values.len());

        Ok(Self {
            parts,
            sheet: XlsxSheet {
                name,
                path,
                values,
                edits: BTreeMap::new(),
            },
        })
    }

    pub fn sheet(&self) -> &XlsxSheet {
        &self.sheet
    }

    /// zip内のパーツ名一覧（元の順序）
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }
}

impl Workbook for XlsxWorkbook {
    type Sheet = XlsxSheet;

    fn worksheet(&self) -> Option<&XlsxSheet> {
        Some(&self.sheet)
    }

    fn worksheet_mut(&mut self) -> Option<&mut XlsxSheet> {
        Some(&mut self.sheet)
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut parts: Vec<(&str, Cow<'_, [u8]>)> = self
            .parts
            .iter()
            .map(|p| (p.name.as_str(), Cow::Borrowed(p.data.as_slice())))
            .collect();

        if !self.sheet.edits.is_empty() {
            let original = find_part(&self.parts, &self.sheet.path)
                .ok_or_else(|| Error::Encode(format!("{} not found", self.sheet.path)))?;
            let patched = patch_sheet_xml(original, &self.sheet.edits)?;

            for (name, data) in parts.iter_mut() {
                if *name == self.sheet.path {
                    *data = Cow::Owned(patched.xml.clone());
                }
            }

            // 数式を値で上書きしたら計算チェーンは無効になる
            if patched.replaced_formula {
                parts = drop_calc_chain(parts)?;
            }
        }

        write_parts(&parts)
    }
}

fn find_part<'a>(parts: &'a [Part], name: &str) -> Option<&'a [u8]> {
    parts
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.data.as_slice())
}

fn zip_err(e: zip::result::ZipError) -> Error {
    Error::Workbook(e.to_string())
}

/// zipの全ファイルを元の順序で読み込む（ディレクトリは除く）
fn read_parts(bytes: &[u8]) -> Result<Vec<Part>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(zip_err)?;
    let mut parts = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(zip_err)?;
        if file.is_dir() {
            continue;
        }
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        parts.push(Part {
            name: file.name().to_string(),
            data,
        });
    }
    Ok(parts)
}

fn write_parts(parts: &[(&str, Cow<'_, [u8]>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in parts {
        zip.start_file(*name, options)
            .map_err(|e| Error::Encode(e.to_string()))?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish().map_err(|e| Error::Encode(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// 先頭ワークシートの (シート名, zip内パス)
///
/// workbook.xml の `<sheet r:id>` を workbook.xml.rels で解決する。
/// グラフシートなど worksheet 以外は飛ばす。
fn first_worksheet(workbook_xml: &[u8], rels_xml: &[u8]) -> Result<Option<(String, String)>> {
    let mut sheets = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(workbook_xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"sheet" => {
                let name = attr_value(e, b"name").unwrap_or_default();
                // r:id（接頭辞は何でもよい）
                let rid = attr_value(e, b"id");
                if let Some(rid) = rid {
                    sheets.push((name, rid));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let mut targets: HashMap<String, String> = HashMap::new();
    let mut reader = quick_xml::Reader::from_reader(rels_xml);
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Empty(ref e) | Event::Start(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr_value(e, b"Id");
                let target = attr_value(e, b"Target");
                let kind = attr_value(e, b"Type").unwrap_or_default();
                if let (Some(id), Some(target)) = (id, target) {
                    if kind.ends_with("/worksheet") || target.contains("worksheets/") {
                        targets.insert(id, target);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets
        .into_iter()
        .find_map(|(name, rid)| targets.get(&rid).map(|t| (name, resolve_target(t)))))
}

/// relsのTargetをzip内パスにする（`xl/` からの相対、または `/` 始まりの絶対）
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

/// calamineでセル値を読む（数式セルは式と結果の両方）
fn read_values(bytes: &[u8], sheet_name: &str) -> Result<HashMap<CellRef, CellValue>> {
    let mut xlsx: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: calamine::XlsxError| Error::Workbook(e.to_string()))?;

    let range = xlsx
        .worksheet_range(sheet_name)
        .map_err(|e| Error::Workbook(e.to_string()))?;
    let mut values = collect_range(&range, convert_data);

    // 数式が読めなくても値は使える
    match xlsx.worksheet_formula(sheet_name) {
        Ok(formulas) => {
            for (cell, formula) in collect_range(&formulas, |f: &String| {
                if f.is_empty() { CellValue::Empty } else { CellValue::Text(f.clone()) }
            }) {
                let CellValue::Text(formula) = formula else { continue };
                let result = values.remove(&cell).unwrap_or(CellValue::Empty);
                values.insert(
                    cell,
                    CellValue::Formula {
                        formula,
                        result: Box::new(result),
                    },
                );
            }
        }
        Err(e) => tracing::warn!("Failed to read formulas of '{}': {}", sheet_name, e),
    }

    Ok(values)
}

/// 空でないセルを1始まりの座標で集める
fn collect_range<T, F>(range: &Range<T>, convert: F) -> HashMap<CellRef, CellValue>
where
    T: CellType,
    F: Fn(&T) -> CellValue,
{
    let mut values = HashMap::new();
    let Some((start_row, start_col)) = range.start() else {
        return values;
    };
    for (row, col, data) in range.used_cells() {
        let value = convert(data);
        if value == CellValue::Empty {
            continue;
        }
        let row = start_row + row as u32 + 1;
        let col = start_col + col as u32 + 1;
        if let Ok(cell) = CellRef::new(col, row) {
            values.insert(cell, value);
        }
    }
    values
}

fn convert_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

/// calcChain.xml と、それを指す Override / Relationship を外す
fn drop_calc_chain<'a>(
    parts: Vec<(&'a str, Cow<'a, [u8]>)>,
) -> Result<Vec<(&'a str, Cow<'a, [u8]>)>> {
    let mentions = |data: &[u8]| data.windows(b"calcChain".len()).any(|w| w == b"calcChain");

    let mut out = Vec::with_capacity(parts.len());
    for (name, data) in parts {
        if name != CALC_CHAIN_PART && !mentions(data.as_ref()) {
            out.push((name, data));
            continue;
        }
        match name {
            CALC_CHAIN_PART => {
                tracing::debug!("Dropping {}", CALC_CHAIN_PART);
            }
            CONTENT_TYPES_PART => {
                let xml = remove_empty_elements(&data, b"Override", |e| {
                    attr_value(e, b"PartName").as_deref() == Some("/xl/calcChain.xml")
                })?;
                out.push((name, Cow::Owned(xml)));
            }
            WORKBOOK_RELS_PART => {
                let xml = remove_empty_elements(&data, b"Relationship", |e| {
                    attr_value(e, b"Target").is_some_and(|t| t.ends_with("calcChain.xml"))
                })?;
                out.push((name, Cow::Owned(xml)));
            }
            _ => out.push((name, data)),
        }
    }
    Ok(out)
}
