//! シートXMLの差分書き換え
//!
//! `<sheetData>` を quick-xml でストリーム処理し、編集セルだけを
//! インライン文字列セルに置き換える。それ以外のイベントはそのまま流す。
//!
//! - 既存セル: `s`（書式）などの属性を残し、`t` と値だけ入れ替える
//! - 無いセル・行: 行/列の順序を保って挿入する
//! - 編集した行の `spans` は外す（任意属性で、列が増えると不整合になる）
//! - 共有数式の親セルを上書きしたら、子セルの `<f t="shared" si=…/>` を単独の式に展開する

use crate::error::{Error, Result};
use crate::layout::{column_index, column_name, CellRef};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};

pub(crate) fn xml_err(e: impl std::fmt::Display) -> Error {
    Error::Xml(e.to_string())
}

/// 書き換え結果
pub(crate) struct SheetPatch {
    pub xml: Vec<u8>,
    /// 数式セルを値で上書きしたか（calcChain の削除が必要）
    pub replaced_formula: bool,
}

/// 名前空間接頭辞付きのタグ名
struct Tags {
    row: String,
    c: String,
    is_: String,
    t: String,
}

impl Tags {
    fn new(prefix: Option<&str>) -> Self {
        let tag = |local: &str| match prefix {
            Some(p) => format!("{p}:{local}"),
            None => local.to_string(),
        };
        Self {
            row: tag("row"),
            c: tag("c"),
            is_: tag("is"),
            t: tag("t"),
        }
    }
}

struct Patcher<'a> {
    pending: Vec<(CellRef, &'a str)>,
    next: usize,
    tags: Tags,
    writer: Writer<Vec<u8>>,
    replaced_formula: bool,
}

impl<'a> Patcher<'a> {
    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(xml_err)
    }

    fn is_done(&self) -> bool {
        self.next >= self.pending.len()
    }

    fn peek(&self) -> Option<CellRef> {
        self.pending.get(self.next).map(|(cell, _)| *cell)
    }

    fn has_edits_in(&self, row: u32) -> bool {
        self.peek().is_some_and(|cell| cell.row() == row)
    }

    /// 該当セルの編集を取り出す
    fn take(&mut self, row: u32, col: u32) -> Option<(CellRef, &'a str)> {
        let (cell, text) = *self.pending.get(self.next)?;
        if cell.row() == row && cell.col() == col {
            self.next += 1;
            Some((cell, text))
        } else {
            None
        }
    }

    /// `row` より前の行にある未処理の編集を新しい行として書く
    fn write_rows_before(&mut self, row: u32) -> Result<()> {
        while let Some(cell) = self.peek() {
            if cell.row() >= row {
                break;
            }
            let new_row = cell.row();
            let mut start = BytesStart::new(self.tags.row.clone());
            start.push_attribute(("r", new_row.to_string().as_str()));
            self.write(Event::Start(start))?;
            self.write_cells_before(new_row, u32::MAX)?;
            let end = self.tags.row.clone();
            self.write(Event::End(BytesEnd::new(end)))?;
        }
        Ok(())
    }

    /// 同じ行で `col` より左にある未処理の編集を書く
    fn write_cells_before(&mut self, row: u32, col: u32) -> Result<()> {
        while let Some(cell) = self.peek() {
            if cell.row() != row || cell.col() >= col {
                break;
            }
            let (cell, text) = self.pending[self.next];
            self.next += 1;
            self.write_cell(cell, text, None)?;
        }
        Ok(())
    }

    /// インライン文字列セルを書く。`original` の属性（書式など）は引き継ぐ
    fn write_cell(&mut self, cell: CellRef, text: &str, original: Option<&BytesStart<'_>>) -> Result<()> {
        let mut start = BytesStart::new(self.tags.c.clone());
        start.push_attribute(("r", cell.to_string().as_str()));
        if let Some(original) = original {
            for attr in original.attributes().flatten() {
                if matches!(attr.key.local_name().as_ref(), b"r" | b"t" | b"cm" | b"vm") {
                    continue;
                }
                start.push_attribute(attr);
            }
        }

        if text.is_empty() {
            return self.write(Event::Empty(start));
        }

        start.push_attribute(("t", "inlineStr"));
        self.write(Event::Start(start))?;
        self.write(Event::Start(BytesStart::new(self.tags.is_.clone())))?;

        let mut t = BytesStart::new(self.tags.t.clone());
        if text.trim() != text || text.contains('\n') {
            t.push_attribute(("xml:space", "preserve"));
        }
        self.write(Event::Start(t))?;
        self.write(Event::Text(BytesText::new(text)))?;

        let t_end = self.tags.t.clone();
        let is_end = self.tags.is_.clone();
        let c_end = self.tags.c.clone();
        self.write(Event::End(BytesEnd::new(t_end)))?;
        self.write(Event::End(BytesEnd::new(is_end)))?;
        self.write(Event::End(BytesEnd::new(c_end)))
    }

    /// 共有数式の子を `<f>式</f>` として書く（`t`/`si`/`ref` 以外の属性は残す）
    fn write_formula(&mut self, original: &BytesStart<'_>, formula: &str) -> Result<()> {
        let name = String::from_utf8_lossy(original.name().as_ref()).into_owned();
        let mut start = BytesStart::new(name.clone());
        for attr in original.attributes().flatten() {
            if matches!(attr.key.local_name().as_ref(), b"t" | b"si" | b"ref") {
                continue;
            }
            start.push_attribute(attr);
        }
        self.write(Event::Start(start))?;
        self.write(Event::Text(BytesText::new(formula)))?;
        self.write(Event::End(BytesEnd::new(name)))
    }
}

pub(crate) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| match a.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
        })
}

fn prefix_of(e: &BytesStart<'_>) -> Option<String> {
    e.name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
}

/// 指定属性を除いた開始タグ
fn without_attr(e: &BytesStart<'_>, key: &[u8]) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut start = BytesStart::new(name);
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() != key {
            start.push_attribute(attr);
        }
    }
    start.into_owned()
}

fn end_of(e: &BytesStart<'_>) -> BytesEnd<'static> {
    BytesEnd::new(String::from_utf8_lossy(e.name().as_ref()).into_owned())
}

/// 読み飛ばした要素の中身
#[derive(Default)]
struct Skipped {
    had_formula: bool,
    /// 共有数式の親だった場合の (si, 式)
    shared_master: Option<(String, String)>,
}

fn is_shared_master(f: &BytesStart<'_>) -> bool {
    attr_value(f, b"t").as_deref() == Some("shared") && attr_value(f, b"ref").is_some()
}

/// 開始タグの直後から対応する終了タグまで読み飛ばす
fn skip_element(reader: &mut Reader<&[u8]>, buf: &mut Vec<u8>) -> Result<Skipped> {
    let mut depth = 0usize;
    let mut skipped = Skipped::default();
    let mut master_si = None;
    let mut in_master = false;
    // エスケープされたままの式
    let mut raw_formula = String::new();
    loop {
        let event = reader.read_event_into(buf).map_err(xml_err)?;
        match event {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"f" {
                    skipped.had_formula = true;
                    if is_shared_master(&e) {
                        master_si = attr_value(&e, b"si");
                        in_master = true;
                    }
                }
                depth += 1;
            }
            Event::Empty(e) => {
                skipped.had_formula |= e.local_name().as_ref() == b"f";
            }
            Event::Text(t) if in_master => raw_formula.push_str(&String::from_utf8_lossy(&t)),
            Event::GeneralRef(r) if in_master => {
                raw_formula.push('&');
                raw_formula.push_str(&String::from_utf8_lossy(&r));
                raw_formula.push(';');
            }
            Event::End(_) if depth == 0 => break,
            Event::End(_) => {
                in_master = false;
                depth -= 1;
            }
            Event::Eof => return Err(Error::Xml("unexpected end of sheet".into())),
            _ => {}
        }
        buf.clear();
    }
    buf.clear();

    if let Some(si) = master_si {
        let formula = quick_xml::escape::unescape(&raw_formula).map_err(xml_err)?;
        skipped.shared_master = Some((si, formula.into_owned()));
    }
    Ok(skipped)
}

/// 上書きした親の共有数式（si → (親セル, 式)）
type SharedMasters = HashMap<String, (CellRef, String)>;

/// 親を失った共有数式の子なら、自セル位置に合わせた式を返す
fn orphaned_formula(f: &BytesStart<'_>, cell: Option<CellRef>, masters: &SharedMasters) -> Option<String> {
    if masters.is_empty() || attr_value(f, b"t").as_deref() != Some("shared") || attr_value(f, b"ref").is_some() {
        return None;
    }
    let (anchor, formula) = masters.get(&attr_value(f, b"si")?)?;
    let cell = cell?;
    let rows = i64::from(cell.row()) - i64::from(anchor.row());
    let cols = i64::from(cell.col()) - i64::from(anchor.col());
    Some(shift_formula(formula, rows, cols))
}

/// 式中の相対参照を `rows` 行・`cols` 列ずらす
///
/// `$` 付きの行・列は固定。文字列リテラルと引用符付きシート名は触らない。
/// 列全体・行全体の参照（`A:A`, `1:1`）はそのまま。範囲外になった参照は `#REF!`。
fn shift_formula(formula: &str, rows: i64, cols: i64) -> String {
    lazy_static::lazy_static! {
        static ref TOKEN_RE: Regex =
            Regex::new(r#""(?:[^"]|"")*"|'(?:[^']|'')*'|[A-Za-z0-9_.$\\]+"#).unwrap();
        static ref REF_RE: Regex = Regex::new(r"^(\$?)([A-Za-z]{1,3})(\$?)([0-9]+)$").unwrap();
    }

    let mut out = String::with_capacity(formula.len());
    let mut last = 0;
    for token in TOKEN_RE.find_iter(formula) {
        out.push_str(&formula[last..token.start()]);
        last = token.end();
        // 関数名（LOG10(）とシート名（AB1!）は参照ではない
        let next = formula[token.end()..].chars().next();
        match REF_RE.captures(token.as_str()) {
            Some(caps) if !matches!(next, Some('(' | '!')) => {
                out.push_str(&shift_ref(&caps, rows, cols).unwrap_or_else(|| "#REF!".to_string()));
            }
            _ => out.push_str(token.as_str()),
        }
    }
    out.push_str(&formula[last..]);
    out
}

fn shift_ref(caps: &Captures<'_>, rows: i64, cols: i64) -> Option<String> {
    let col_fixed = !caps[1].is_empty();
    let row_fixed = !caps[3].is_empty();
    let col = i64::from(column_index(&caps[2]).ok()?) + if col_fixed { 0 } else { cols };
    let row = caps[4].parse::<i64>().ok()? + if row_fixed { 0 } else { rows };
    let cell = CellRef::new(u32::try_from(col).ok()?, u32::try_from(row).ok()?).ok()?;
    Some(format!("{}{}{}{}", &caps[1], column_name(cell.col()), &caps[3], cell.row()))
}

/// シートXMLに編集を適用
pub(crate) fn patch_sheet_xml(original: &[u8], edits: &BTreeMap<CellRef, String>) -> Result<SheetPatch> {
    let mut patcher = Patcher {
        pending: edits.iter().map(|(cell, text)| (*cell, text.as_str())).collect(),
        next: 0,
        tags: Tags::new(None),
        writer: Writer::new(Vec::with_capacity(original.len() + edits.len() * 64)),
        replaced_formula: false,
    };

    let mut reader = Reader::from_reader(original);
    let mut buf = Vec::new();
    let mut in_sheet_data = false;
    // 編集を含み、出力側で開いている行
    let mut open_row: Option<u32> = None;
    let mut last_row = 0u32;
    let mut last_col = 0u32;
    // そのまま流しているセルの座標
    let mut current_cell: Option<CellRef> = None;
    let mut masters = SharedMasters::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_err)?.into_owned();
        buf.clear();

        match event {
            Event::Start(e) if e.local_name().as_ref() == b"sheetData" => {
                patcher.tags = Tags::new(prefix_of(&e).as_deref());
                in_sheet_data = true;
                patcher.write(Event::Start(e))?;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                patcher.tags = Tags::new(prefix_of(&e).as_deref());
                if patcher.is_done() {
                    patcher.write(Event::Empty(e))?;
                } else {
                    let end = end_of(&e);
                    patcher.write(Event::Start(e))?;
                    patcher.write_rows_before(u32::MAX)?;
                    patcher.write(Event::End(end))?;
                }
            }
            Event::End(e) if in_sheet_data && e.local_name().as_ref() == b"sheetData" => {
                patcher.write_rows_before(u32::MAX)?;
                in_sheet_data = false;
                patcher.write(Event::End(e))?;
            }
            Event::Start(e) if in_sheet_data && e.local_name().as_ref() == b"row" => {
                let row = attr_value(&e, b"r")
                    .and_then(|r| r.parse().ok())
                    .unwrap_or(last_row + 1);
                last_row = row;
                last_col = 0;
                patcher.write_rows_before(row)?;
                if patcher.has_edits_in(row) {
                    patcher.write(Event::Start(without_attr(&e, b"spans")))?;
                    open_row = Some(row);
                } else {
                    patcher.write(Event::Start(e))?;
                }
            }
            Event::Empty(e) if in_sheet_data && e.local_name().as_ref() == b"row" => {
                let row = attr_value(&e, b"r")
                    .and_then(|r| r.parse().ok())
                    .unwrap_or(last_row + 1);
                last_row = row;
                patcher.write_rows_before(row)?;
                if patcher.has_edits_in(row) {
                    patcher.write(Event::Start(without_attr(&e, b"spans")))?;
                    patcher.write_cells_before(row, u32::MAX)?;
                    patcher.write(Event::End(end_of(&e)))?;
                } else {
                    patcher.write(Event::Empty(e))?;
                }
            }
            Event::End(e) if in_sheet_data && e.local_name().as_ref() == b"row" => {
                if let Some(row) = open_row.take() {
                    patcher.write_cells_before(row, u32::MAX)?;
                }
                patcher.write(Event::End(e))?;
            }
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                current_cell = cell_ref(&e);
                match open_row {
                    Some(row) => {
                        let col = cell_col(&e).unwrap_or(last_col + 1);
                        last_col = col;
                        patcher.write_cells_before(row, col)?;
                        match patcher.take(row, col) {
                            Some((cell, text)) => {
                                let skipped = skip_element(&mut reader, &mut buf)?;
                                patcher.replaced_formula |= skipped.had_formula;
                                if let Some((si, formula)) = skipped.shared_master {
                                    masters.insert(si, (cell, formula));
                                }
                                patcher.write_cell(cell, text, Some(&e))?;
                            }
                            None => patcher.write(Event::Start(e))?,
                        }
                    }
                    None => patcher.write(Event::Start(e))?,
                }
            }
            Event::Start(e) if e.local_name().as_ref() == b"f" => {
                match orphaned_formula(&e, current_cell, &masters) {
                    Some(formula) => {
                        skip_element(&mut reader, &mut buf)?;
                        patcher.write_formula(&e, &formula)?;
                    }
                    None => patcher.write(Event::Start(e))?,
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"f" => {
                match orphaned_formula(&e, current_cell, &masters) {
                    Some(formula) => patcher.write_formula(&e, &formula)?,
                    None => patcher.write(Event::Empty(e))?,
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"c" => match open_row {
                Some(row) => {
                    let col = cell_col(&e).unwrap_or(last_col + 1);
                    last_col = col;
                    patcher.write_cells_before(row, col)?;
                    match patcher.take(row, col) {
                        Some((cell, text)) => patcher.write_cell(cell, text, Some(&e))?,
                        None => patcher.write(Event::Empty(e))?,
                    }
                }
                None => patcher.write(Event::Empty(e))?,
            },
            Event::Eof => break,
            event => patcher.write(event)?,
        }
    }

    if !patcher.is_done() {
        return Err(Error::Encode("worksheet has no sheetData element".into()));
    }

    Ok(SheetPatch {
        xml: patcher.writer.into_inner(),
        replaced_formula: patcher.replaced_formula,
    })
}

fn cell_ref(e: &BytesStart<'_>) -> Option<CellRef> {
    attr_value(e, b"r").and_then(|r| r.parse().ok())
}

fn cell_col(e: &BytesStart<'_>) -> Option<u32> {
    cell_ref(e).map(|cell| cell.col())
}

/// 指定要素（空要素のみ）を条件に合うものだけ取り除く
///
/// `[Content_Types].xml` の Override や `.rels` の Relationship の削除に使う。
pub(crate) fn remove_empty_elements<F>(xml: &[u8], local: &[u8], matches: F) -> Result<Vec<u8>>
where
    F: Fn(&BytesStart<'_>) -> bool,
{
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Empty(e) if e.local_name().as_ref() == local && matches(&e) => {}
            Event::Eof => break,
            event => writer.write_event(event).map_err(xml_err)?,
        }
        buf.clear();
    }
    Ok(writer.into_inner())
}
