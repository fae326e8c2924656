use crate::error::{Result, TriageError};
use plate_triage_common::{TriageReport, Urgency};
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 6.0;
const BODY_FONT_SIZE: f32 = 10.0;
const TITLE_FONT_SIZE: f32 = 16.0;
const WRAP_COLUMNS: usize = 95;
const LABEL_WIDTH: usize = 22;

/// レポートをPDFとして出力（印刷用）
pub fn generate_pdf(report: &TriageReport, output_path: &Path) -> Result<()> {
    let (doc, page1, layer1) = PdfDocument::new(
        &report.title,
        Mm(A4_WIDTH_MM),
        Mm(A4_HEIGHT_MM),
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| TriageError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| TriageError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = A4_HEIGHT_MM - MARGIN_MM;

    // 印刷用ヘッダー
    layer.use_text(report.title.clone(), TITLE_FONT_SIZE, Mm(MARGIN_MM), Mm(y), &bold);
    layer.use_text(
        format!("Generated: {}", report.generated_on),
        BODY_FONT_SIZE,
        Mm(A4_WIDTH_MM - MARGIN_MM - 45.0),
        Mm(y),
        &font,
    );
    y -= LINE_HEIGHT_MM * 2.0;

    let marker = match report.urgency {
        Urgency::Urgent => "(!)",
        Urgency::Normal => "(OK)",
    };
    layer.use_text(
        format!("{} {}  -  {}", marker, report.headline, report.age_label),
        TITLE_FONT_SIZE - 2.0,
        Mm(MARGIN_MM),
        Mm(y),
        &bold,
    );
    y -= LINE_HEIGHT_MM * 1.5;

    for line in body_lines(report, WRAP_COLUMNS) {
        if y < MARGIN_MM {
            let (page, layer_index) = doc.add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(layer_index);
            y = A4_HEIGHT_MM - MARGIN_MM;
        }
        layer.use_text(line, BODY_FONT_SIZE, Mm(MARGIN_MM), Mm(y), &font);
        y -= LINE_HEIGHT_MM;
    }

    // 保存
    let file = File::create(output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| TriageError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))?;

    Ok(())
}

/// 見出しより下の本文を折り返し済みの行に展開
///
/// フィールド値はラベル列の右に揃えて折り返す
fn body_lines(report: &TriageReport, columns: usize) -> Vec<String> {
    let mut lines = wrap_hanging("", &report.reason, columns);

    for section in &report.sections {
        lines.push(String::new());
        lines.push(section.title.to_uppercase());
        for f in &section.fields {
            let prefix = format!("  {:<width$} ", f.label, width = LABEL_WIDTH);
            lines.extend(wrap_hanging(&prefix, &f.value, columns));
        }
    }

    if let Some(url) = &report.manual_url {
        lines.push(String::new());
        lines.extend(wrap_hanging("Installation Manual: ", url, columns));
    }

    lines.push(String::new());
    lines.extend(wrap_hanging("", &format!("\"{}\"", report.truck_roll_note), columns));
    lines
}

/// 先頭行に`prefix`を付け、2行目以降は同じ幅だけ字下げして折り返す
///
/// 1行に収まらない単語（URLなど）は文字単位で分割する。
/// 組み込みフォントはASCII前提。
fn wrap_hanging(prefix: &str, text: &str, columns: usize) -> Vec<String> {
    let indent = prefix.chars().count();
    let width = columns.saturating_sub(indent).max(1);
    let continuation = " ".repeat(indent);

    let mut rows: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        for piece in split_long_word(word, width) {
            let needed = if current.is_empty() { 0 } else { current.chars().count() + 1 };
            if needed + piece.chars().count() > width {
                rows.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        }
    }
    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let lead = if i == 0 { prefix } else { continuation.as_str() };
            format!("{}{}", lead, row).trim_end().to_string()
        })
        .collect()
}

fn split_long_word(word: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(width).map(|chunk| chunk.iter().collect()).collect()
}
