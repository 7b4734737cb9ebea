use shared::domain::{Cargo, TrackingEntry};

const COLUMNS: [&str; 10] = [
    "貨物ID",
    "フライト番号",
    "出発空港",
    "到着空港",
    "貨物タイプ",
    "重量(kg)",
    "容積(m³)",
    "ステータス",
    "荷送人",
    "荷受人",
];

fn row(cargo: &Cargo) -> [String; 10] {
    [
        cargo.cargo_id.to_string(),
        cargo.flight_number.clone(),
        cargo.origin_airport.clone(),
        cargo.destination_airport.clone(),
        cargo.cargo_type.clone(),
        cargo.weight.to_string(),
        cargo.volume.to_string(),
        cargo.status.clone(),
        cargo.shipper_name.clone(),
        cargo.consignee_name.clone(),
    ]
}

pub fn cargo_table(cargos: &[&Cargo]) -> String {
    table(COLUMNS, cargos.iter().map(|cargo| row(cargo)).collect())
}

const TRACKING_COLUMNS: [&str; 6] = ["追跡ID", "位置", "ステータス", "日時", "担当者", "備考"];

pub fn tracking_table(entries: &[TrackingEntry]) -> String {
    let rows = entries
        .iter()
        .map(|entry| {
            [
                entry.tracking_id.clone(),
                entry.location.clone(),
                entry.status.clone(),
                entry.timestamp.map(|ts| ts.to_string()).unwrap_or_default(),
                entry.handler_id.clone().unwrap_or_default(),
                entry.notes.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(TRACKING_COLUMNS, rows)
}

/// Plain-text table, one line per row. Columns are padded by character
/// count, so full-width text may not line up in every terminal.
fn table<const N: usize>(headings: [&str; N], rows: Vec<[String; N]>) -> String {
    let mut widths = headings.map(|heading| heading.chars().count());
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, headings.into_iter(), &widths);
    for cells in &rows {
        push_line(&mut out, cells.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

pub fn cargo_detail(cargo: &Cargo) -> String {
    let mut out = String::new();
    for (heading, value) in COLUMNS.iter().zip(row(cargo)) {
        out.push_str(&format!("{heading}: {value}\n"));
    }
    if let Some(created) = cargo.created_date {
        out.push_str(&format!("作成日時: {created}\n"));
    }
    if let Some(updated) = cargo.updated_date {
        out.push_str(&format!("更新日時: {updated}\n"));
    }
    if let Some(version) = cargo.version {
        out.push_str(&format!("バージョン: {version}\n"));
    }
    out
}
