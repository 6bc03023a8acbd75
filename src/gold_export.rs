use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::gold_stats::{PlayerStatsRow, ZoneShotRow, ZoneStats};
use crate::zone::Zone;

pub struct ExportReport {
    pub players: usize,
    pub zones: usize,
}

pub fn export_player_workbook(
    path: &Path,
    players: &[PlayerStatsRow],
    zones: &ZoneStats,
) -> Result<ExportReport> {
    let mut player_rows = vec![vec![
        "Player".to_string(),
        "Season".to_string(),
        "Apps".to_string(),
        "Avg Rating".to_string(),
        "Goals".to_string(),
        "Assists".to_string(),
        "Shots".to_string(),
        "On Target".to_string(),
        "Shot Acc %".to_string(),
        "Pass Acc %".to_string(),
        "Main Position".to_string(),
    ]];
    player_rows.extend(players.iter().map(player_row));

    let mut zone_rows = vec![vec![
        "Side".to_string(),
        "Zone".to_string(),
        "Description".to_string(),
        "Shots".to_string(),
        "On Target".to_string(),
        "Goals".to_string(),
        "Shot Types".to_string(),
    ]];
    zone_rows.extend(
        zones
            .my_shots
            .iter()
            .map(|(zone, row)| zone_row("me", *zone, row)),
    );
    zone_rows.extend(
        zones
            .opponent_shots
            .iter()
            .map(|(zone, row)| zone_row("opponent", *zone, row)),
    );

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Players")?;
        write_rows(sheet, &player_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Zones")?;
        write_rows(sheet, &zone_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        players: players.len(),
        zones: zone_rows.len() - 1,
    })
}

fn player_row(p: &PlayerStatsRow) -> Vec<String> {
    vec![
        p.name.clone(),
        p.season.clone(),
        p.appearances.to_string(),
        format!("{:.2}", p.avg_rating),
        p.goals.to_string(),
        p.assists.to_string(),
        p.shots.to_string(),
        p.effective_shots.to_string(),
        format!("{:.1}", p.shot_accuracy),
        format!("{:.1}", p.pass_accuracy),
        p.main_position.clone(),
    ]
}

fn zone_row(side: &str, zone: Zone, row: &ZoneShotRow) -> Vec<String> {
    let types: Vec<String> = row
        .shot_types
        .iter()
        .map(|(kind, n)| format!("{kind} {n}"))
        .collect();
    vec![
        side.to_string(),
        zone.label().to_string(),
        zone.description().to_string(),
        row.total.to_string(),
        row.on_target.to_string(),
        row.goals.to_string(),
        types.join(", "),
    ]
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
