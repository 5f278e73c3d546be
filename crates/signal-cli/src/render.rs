//! Terminal tables

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use signal_engine::{BpjsScore, ConfluenceResult, IndicatorSnapshot, ScoreCategory};

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn num(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

pub fn snapshot_table(snapshot: &IndicatorSnapshot) -> Table {
    let mut table = table(vec!["Indicator", "Value", "Reading"]);
    table.add_row(vec![
        Cell::new("Close"),
        Cell::new(format!("{:.2}", snapshot.close)),
        Cell::new(""),
    ]);
    if let Some(rsi) = &snapshot.rsi {
        table.add_row(vec![
            Cell::new(format!("RSI({})", rsi.period)),
            Cell::new(format!("{:.2}", rsi.current)),
            Cell::new(format!("{:?}", rsi.interpretation)),
        ]);
    }
    if let Some(macd) = &snapshot.macd {
        table.add_row(vec![
            Cell::new("MACD"),
            Cell::new(format!(
                "{:.2} / {:.2} / {:.2}",
                macd.macd, macd.signal, macd.histogram
            )),
            Cell::new(format!("crossover {:?}", macd.crossover)),
        ]);
    }
    table.add_row(vec![
        Cell::new("EMA fast / slow"),
        Cell::new(format!("{} / {}", num(snapshot.ema_fast), num(snapshot.ema_slow))),
        Cell::new(""),
    ]);
    if let Some(bb) = &snapshot.bollinger {
        table.add_row(vec![
            Cell::new("Bollinger"),
            Cell::new(format!("{:.2} / {:.2} / {:.2}", bb.lower, bb.middle, bb.upper)),
            Cell::new(format!("{:?}", bb.position)),
        ]);
    }
    table.add_row(vec![Cell::new("ATR"), Cell::new(num(snapshot.atr)), Cell::new("")]);
    if let Some(volume) = &snapshot.volume {
        table.add_row(vec![
            Cell::new("Volume ratio"),
            Cell::new(format!("{:.2}", volume.ratio)),
            Cell::new(format!(
                "{:?}{}",
                volume.trend,
                if volume.is_spike { ", spike" } else { "" }
            )),
        ]);
    }
    table.add_row(vec![Cell::new("Gap %"), Cell::new(num(snapshot.gap_pct)), Cell::new("")]);
    if !snapshot.unavailable.is_empty() {
        table.add_row(vec![
            Cell::new("Unavailable"),
            Cell::new(snapshot.unavailable.join(", ")),
            Cell::new("insufficient history"),
        ]);
    }
    table
}

pub fn timeframes_table(result: &ConfluenceResult) -> Table {
    let mut table = table(vec![
        "Timeframe",
        "Trend",
        "Strength",
        "Support",
        "Resistance",
        "ATR",
    ]);
    for tf in &result.timeframes {
        table.add_row(vec![
            Cell::new(tf.interval),
            Cell::new(tf.trend),
            Cell::new(format!("{:.1}", tf.strength)),
            Cell::new(format!("{:.2}", tf.key_levels.support)),
            Cell::new(format!("{:.2}", tf.key_levels.resistance)),
            Cell::new(num(tf.atr)),
        ]);
    }
    table
}

/// One-paragraph summary printed under the timeframe table
pub fn recommendation_summary(result: &ConfluenceResult) -> String {
    let rec = &result.recommendation;
    let mut lines = vec![
        format!(
            "{} ({}) at {:.2}: {} {:.1}% ({})",
            result.symbol,
            result.mode,
            result.current_price,
            result.confluence.direction,
            result.confluence.strength,
            result.confluence.agreement
        ),
        format!(
            "{} confidence {:.1}%, entry {:.2} - {:.2}",
            rec.action, rec.confidence, rec.entry_zone.min, rec.entry_zone.max
        ),
    ];
    if let Some(stop) = rec.stop_loss {
        lines.push(format!("stop {stop:.2}"));
    }
    if !rec.take_profit.is_empty() {
        let targets: Vec<String> = rec.take_profit.iter().map(|tp| format!("{tp:.2}")).collect();
        lines.push(format!("targets {}", targets.join(", ")));
    }
    lines.join("\n")
}

pub fn scores_table(scores: &[BpjsScore]) -> Table {
    let mut header = vec!["#", "Symbol", "Score", "Vol ratio"];
    header.extend(ScoreCategory::ALL.iter().map(ScoreCategory::as_str));
    let mut table = table(header);
    for (rank, score) in scores.iter().enumerate() {
        let mut row = vec![
            Cell::new(rank + 1),
            Cell::new(&score.symbol),
            Cell::new(format!("{:.1}", score.total_score)),
            Cell::new(format!("{:.2}", score.volume_ratio)),
        ];
        row.extend(
            ScoreCategory::ALL
                .iter()
                .map(|&category| Cell::new(format!("{:.1}", score.breakdown.get(category)))),
        );
        table.add_row(row);
    }
    table
}
