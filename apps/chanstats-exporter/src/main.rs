use chanstats_sheet::{DailyRecord, SheetWriter};
use chanstats_tracker::TrackerClient;
use chrono::{Local, NaiveDate};
use eyre::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};

mod dates;

/// The run takes no arguments; edit these to target a different channel or
/// output file.
const CHANNEL: &str = "rubius";
const OUTPUT_FILE: &str = "twitch_data.xlsx";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let client = TrackerClient::new();

    let start = NaiveDate::from_ymd_opt(2024, 11, 18).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 11, 24).unwrap();
    let days: Vec<NaiveDate> = dates::date_range(start, end).collect();

    let bar = ProgressBar::new(days.len() as u64).with_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {wide_bar} {pos}/{len} days ({eta})",
    )?);

    let mut records = Vec::new();
    for date in days {
        match client.channel_summary(CHANNEL, date).await {
            Ok(summary) => records.push(DailyRecord {
                date,
                rank: summary.rank,
                minutes_streamed: summary.minutes_streamed,
                average_viewers: summary.avg_viewers,
                peak_viewers: summary.max_viewers,
                followers: summary.followers,
                total_followers: summary.followers_total,
                executed_at: Local::now().time(),
            }),
            Err(err) => match err.status() {
                // A bad status only costs us that day's row.
                Some(status) => tracing::warn!("Request for {date} returned {status}, skipping"),
                None => return Err(err).wrap_err_with(|| format!("Request for {date} failed")),
            },
        }

        bar.inc(1);
    }
    bar.finish();

    SheetWriter::new(OUTPUT_FILE)
        .append(&records)
        .wrap_err_with(|| format!("Failed to save {OUTPUT_FILE}"))?;

    tracing::info!("Saved {} rows to {OUTPUT_FILE}", records.len());

    Ok(())
}
