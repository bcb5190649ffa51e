//! Markdown gallery generated from the two aggregate archives.

use std::fmt::Write as _;
use std::path::Path;

use serde::Deserialize;

use crate::archive::ArchiveError;
use crate::feed::ArchiveImage;

const BING_ORIGIN: &str = "https://www.bing.com";
const THUMBNAIL_QUERY: &str = "&pid=hp&w=384&h=216&rs=1&c=4";

#[derive(Debug, Deserialize)]
struct AggregateArchive {
    #[serde(default)]
    data: Vec<ArchiveImage>,
}

/// Load the `data` records of a `*_all.json` archive.
pub fn load_all_archive(path: &Path) -> Result<Vec<ArchiveImage>, ArchiveError> {
    let bytes = std::fs::read(path).map_err(|e| ArchiveError::io(path, e))?;
    let archive: AggregateArchive =
        serde_json::from_slice(&bytes).map_err(|e| ArchiveError::Json {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(archive.data)
}

fn uhd_url(image: &ArchiveImage) -> String {
    format!("{BING_ORIGIN}{}_UHD.jpg", image.urlbase)
}

/// `YYYYMMDD` to `YYYY-MM-DD`; anything shorter is returned unchanged.
fn format_day(raw: &str) -> String {
    match (raw.get(0..4), raw.get(4..6), raw.get(6..8)) {
        (Some(y), Some(m), Some(d)) => format!("{y}-{m}-{d}"),
        _ => raw.to_string(),
    }
}

fn cell(image: &ArchiveImage) -> String {
    let day = format_day(&image.enddate);
    let full = uhd_url(image);
    format!("![{day}]({full}{THUMBNAIL_QUERY}) {day} [download 4k]({full})")
}

/// Render the README for the two markets.
///
/// `generated_at` is written into an HTML comment so regenerated files differ.
pub fn render_readme(zh: &[ArchiveImage], en: &[ArchiveImage], generated_at: &str) -> String {
    let mut out = String::new();
    out.push_str("# Bing Wallpaper\n");
    let _ = writeln!(out, "<!--{generated_at}-->");

    if let Some(head) = zh.first() {
        let head_img = uhd_url(head);
        let _ = writeln!(
            out,
            "![{title}]({img}&w=1920) Today: [{title}]({img})",
            title = head.title,
            img = head_img
        );
    }

    out.push_str("\n|  Chinese – China   |   English – United States   |\n");
    out.push_str("| :----: | :----: |\n");

    for (zh_day, en_day) in zh.iter().zip(en.iter()) {
        let _ = writeln!(out, "| {}| {}|", cell(zh_day), cell(en_day));
    }

    out.push_str("-------------------\n");
    out
}
