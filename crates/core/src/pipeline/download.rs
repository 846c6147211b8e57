use std::{
    fs::create_dir_all,
    io::{Cursor, Read},
    path::Path,
};

use anyhow::{Context, Result, bail};
use log::info;
use reqwest::blocking::get;

use crate::{
    config::{
        NOTO_CJK_LICENSE_URL, NOTO_CJK_VF_FILENAME, NOTO_CJK_VF_URL, RECURSIVE_LICENSE_URL,
        RECURSIVE_VF_FILENAME, RECURSIVE_ZIP_PATH, RECURSIVE_ZIP_URL,
    },
    io::write_font,
    report::Reporter,
};

/// How to obtain the bytes of one download.
enum Source {
    File { url: &'static str },
    /// One member of a ZIP archive.
    Zip { url: &'static str, member: &'static str },
}

struct DownloadItem {
    source: Source,
    output_name: &'static str,
    description: &'static str,
}

const DOWNLOADS: &[DownloadItem] = &[
    DownloadItem {
        source: Source::Zip { url: RECURSIVE_ZIP_URL, member: RECURSIVE_ZIP_PATH },
        output_name: RECURSIVE_VF_FILENAME,
        description: "Recursive VF",
    },
    DownloadItem {
        source: Source::File { url: NOTO_CJK_VF_URL },
        output_name: NOTO_CJK_VF_FILENAME,
        description: "Noto Sans Mono CJK JP (Variable)",
    },
    DownloadItem {
        source: Source::File { url: NOTO_CJK_LICENSE_URL },
        output_name: "LICENSE-NotoSansCJK.txt",
        description: "Noto CJK License",
    },
    DownloadItem {
        source: Source::File { url: RECURSIVE_LICENSE_URL },
        output_name: "LICENSE-Recursive.txt",
        description: "Recursive License (OFL)",
    },
];

fn fetch(url: &str) -> Result<Vec<u8>> {
    let response = get(url).with_context(|| format!("Failed to fetch {url}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!("HTTP {status} for {url}");
    }
    Ok(response.bytes()?.to_vec())
}

fn extract(archive: &[u8], member: &str) -> Result<Vec<u8>> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(archive)).context("Failed to open zip archive")?;
    let mut file =
        archive.by_name(member).with_context(|| format!("File {member} not found in zip"))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn download_item(item: &DownloadItem, output_dir: &Path) -> Result<()> {
    info!("Downloading {} ({})", item.description, item.output_name);

    let bytes = match item.source {
        Source::File { url } => fetch(url)?,
        Source::Zip { url, member } => extract(&fetch(url)?, member)?,
    };
    write_font(output_dir.join(item.output_name), &bytes)?;

    let size_mb = bytes.len() as f64 / 1024.0 / 1024.0;
    info!("  Downloaded {} ({size_mb:.2} MB)", item.output_name);
    Ok(())
}

/// Fetch the Recursive and Noto CJK sources and their licenses into `build_dir`.
pub fn download(reporter: &Reporter, build_dir: &Path) -> Result<usize> {
    create_dir_all(build_dir)
        .with_context(|| format!("Failed to create directory: {}", build_dir.display()))?;
    info!("Downloading fonts to {}", build_dir.display());

    let count = reporter.run_batch_with(
        "Download",
        DOWNLOADS,
        |item| build_dir.join(item.output_name),
        |item| download_item(item, build_dir),
    )?;
    info!("All files ready in {}/", build_dir.display());
    Ok(count)
}
