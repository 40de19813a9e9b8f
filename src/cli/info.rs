use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::Level;
use serde::Serialize;

use super::command::{Cli, InfoArgs, OutputFormat};
use crate::input::InputFile;
use crate::timestamp::time_str;
use audioprops::process::{DecodeOptions, Decoded, decode};
use audioprops::structs::descriptor::SizeInfo;
use audioprops::structs::zone::{PatchKind, ZoneMap};
use audioprops::utils::byteorder::ByteOrder;
use audioprops::utils::errors::DecodeFailure;

pub fn cmd_info(args: &InfoArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let fail_level = if cli.strict {
        Level::Warn
    } else {
        Level::Error
    };
    let options = DecodeOptions {
        prepare_for_write: args.zones,
        fail_level,
    };

    let pb = match multi {
        Some(multi) => {
            let pb = multi.add(ProgressBar::new(args.inputs.len() as u64));
            pb.set_style(ProgressStyle::with_template(
                "{spinner:.green} [{bar:30}] {pos}/{len} {msg}",
            )?);
            Some(pb)
        }
        None => None,
    };

    let mut reports = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        if let Some(ref pb) = pb {
            pb.set_message(path.display().to_string());
        }

        let report = inspect(path, args, &options, cli.strict)
            .with_context(|| format!("Failed to inspect {}", path.display()))?;
        reports.push(report);

        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    match args.output {
        OutputFormat::Plain => reports.iter().for_each(display_report),
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&reports)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    Ok(())
}

fn inspect(
    path: &Path,
    args: &InfoArgs,
    options: &DecodeOptions,
    strict: bool,
) -> Result<FileReport> {
    log::info!("Analyzing {}", path.display());

    let input = InputFile::open(path, args.leading_tag_size, args.trailing_tag_size)?;
    let size = *input.size();
    log::debug!(
        "{}: {} bytes, leading tag {}, trailing tag {}",
        path.display(),
        size.file_size,
        size.leading_tag_size,
        size.trailing_tag_size
    );

    let decoded = match decode(input.into_reader(), &size, options) {
        Ok(decoded) => decoded,
        Err(DecodeFailure::Unrecognized) => {
            log::warn!("{}: no supported stream signature", path.display());
            Decoded::null()
        }
        Err(failure) if strict => return Err(failure.into()),
        Err(failure) => {
            let mut null = Decoded::null();
            null.diagnostics.extend(failure.diagnostic());
            null
        }
    };

    for diagnostic in &decoded.diagnostics {
        log::log!(diagnostic.level, "{}: {diagnostic}", path.display());
    }

    Ok(FileReport::new(path, &size, &decoded))
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    format: Option<String>,
    valid: bool,
    codec_family: String,
    sample_rate: u32,
    bit_depth: u32,
    channels: u32,
    /// bit/s
    bitrate: f64,
    duration_ms: f64,
    vbr: bool,
    compression_ratio: f64,
    file_size: u64,
    leading_tag_size: u64,
    trailing_tag_size: u64,
    metadata: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    zones: Option<Vec<ZoneReport>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<DiagnosticReport>,
}

#[derive(Debug, Serialize)]
struct ZoneReport {
    name: String,
    start: u64,
    length: u64,
    patches: Vec<PatchReport>,
}

#[derive(Debug, Serialize)]
struct PatchReport {
    kind: &'static str,
    offset: u64,
    width: usize,
    byte_order: &'static str,
    value: u64,
}

#[derive(Debug, Serialize)]
struct DiagnosticReport {
    level: String,
    message: String,
}

impl FileReport {
    fn new(path: &Path, size: &SizeInfo, decoded: &Decoded) -> Self {
        let d = &decoded.descriptor;

        Self {
            path: path.display().to_string(),
            format: decoded.format.map(|f| f.to_string()),
            valid: d.valid,
            codec_family: d.codec_family.to_string(),
            sample_rate: d.sample_rate,
            bit_depth: d.bit_depth,
            channels: d.channels,
            bitrate: d.bitrate,
            duration_ms: d.duration,
            vbr: d.vbr,
            compression_ratio: d.compression_ratio(size.file_size),
            file_size: size.file_size,
            leading_tag_size: size.leading_tag_size,
            trailing_tag_size: size.trailing_tag_size,
            metadata: decoded.metadata.to_string(),
            zones: decoded.zones.as_ref().map(zone_reports),
            diagnostics: decoded
                .diagnostics
                .iter()
                .map(|diagnostic| DiagnosticReport {
                    level: diagnostic.level.to_string(),
                    message: diagnostic.to_string(),
                })
                .collect(),
        }
    }
}

fn zone_reports(zones: &ZoneMap) -> Vec<ZoneReport> {
    zones
        .zones()
        .iter()
        .map(|zone| ZoneReport {
            name: zone.name.clone(),
            start: zone.start,
            length: zone.length,
            patches: zones
                .patches_for(&zone.name)
                .map(|patch| PatchReport {
                    kind: match patch.kind {
                        PatchKind::Size => "size",
                        PatchKind::Index => "index",
                    },
                    offset: patch.offset,
                    width: patch.width,
                    byte_order: match patch.byte_order {
                        ByteOrder::Little => "little",
                        ByteOrder::Big => "big",
                    },
                    value: patch.value,
                })
                .collect(),
        })
        .collect()
}

fn display_report(report: &FileReport) {
    println!();
    println!("{}", report.path);
    println!("{}", "=".repeat(report.path.chars().count()));
    println!();

    let Some(format) = &report.format else {
        println!("No supported audio stream found.");
        for diagnostic in &report.diagnostics {
            println!("  {:<26}{}", diagnostic.level, diagnostic.message);
        }
        println!();
        return;
    };

    println!("Stream Information");
    println!("  Format                    {format}");
    println!("  Codec family              {}", report.codec_family);
    println!("  Sampling rate             {} Hz", report.sample_rate);
    if report.bit_depth != 0 {
        println!("  Bit depth                 {} bits", report.bit_depth);
    }
    println!("  Channels                  {}", report.channels);
    let kbps = report.bitrate / 1000.0;
    println!("  Bitrate                   {kbps:.1} kbps");
    let duration = time_str(report.duration_ms);
    println!("  Duration                  {duration}");
    let ratio = report.compression_ratio;
    println!("  Compression ratio         {ratio:.3}");
    println!();

    println!("File Layout");
    let size_mb = report.file_size as f64 / 1_000_000.0;
    println!(
        "  Size                      {size_mb:.2} MB ({} bytes)",
        report.file_size
    );
    let (leading, trailing) = (report.leading_tag_size, report.trailing_tag_size);
    println!("  Leading tag               {leading} bytes");
    println!("  Trailing tag              {trailing} bytes");
    println!("  Embedded metadata         {}", report.metadata);
    println!();

    if let Some(zones) = &report.zones {
        println!("Zones");
        for zone in zones {
            println!("  {:<26}{} + {} bytes", zone.name, zone.start, zone.length);
            for patch in &zone.patches {
                println!(
                    "    {:<24}{} bytes {}-endian at {} (= {})",
                    format!("{} field", patch.kind),
                    patch.width,
                    patch.byte_order,
                    patch.offset,
                    patch.value
                );
            }
        }
        println!();
    }

    if !report.diagnostics.is_empty() {
        println!("Diagnostics");
        for diagnostic in &report.diagnostics {
            println!("  {:<26}{}", diagnostic.level, diagnostic.message);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use anyhow::Result;
    use audioprops::process::{DecodeOptions, Decoded, decode};
    use audioprops::structs::descriptor::SizeInfo;

    use super::FileReport;

    #[test]
    fn report_from_ac3() -> Result<()> {
        let data = [0x0B, 0x77, 0x00, 0x00, 0x4A, 0x40, 0x40];
        let size = SizeInfo::new(10_000);
        let decoded = decode(Cursor::new(&data[..]), &size, &DecodeOptions::default())?;

        let report = FileReport::new(Path::new("a.ac3"), &size, &decoded);
        assert_eq!(report.format.as_deref(), Some("Dolby Digital"));
        assert_eq!(report.sample_rate, 44100);
        assert_eq!(report.duration_ms, 1000.0);
        assert!(report.zones.is_none());

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["bitrate"], 80_000.0);
        assert_eq!(json["codec_family"], "Lossy");
        assert!(json.get("zones").is_none());
        assert!(json.get("diagnostics").is_none());

        Ok(())
    }

    #[test]
    fn report_from_null() -> Result<()> {
        let size = SizeInfo::new(0);
        let report = FileReport::new(Path::new("empty"), &size, &Decoded::null());

        assert!(report.format.is_none());
        assert!(!report.valid);
        assert_eq!(report.compression_ratio, 0.0);

        let yaml = serde_yaml_ng::to_string(&report)?;
        assert!(yaml.contains("format: null"));

        Ok(())
    }
}
