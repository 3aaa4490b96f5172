use std::env;
use std::io;
use std::process;
use std::time::Instant;

use peaksim::text;
use peaksim::{ComparatorError, ComparatorOptions, OverlapMode};

fn parse_width(arg: Option<String>, default: f64) -> io::Result<f64> {
    match arg {
        Some(arg) => arg.parse().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid width {arg:?}: {e}"))
        }),
        None => Ok(default),
    }
}

fn to_io(err: ComparatorError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

fn main() -> io::Result<()> {
    let mut args = env::args().skip(1);
    let (Some(path1), Some(path2)) = (args.next(), args.next()) else {
        eprintln!("Usage: peaksim <peaks1> <peaks2> [width_bottom] [width_top]");
        process::exit(1);
    };
    let width_bottom = parse_width(args.next(), 2.0)?;
    let width_top = parse_width(args.next(), 1.0)?;

    let peaks1 = text::peaks_from_file(&path1)?;
    let peaks2 = text::peaks_from_file(&path2)?;
    println!("Read {} peaks from {path1} and {} peaks from {path2}", peaks1.len(), peaks2.len());

    let mut comparator = ComparatorOptions::default()
        .width_bottom(width_bottom)
        .width_top(width_top)
        .build()
        .map_err(to_io)?;
    comparator.set_peaks1(peaks1);
    comparator.set_peaks2(peaks2);

    for mode in [OverlapMode::Simple, OverlapMode::Trapezoid] {
        comparator.set_overlap_mode(mode);
        let start = Instant::now();
        let result = comparator.similarity().map_err(to_io)?;
        println!(
            "{mode:?} overlap: similarity {:0.6} in {} microseconds",
            result.similarity,
            (Instant::now() - start).as_micros()
        );
        if let Some(info) = result.extract_info1 {
            println!(
                "\tfirst: {} peaks, total {}, range {}..{}",
                result.extract1.len(),
                info.sum,
                info.min,
                info.max
            );
        }
        if let Some(info) = result.extract_info2 {
            println!(
                "\tsecond: {} peaks, total {}, range {}..{}",
                result.extract2.len(),
                info.sum,
                info.min,
                info.max
            );
        }
        for peak in result.diff.iter().filter(|p| p.intensity.abs() > 1e-9) {
            println!("\tunmatched {peak}");
        }
    }
    Ok(())
}
