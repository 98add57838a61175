use fillgauge::{FillGauge, MeasureRequest, UtensilHint};
use image::ImageReader;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage: {} <image> [auto|bowl|plate|cup] [rim_diameter_mm] [out.json]",
            args[0]
        );
        std::process::exit(2);
    }

    let frame = ImageReader::open(&args[1])?.decode()?.to_rgb8();
    let utensil: UtensilHint = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or_default();
    let mut request = MeasureRequest::new(utensil);
    if let Some(d) = args.get(3) {
        request = request.with_diameter_mm(d.parse()?);
    }

    let report = FillGauge::default().measure(&frame, &request)?;
    match (report.percent_fill(), report.volume_ml()) {
        (Some(p), Some(v)) => println!("Fill {p:.1}%, about {v:.0} ml."),
        (Some(p), None) => println!("Fill {p:.1}% (give a rim diameter for volume)."),
        _ => println!("{}", report.status.message()),
    }

    if let Some(out_path) = args.get(4) {
        std::fs::write(out_path, serde_json::to_string_pretty(&report)?)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
