//! Headless driver: load a document, paint strokes, flatten, write the result

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use docmark::{
    CanvasBounds, CanvasConfig, CanvasEvent, CanvasProps, CompositeArtifact, FitMode,
    FsImageLoader, HighlightCanvas, HighlightColor, Point, PointerEvent,
};
use tokio::sync::mpsc;

const USAGE: &str = "\
Usage: docmark <display-image> [options]

Options:
  --full <image>           Full-resolution raster used for the export
  --stroke x1,y1,x2,y2     Highlight segment in image pixels (repeatable)
  --brush <n>              Stroke width in image pixels (default from config)
  --color <css-color>      Highlight color (default from config)
  --native                 Place the document at 1:1 instead of fitting it;
                           the canvas grows to hold the whole document
  --size <WxH>             Virtual canvas size (default 1280x800)
  --save-config            Persist --color and --native as the new defaults
  --out <path>             Output PNG path (default: Pictures folder)
  --base64                 Print the base64 payload instead of writing a file
  -h, --help               Show this help";

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
pub struct Options {
    pub display: String,
    pub full: Option<String>,
    pub strokes: Vec<(Point, Point)>,
    pub brush: Option<f32>,
    pub color: Option<HighlightColor>,
    pub native: bool,
    pub size: (u32, u32),
    pub out: Option<PathBuf>,
    pub base64: bool,
    pub save_config: bool,
    pub help: bool,
}

impl Options {
    pub fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut options = Options {
            size: (1280, 800),
            ..Default::default()
        };
        let mut display = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .with_context(|| format!("{name} expects a value"))
            };
            match arg.as_str() {
                "-h" | "--help" => options.help = true,
                "--full" => options.full = Some(value("--full")?),
                "--stroke" => options.strokes.push(parse_stroke(&value("--stroke")?)?),
                "--brush" => {
                    let brush: f32 = value("--brush")?.parse().context("invalid --brush")?;
                    if !(brush.is_finite() && brush > 0.0) {
                        bail!("--brush must be positive");
                    }
                    options.brush = Some(brush);
                }
                "--color" => {
                    let color = value("--color")?.parse::<HighlightColor>()?;
                    options.color = Some(color);
                }
                "--native" => options.native = true,
                "--size" => options.size = parse_size(&value("--size")?)?,
                "--out" => options.out = Some(PathBuf::from(value("--out")?)),
                "--base64" => options.base64 = true,
                "--save-config" => options.save_config = true,
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n\n{USAGE}"),
                positional => {
                    if display.replace(positional.to_string()).is_some() {
                        bail!("only one display image may be given");
                    }
                }
            }
        }

        match display {
            Some(display) => options.display = display,
            None if options.help => {}
            None => bail!("missing display image\n\n{USAGE}"),
        }
        Ok(options)
    }
}

fn parse_stroke(spec: &str) -> anyhow::Result<(Point, Point)> {
    let coords = spec
        .split(',')
        .map(|c| c.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid stroke {spec:?}"))?;
    match coords[..] {
        [x1, y1, x2, y2] => Ok((Point::new(x1, y1), Point::new(x2, y2))),
        _ => bail!("stroke {spec:?} needs four comma-separated numbers"),
    }
}

fn parse_size(spec: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = spec
        .split_once(['x', 'X'])
        .with_context(|| format!("size {spec:?} must look like WxH"))?;
    let w: u32 = w.trim().parse().context("invalid width")?;
    let h: u32 = h.trim().parse().context("invalid height")?;
    if w == 0 || h == 0 {
        bail!("size must be non-zero");
    }
    Ok((w, h))
}

/// Default export location, mirroring a screenshot tool's naming
fn default_output_path() -> Option<PathBuf> {
    let mut path = dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))?;
    let name = chrono::Local::now()
        .format("Highlight_%Y-%m-%d_%H-%M-%S.png")
        .to_string();
    path.push(name);
    Some(path)
}

pub async fn run(options: Options) -> anyhow::Result<()> {
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let mut config = CanvasConfig::load();
    if options.native {
        config.fit_mode = FitMode::NativeScale;
    }
    if let Some(color) = options.color {
        config.highlight_color = color.to_string();
    }
    if options.save_config {
        config.save();
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let (w, h) = options.size;
    let mut canvas = HighlightCanvas::new(
        config.clone(),
        Arc::new(FsImageLoader),
        tx,
        CanvasBounds::new(w, h),
    );

    let mut props = CanvasProps {
        document_source: Some(options.display.clone()),
        full_resolution_source: options.full.clone(),
        highlighting: true,
        ..CanvasProps::from_config(&config)
    };
    canvas.update(&props);
    canvas.settle().await;
    let Some(document) = canvas.document() else {
        bail!("could not load {}", options.display);
    };
    let (doc_w, doc_h) = (document.width(), document.height());
    log::info!("Loaded {} ({}x{})", options.display, doc_w, doc_h);

    // At 1:1 every document pixel must be reachable by a stroke
    if options.native && (doc_w > w || doc_h > h) {
        canvas.resize(w.max(doc_w), h.max(doc_h));
        canvas.fit_document();
    }

    // Brush is given in image pixels; the canvas sizes brushes in screen pixels
    let viewport = *canvas.viewport();
    if let Some(brush) = options.brush {
        props.brush_size = brush * viewport.zoom;
        canvas.update(&props);
    }
    for (from, to) in &options.strokes {
        let a = viewport.image_to_screen(*from);
        let b = viewport.image_to_screen(*to);
        canvas.handle_pointer(PointerEvent::Down(a));
        let status = canvas.handle_pointer(PointerEvent::Moved(b));
        canvas.handle_pointer(PointerEvent::Up(b));
        if status != docmark::EventStatus::Captured {
            log::warn!("Stroke {from:?} -> {to:?} falls outside the canvas, skipped");
        }
    }

    props.generate_trigger = true;
    canvas.update(&props);
    canvas.settle().await;

    let mut artifact: Option<CompositeArtifact> = None;
    let mut consumed = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            CanvasEvent::CompositeImageReady(a) => artifact = Some(a),
            CanvasEvent::GenerationTriggerConsumed => consumed = true,
            CanvasEvent::BrushSizeChanged(_) => {}
        }
    }
    let artifact = match (artifact, consumed) {
        (Some(artifact), true) => artifact,
        _ => bail!("composite failed; see log output (RUST_LOG=warn)"),
    };

    if options.base64 {
        println!("{}", artifact.into_payload());
        return Ok(());
    }
    let path = options
        .out
        .or_else(default_output_path)
        .context("no output path and no Pictures folder")?;
    std::fs::write(&path, artifact.png_bytes()?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_full_command_line() {
        let options = Options::parse(args(&[
            "page.png",
            "--full",
            "page@2x.png",
            "--stroke",
            "1,2,3,4",
            "--stroke",
            "5, 6, 7, 8",
            "--brush",
            "12",
            "--color",
            "#ff0",
            "--save-config",
            "--native",
            "--size",
            "640x480",
            "--out",
            "out.png",
        ]))
        .unwrap();

        assert_eq!(options.display, "page.png");
        assert_eq!(options.full.as_deref(), Some("page@2x.png"));
        assert_eq!(
            options.strokes,
            vec![
                (Point::new(1.0, 2.0), Point::new(3.0, 4.0)),
                (Point::new(5.0, 6.0), Point::new(7.0, 8.0)),
            ]
        );
        assert_eq!(options.brush, Some(12.0));
        assert_eq!(options.color, Some(HighlightColor::rgb(255, 255, 0)));
        assert!(options.save_config);
        assert!(options.native);
        assert_eq!(options.size, (640, 480));
        assert_eq!(options.out, Some(PathBuf::from("out.png")));
        assert!(!options.base64);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Options::parse(args(&[])).is_err());
        assert!(Options::parse(args(&["a.png", "b.png"])).is_err());
        assert!(Options::parse(args(&["a.png", "--stroke", "1,2,3"])).is_err());
        assert!(Options::parse(args(&["a.png", "--size", "0x5"])).is_err());
        assert!(Options::parse(args(&["a.png", "--brush", "-1"])).is_err());
        assert!(Options::parse(args(&["a.png", "--full"])).is_err());
        assert!(Options::parse(args(&["a.png", "--bogus"])).is_err());
        assert!(Options::parse(args(&["a.png", "--color", "#12"])).is_err());
    }

    #[test]
    fn test_help_needs_no_image() {
        assert!(Options::parse(args(&["--help"])).unwrap().help);
    }

    #[tokio::test]
    async fn test_run_writes_highlighted_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.png");
        image::RgbaImage::from_pixel(40, 30, image::Rgba([255; 4]))
            .save(&input)
            .unwrap();
        let output = dir.path().join("out.png");

        let options = Options::parse(args(&[
            input.to_str().unwrap(),
            "--stroke",
            "5,15,35,15",
            "--brush",
            "6",
            "--out",
            output.to_str().unwrap(),
        ]))
        .unwrap();
        run(options).await.unwrap();

        let out = image::open(&output).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (40, 30));
        assert!(out.get_pixel(20, 15).0[2] < 140);
        assert_eq!(out.get_pixel(20, 2).0, [255; 4]);
    }

    #[tokio::test]
    async fn test_native_run_reaches_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("wide.png");
        image::RgbaImage::from_pixel(300, 60, image::Rgba([255; 4]))
            .save(&input)
            .unwrap();
        let output = dir.path().join("out.png");

        let options = Options::parse(args(&[
            input.to_str().unwrap(),
            "--native",
            "--size",
            "100x50",
            "--stroke",
            "250,30,290,30",
            "--brush",
            "6",
            "--out",
            output.to_str().unwrap(),
        ]))
        .unwrap();
        run(options).await.unwrap();

        let out = image::open(&output).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (300, 60));
        assert!(out.get_pixel(270, 30).0[2] < 140);
        assert_eq!(out.get_pixel(20, 30).0, [255; 4]);
    }
}
