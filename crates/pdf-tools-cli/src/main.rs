mod args;
mod logger;

use anyhow::{Context, Result, bail};
use args::{
    AnchorArg, NumberFormatArg, OrientationArg, PaperArg, RegionArg, parse_color,
    parse_order_token, parse_page_number, parse_rect, parse_region,
};
use clap::{ArgGroup, Parser, Subcommand};
use pdf_layout::constants::{MIN_CROP_SIZE, MIN_REDACTION_SIZE};
use pdf_layout::geometry::NormalizedRect;
use pdf_layout::plan::MergePlanEntry;
use pdf_layout::{
    CropOptions, OptionsFile, PageNumberOptions, PageSelection, RedactOptions, RedactionRegion,
    ResizeOptions, Rgb, SplitRule, WatermarkLayout, WatermarkOptions, tools,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pdft", about = "PDF tools CLI", version)]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a PDF into several documents
    #[command(group(ArgGroup::new("rule").required(true).args(["every", "at", "at_blank"])))]
    Split {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Start a new document every N pages
        #[arg(long)]
        every: Option<usize>,

        /// Start a new document at each of these pages (1-based)
        #[arg(long, value_delimiter = ',', value_parser = parse_page_number)]
        at: Option<Vec<usize>>,

        /// Start a new document at each blank page
        #[arg(long)]
        at_blank: bool,
    },

    /// Merge PDFs, optionally reordering and rotating pages
    Merge {
        /// Input PDF files, in order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Output pages as doc:page[@deg] (1-based), e.g. 2:1 1:3@90
        #[arg(long, num_args = 1.., value_parser = parse_order_token)]
        order: Option<Vec<MergePlanEntry>>,
    },

    /// Redraw every page onto a standard paper size
    Resize {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "a4", value_enum)]
        paper: PaperArg,

        #[arg(long, default_value = "portrait", value_enum)]
        orientation: OrientationArg,

        /// JSON options file (overrides the flags above)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Set the visible area of pages
    Crop {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Normalized x,y,w,h measured from the top-left corner
        #[arg(long, value_parser = parse_rect, required_unless_present = "config")]
        rect: Option<[f64; 4]>,

        /// Only these pages (1-based, comma separated)
        #[arg(long, value_delimiter = ',', value_parser = parse_page_number)]
        pages: Option<Vec<usize>>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Cover regions with opaque boxes
    Redact {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// page:x,y,w,h with a 1-based page and normalized rect; repeatable
        #[arg(long, value_parser = parse_region, required_unless_present = "config")]
        region: Vec<RegionArg>,

        /// Repeat every region on all pages
        #[arg(long)]
        all_pages: bool,

        /// Box colour as #rrggbb
        #[arg(long, default_value = "#000000", value_parser = parse_color)]
        color: Rgb,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Stamp text over pages
    Watermark {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "CONFIDENTIAL")]
        text: String,

        #[arg(long, default_value = "48")]
        font_size: f64,

        #[arg(long, default_value = "#808080", value_parser = parse_color)]
        color: Rgb,

        #[arg(long, default_value = "0.3")]
        opacity: f64,

        /// Counter-clockwise rotation in degrees
        #[arg(long, default_value = "45", allow_negative_numbers = true)]
        rotate: f64,

        /// Single stamp position
        #[arg(long, default_value = "center", value_enum)]
        anchor: AnchorArg,

        /// Distance from the page edge for anchored stamps (points)
        #[arg(long, default_value = "0")]
        margin: f64,

        /// Repeat the stamp over the whole page
        #[arg(long)]
        tile: bool,

        /// Space between tiled stamps (points)
        #[arg(long, default_value = "36")]
        gap: f64,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Add page numbers
    PageNumbers {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "bottom-center", value_enum)]
        anchor: AnchorArg,

        #[arg(long, default_value = "20")]
        margin: f64,

        #[arg(long, default_value = "10")]
        font_size: f64,

        #[arg(long, default_value = "1")]
        start: usize,

        #[arg(long, default_value = "plain", value_enum)]
        format: NumberFormatArg,

        /// Leave the first page unnumbered
        #[arg(long)]
        skip_first: bool,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show page sizes and rotations
    Info {
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::CliLogger::from_flags(cli.verbose, cli.quiet)
        .init()
        .context("failed to install logger")?;

    match cli.command {
        Commands::Split {
            input,
            out_dir,
            every,
            at,
            at_blank,
        } => {
            let rule = match (every, at, at_blank) {
                (Some(n), _, _) => SplitRule::Every(n),
                (_, Some(pages), _) => SplitRule::At(pages),
                (_, _, true) => SplitRule::AtBlankPages,
                _ => bail!("choose one of --every, --at or --at-blank"),
            };
            let doc = pdf_layout::load_pdf(&input).await?;
            let parts = tools::split(doc, rule).await?;
            let written = pdf_layout::save_split_outputs(parts, &out_dir, &file_stem(&input)).await?;
            for path in &written {
                println!("{}", path.display());
            }
            println!("Split {} → {} documents", input.display(), written.len());
        }

        Commands::Merge {
            input,
            output,
            order,
        } => {
            let documents = pdf_layout::load_multiple_pdfs(&input).await?;
            let sources = input
                .iter()
                .map(|path| file_stem(path))
                .zip(documents)
                .collect();
            let merged = tools::merge(sources, order).await?;
            let pages = merged.get_pages().len();
            pdf_layout::save_pdf(merged, &output).await?;
            println!("Merged {} pages → {}", pages, output.display());
        }

        Commands::Resize {
            input,
            output,
            paper,
            orientation,
            config,
        } => {
            let options = match config {
                Some(path) => ResizeOptions::load(&path).await?,
                None => ResizeOptions {
                    paper: paper.into(),
                    orientation: orientation.into(),
                },
            };
            let doc = pdf_layout::load_pdf(&input).await?;
            let resized = tools::resize(doc, options).await?;
            pdf_layout::save_pdf(resized, &output).await?;
            println!("Resized → {}", output.display());
        }

        Commands::Crop {
            input,
            output,
            rect,
            pages,
            config,
        } => {
            let options = match (config, rect) {
                (Some(path), _) => CropOptions::load(&path).await?,
                (None, Some([x, y, w, h])) => CropOptions {
                    rect: NormalizedRect::new(x, y, w, h, MIN_CROP_SIZE)?,
                    pages: pages.map_or(PageSelection::All, PageSelection::Pages),
                },
                (None, None) => bail!("--rect or --config is required"),
            };
            let doc = pdf_layout::load_pdf(&input).await?;
            let cropped = tools::crop(doc, options).await?;
            pdf_layout::save_pdf(cropped, &output).await?;
            println!("Cropped → {}", output.display());
        }

        Commands::Redact {
            input,
            output,
            region,
            all_pages,
            color,
            config,
        } => {
            let options = match config {
                Some(path) => RedactOptions::load(&path).await?,
                None => {
                    let regions = region
                        .into_iter()
                        .map(|r| {
                            let [x, y, w, h] = r.rect;
                            Ok(RedactionRegion {
                                page_index: r.page_index,
                                rect: NormalizedRect::new(x, y, w, h, MIN_REDACTION_SIZE)?,
                            })
                        })
                        .collect::<pdf_layout::Result<Vec<_>>>()?;
                    RedactOptions {
                        regions,
                        color,
                        spread_to_all_pages: all_pages,
                    }
                }
            };
            let doc = pdf_layout::load_pdf(&input).await?;
            let redacted = tools::redact(doc, options).await?;
            pdf_layout::save_pdf(redacted, &output).await?;
            println!("Redacted → {}", output.display());
        }

        Commands::Watermark {
            input,
            output,
            text,
            font_size,
            color,
            opacity,
            rotate,
            anchor,
            margin,
            tile,
            gap,
            config,
        } => {
            let options = match config {
                Some(path) => WatermarkOptions::load(&path).await?,
                None => WatermarkOptions {
                    text,
                    font_size,
                    color,
                    opacity,
                    rotation_deg: rotate,
                    layout: if tile {
                        WatermarkLayout::Tiled { gap_pt: gap }
                    } else {
                        WatermarkLayout::Single {
                            anchor: anchor.into(),
                            margin_pt: margin,
                        }
                    },
                    pages: PageSelection::All,
                },
            };
            let doc = pdf_layout::load_pdf(&input).await?;
            let stamped = tools::watermark(doc, options).await?;
            pdf_layout::save_pdf(stamped, &output).await?;
            println!("Watermarked → {}", output.display());
        }

        Commands::PageNumbers {
            input,
            output,
            anchor,
            margin,
            font_size,
            start,
            format,
            skip_first,
            config,
        } => {
            let options = match config {
                Some(path) => PageNumberOptions::load(&path).await?,
                None => PageNumberOptions {
                    anchor: anchor.into(),
                    margin_pt: margin,
                    font_size,
                    start_number: start,
                    format: format.into(),
                    skip_first,
                    ..Default::default()
                },
            };
            let doc = pdf_layout::load_pdf(&input).await?;
            let numbered = tools::number_pages(doc, options).await?;
            pdf_layout::save_pdf(numbered, &output).await?;
            println!("Numbered → {}", output.display());
        }

        Commands::Info { input, json } => {
            let doc = pdf_layout::load_pdf(&input).await?;
            let info = pdf_layout::document_info(&doc)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}: PDF {}, {} pages", input.display(), info.version, info.pages.len());
                for page in &info.pages {
                    let (width_mm, height_mm) = page.size_mm();
                    println!(
                        "  {:>4}  {:>8.2} x {:<8.2} pt  ({:.1} x {:.1} mm)  rotate {}",
                        page.index + 1,
                        page.width_pt,
                        page.height_pt,
                        width_mm,
                        height_mm,
                        page.rotation_deg
                    );
                }
            }
        }
    }

    Ok(())
}
