use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use clap::{
    Parser,
    Subcommand,
};
use nvm_settings_image_tool::RegionImage;

#[derive(Parser)]
#[command(name = "nvm-settings-image-tool")]
#[command(about = "nvm-settings region image generator and parser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a region page image from a CSV file
    Generate {
        /// Input CSV file path
        input: PathBuf,

        /// Output binary file path
        output: PathBuf,

        /// Page size in bytes, decimal or 0x-prefixed hex (multiple of 16)
        #[arg(short, long, value_parser = parse_size)]
        size: usize,
    },
    /// Dump a region page image or flash page to a CSV file
    Parse {
        /// Input binary file path
        input: PathBuf,

        /// Output CSV file path
        output: PathBuf,
    },
}

fn parse_size(s: &str) -> Result<usize, String> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).map_err(|e| e.to_string()),
        None => s.parse::<usize>().map_err(|e| e.to_string()),
    }
}

fn print_entries(image: &RegionImage) {
    let (ints, strings) = image.counts();
    println!("Entries: {ints} integers, {strings} strings");
}

fn generate(input: &Path, output: &Path, size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let image = RegionImage::from_csv_file(input)?;
    print_entries(&image);

    let data = image.generate_image(size)?;
    let encoded = image.encoded_len()?;
    fs::write(output, &data)?;

    println!(
        "Wrote {}: {encoded} bytes of settings, {} bytes of erased padding",
        output.display(),
        data.len() - encoded
    );
    Ok(())
}

fn parse(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let image = RegionImage::parse_image(&data)?;
    if image.entries.is_empty() {
        println!("{} holds an empty or erased region", input.display());
    }
    print_entries(&image);

    image.to_csv_file(output)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Commands::Generate {
            input,
            output,
            size,
        } => generate(&input, &output, size),
        Commands::Parse { input, output } => parse(&input, &output),
    }
}
