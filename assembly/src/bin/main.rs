use assembly::assemble_file;
use clap::Parser;

/// Assemble a program into the ROM image read by the simulator
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Path to the assembly file
    #[arg(short, long)]
    assembly: String,

    /// Path to output the ROM file
    #[arg(short, long)]
    output: Option<String>,

    /// Path to output the ROM as JSON
    #[arg(short, long)]
    json: Option<String>,

    /// Don't print the ROM listing
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let rom = match assemble_file(&args.assembly) {
        Ok(rom) => rom,
        Err(err) => {
            eprintln!("{}: {err}", args.assembly);
            std::process::exit(1);
        }
    };

    if !args.quiet {
        rom.pprint();
    }

    if let Some(output) = args.output {
        if let Err(err) = std::fs::write(&output, rom.to_text()) {
            eprintln!("{output}: {err}");
            std::process::exit(1);
        }
        log::info!("{} words written to {output}", rom.len());
    }

    if let Some(json) = args.json {
        let written = std::fs::File::create(&json)
            .map_err(|e| e.to_string())
            .and_then(|file| serde_json::to_writer(file, &rom.to_json()).map_err(|e| e.to_string()));
        if let Err(err) = written {
            eprintln!("{json}: {err}");
            std::process::exit(1);
        }
        log::info!("JSON written to {json}");
    }
}
