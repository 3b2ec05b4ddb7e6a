use clap::Parser;
use netlist::compile_netlist_file;

/// Compile a netlist into the gate IR read by the simulator
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Path to the netlist file
    #[arg(short, long)]
    netlist: String,

    /// Path to output the IR file
    #[arg(short, long)]
    output: Option<String>,

    /// Path to output the compiled netlist as JSON
    #[arg(short, long)]
    json: Option<String>,

    /// Don't print the IR
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let compiled = match compile_netlist_file(&args.netlist) {
        Ok(compiled) => compiled,
        Err(err) => {
            eprintln!("{}: {err}", args.netlist);
            std::process::exit(1);
        }
    };
    let ir = compiled.to_ir_string();

    if !args.quiet {
        print!("{ir}");
    }

    if let Some(output) = args.output {
        if let Err(err) = std::fs::write(&output, &ir) {
            eprintln!("{output}: {err}");
            std::process::exit(1);
        }
        log::info!("IR written to {output}");
    }

    if let Some(json) = args.json {
        let written = std::fs::File::create(&json)
            .map_err(|e| e.to_string())
            .and_then(|file| serde_json::to_writer(file, &compiled.to_json()).map_err(|e| e.to_string()));
        if let Err(err) = written {
            eprintln!("{json}: {err}");
            std::process::exit(1);
        }
        log::info!("JSON written to {json}");
    }
}
