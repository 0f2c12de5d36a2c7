use clap::Parser;
use color_print::cprintln;
use tapec::{compile, layout_print, Diagnostic};

#[derive(Debug, clap::Parser)]
#[clap(author, version, about)]
struct Args {
    /// Input file
    #[clap(default_value = "main.tp")]
    input: String,

    /// Output file
    #[clap(short, long, default_value = "main.bf")]
    output: String,

    /// Symbol map output (YAML)
    #[clap(short, long)]
    map: Option<String>,

    /// Enable verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // 1. Read source
    let source = match std::fs::read_to_string(&args.input) {
        Ok(source) => source,
        Err(e) => fail(&format!("Failed to open file: {}: {}", args.input, e)),
    };

    // 2. Compile
    let output = match compile(&source) {
        Ok(output) => output,
        Err(diags) => report(&args.input, &source, &diags),
    };

    if args.verbose {
        layout_print(&output.map, &output.code);
    }

    // 3. Write program and symbol map
    if let Err(e) = std::fs::write(&args.output, format!("{}\n", output.code)) {
        fail(&format!("Failed to write to file: {}: {}", args.output, e));
    }
    if let Some(path) = &args.map {
        let written = output
            .map
            .to_yaml()
            .map_err(|e| e.to_string())
            .and_then(|yaml| std::fs::write(path, yaml).map_err(|e| e.to_string()));
        if let Err(e) = written {
            fail(&format!("Failed to write symbol map: {}: {}", path, e));
        }
    }

    println!("Successfully compiled {} to {}", args.input, args.output);
}

fn report(file: &str, source: &str, diags: &[Diagnostic]) -> ! {
    for diag in diags {
        diag.print(file, source);
    }
    let count = diags.iter().filter(|d| d.is_error()).count();
    cprintln!("<red,bold>error</>: could not compile `{}` due to {} previous error(s)", file, count);
    std::process::exit(1);
}

fn fail(msg: &str) -> ! {
    cprintln!("<red,bold>error</>: {}", msg);
    std::process::exit(1);
}
