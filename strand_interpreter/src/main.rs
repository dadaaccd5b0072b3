use std::env;
use std::path::Path;
use std::process;
use strand_interpreter::interpreter::Interpreter;

fn main() {
    let mut allow_exec = false;
    let mut positional: Vec<String> = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--allow-exec" => allow_exec = true,
            // The editor passes a debug flag along; it has no effect here.
            "--d" | "--debug" => {}
            _ => positional.push(arg),
        }
    }

    if positional.is_empty() {
        eprintln!("Usage: strand [--allow-exec] <file> [args...]");
        process::exit(2);
    }
    let file = positional.remove(0);

    let mut interpreter = Interpreter::new();
    interpreter.allow_exec(allow_exec);
    if let Err(e) = interpreter.run_file(Path::new(&file), &positional) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
