use std::process;

fn main() {
    if let Err(e) = acqxfer::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
